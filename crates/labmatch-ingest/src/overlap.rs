//! Patient-id overlap between the cohort and the other extracts.
//!
//! Reporting only: nothing here filters any table.

use std::collections::BTreeSet;

use labmatch_model::{CancerTable, CohortPatient, LabObservation, OverlapStats, SourceOverlap};

fn stats<'a>(
    table: &str,
    cohort_ids: &BTreeSet<&str>,
    other_ids: impl Iterator<Item = &'a str>,
) -> OverlapStats {
    let other: BTreeSet<&str> = other_ids.collect();
    let shared = cohort_ids.intersection(&other).count();
    OverlapStats::new(table, cohort_ids.len(), other.len(), shared)
}

/// Distinct-id overlap of the cohort with the labs and the cancer table.
pub fn compute_overlap(
    cohort: &[CohortPatient],
    labs: &[LabObservation],
    cancer: &CancerTable,
) -> SourceOverlap {
    let cohort_ids: BTreeSet<&str> = cohort.iter().map(|p| p.patient_id.as_str()).collect();
    SourceOverlap {
        labs: stats(
            "labs",
            &cohort_ids,
            labs.iter().map(|lab| lab.patient_id.as_str()),
        ),
        cancer: stats("cancer", &cohort_ids, cancer.patient_ids()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use labmatch_model::{PatientId, TestType, TestTypeCode};

    fn patient(id: &str) -> CohortPatient {
        CohortPatient::new(
            PatientId::new(id).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 10).unwrap(),
        )
    }

    fn lab(id: &str) -> LabObservation {
        LabObservation {
            patient_id: PatientId::new(id).unwrap(),
            collection_date: None,
            test_type: TestType::new(TestTypeCode::new("A1C").unwrap(), None),
            result_text: String::new(),
        }
    }

    #[test]
    fn overlap_counts_distinct_ids() {
        let cohort = vec![patient("P1"), patient("P2"), patient("P1"), patient("P3")];
        let labs = vec![lab("P1"), lab("P1"), lab("P9")];
        let cancer = CancerTable {
            headers: vec!["patient_id".to_string()],
            rows: vec![vec!["P2".to_string()], vec!["P3".to_string()], vec![String::new()]],
            patient_id_index: 0,
        };
        let overlap = compute_overlap(&cohort, &labs, &cancer);

        assert_eq!(overlap.labs.cohort_patients, 3);
        assert_eq!(overlap.labs.table_patients, 2);
        assert_eq!(overlap.labs.shared_patients, 1);
        assert_eq!(overlap.cancer.table_patients, 2);
        assert_eq!(overlap.cancer.shared_patients, 2);
        assert!((overlap.cancer.percent_of_cohort - 200.0 / 3.0).abs() < 1e-9);
    }
}
