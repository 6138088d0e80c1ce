//! Batch driver: every processed patient against every test type.

use std::time::Instant;

use tracing::{debug, info};

use labmatch_model::{CohortPatient, MatchedRecord, PatientLimit};

use crate::matcher::{LabIndex, match_nearest};
use crate::universe::TestTypeUniverse;

/// Receives progress of the per-patient matching loop.
///
/// The core never prints; front ends decide how progress is shown.
pub trait ProgressSink {
    fn start(&mut self, _total: usize) {}
    fn advance(&mut self, done: usize, total: usize);
    fn finish(&mut self, _total: usize) {}
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&mut self, _done: usize, _total: usize) {}
}

/// Emits progress as `tracing` events.
#[derive(Debug)]
pub struct LogProgress {
    started: Instant,
}

impl Default for LogProgress {
    fn default() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl ProgressSink for LogProgress {
    fn start(&mut self, total: usize) {
        self.started = Instant::now();
        info!(total, "matching patients");
    }

    fn advance(&mut self, done: usize, total: usize) {
        info!(
            done,
            total,
            elapsed_ms = self.started.elapsed().as_millis(),
            "matching progress"
        );
    }

    fn finish(&mut self, total: usize) {
        info!(
            total,
            duration_ms = self.started.elapsed().as_millis(),
            "matching finished"
        );
    }
}

/// The first `limit` cohort rows, in input order.
pub fn select_patients(cohort: &[CohortPatient], limit: PatientLimit) -> &[CohortPatient] {
    &cohort[..limit.take(cohort.len())]
}

/// One matched record per (patient, universe code) pair.
///
/// Records come out patient-major, codes in universe order. `progress` is
/// advanced every `interval` patients and once more at the end.
pub fn match_cohort(
    patients: &[CohortPatient],
    labs: &LabIndex<'_>,
    universe: &TestTypeUniverse,
    max_date_diff_days: u32,
    interval: usize,
    progress: &mut dyn ProgressSink,
) -> Vec<MatchedRecord> {
    let total = patients.len();
    let interval = interval.max(1);
    progress.start(total);

    let mut records = Vec::with_capacity(total * universe.len());
    for (idx, patient) in patients.iter().enumerate() {
        let rows = labs.rows_for(patient.patient_id.as_str());
        for code in universe.codes() {
            records.push(match_nearest(
                &patient.patient_id,
                patient.reference_date,
                rows.iter().copied(),
                Some(code),
                max_date_diff_days,
            ));
        }
        let done = idx + 1;
        if done % interval == 0 && done < total {
            progress.advance(done, total);
        }
    }
    if total > 0 {
        progress.advance(total, total);
    }
    progress.finish(total);

    debug!(
        patients = total,
        records = records.len(),
        matched = records.iter().filter(|r| r.is_match()).count(),
        "matched cohort"
    );
    records
}
