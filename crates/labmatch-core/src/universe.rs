//! The set of test types seen across the lab extract.

use std::collections::HashMap;

use labmatch_model::{LabObservation, TestType, TestTypeCode};

/// Distinct test type codes in first-seen order.
///
/// Each code keeps the first non-blank label seen for it. Matrix columns
/// follow this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestTypeUniverse {
    types: Vec<TestType>,
    positions: HashMap<TestTypeCode, usize>,
}

impl TestTypeUniverse {
    pub fn from_labs(labs: &[LabObservation]) -> Self {
        let mut universe = Self::default();
        for lab in labs {
            universe.observe(&lab.test_type);
        }
        universe
    }

    fn observe(&mut self, test_type: &TestType) {
        match self.positions.get(&test_type.code) {
            Some(&position) => {
                let known = &mut self.types[position];
                if known.label.is_none() && test_type.label.is_some() {
                    known.label.clone_from(&test_type.label);
                }
            }
            None => {
                self.positions
                    .insert(test_type.code.clone(), self.types.len());
                self.types.push(test_type.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &TestTypeCode> {
        self.types.iter().map(|test_type| &test_type.code)
    }

    pub fn position(&self, code: &TestTypeCode) -> Option<usize> {
        self.positions.get(code).copied()
    }

    pub fn label(&self, code: &TestTypeCode) -> Option<&str> {
        self.position(code)
            .and_then(|position| self.types[position].label.as_deref())
    }

    /// The given codes, deduplicated and in universe order.
    pub fn ordered<'a>(&self, codes: impl IntoIterator<Item = &'a TestTypeCode>) -> Vec<TestTypeCode> {
        let mut positions: Vec<usize> = codes
            .into_iter()
            .filter_map(|code| self.position(code))
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
            .into_iter()
            .map(|position| self.types[position].code.clone())
            .collect()
    }
}
