//! Unified and matched cohort tables.

use serde::{Deserialize, Serialize};

use crate::enums::Group;
use crate::patient::PatientRecord;

/// A patient record that carries both matching covariates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub record: PatientRecord,
    pub age: f64,
    /// 1 for male, 0 otherwise.
    pub sex_bin: u8,
}

impl CombinedRecord {
    pub fn group(&self) -> Group {
        self.record.group
    }
}

/// Unified two-arm table ready for propensity estimation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedCohort {
    /// Treatment rows first, then control rows, each in sheet order.
    pub records: Vec<CombinedRecord>,
    /// Rows excluded for a missing age or sex.
    pub dropped: usize,
}

impl CombinedCohort {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, group: Group) -> usize {
        self.records.iter().filter(|r| r.group() == group).count()
    }

    pub fn patients(&self) -> impl Iterator<Item = &PatientRecord> {
        self.records.iter().map(|r| &r.record)
    }
}

/// A record selected by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRecord {
    pub record: CombinedRecord,
    pub propensity: f64,
    /// 1-based pair number in match order.
    pub pair_id: usize,
}

impl MatchedRecord {
    pub fn group(&self) -> Group {
        self.record.group()
    }

    pub fn patient(&self) -> &PatientRecord {
        &self.record.record
    }
}

/// Balanced 1:1 cohort.
///
/// Records are stored pair by pair: the treated record followed by its
/// control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedCohort {
    pub records: Vec<MatchedRecord>,
}

impl MatchedCohort {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.records.len() / 2
    }

    pub fn count(&self, group: Group) -> usize {
        self.records.iter().filter(|r| r.group() == group).count()
    }

    pub fn patients(&self) -> impl Iterator<Item = &PatientRecord> {
        self.records.iter().map(MatchedRecord::patient)
    }

    /// (treated, control) pairs in match order.
    pub fn pairs(&self) -> impl Iterator<Item = (&MatchedRecord, &MatchedRecord)> {
        self.records
            .chunks_exact(2)
            .map(|pair| (&pair[0], &pair[1]))
    }
}
