//! Canonical patient record produced by harmonization.

use serde::{Deserialize, Serialize};

use crate::enums::{
    Comorbidity, DoseCategory, Enzyme, Group, Race, Timepoint, comorbidity_index, lab_index,
};

/// Tri-state comorbidity flags (`None` = missing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comorbidities {
    flags: [Option<bool>; 6],
}

impl Comorbidities {
    pub fn get(&self, flag: Comorbidity) -> Option<bool> {
        self.flags[comorbidity_index(flag)]
    }

    pub fn set(&mut self, flag: Comorbidity, value: Option<bool>) {
        self.flags[comorbidity_index(flag)] = value;
    }

    #[must_use]
    pub fn with(mut self, flag: Comorbidity, value: Option<bool>) -> Self {
        self.set(flag, value);
        self
    }
}

/// Liver panel values by enzyme and timepoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabPanel {
    values: [[Option<f64>; 3]; 4],
}

impl LabPanel {
    pub fn get(&self, enzyme: Enzyme, timepoint: Timepoint) -> Option<f64> {
        let (row, col) = lab_index(enzyme, timepoint);
        self.values[row][col]
    }

    pub fn set(&mut self, enzyme: Enzyme, timepoint: Timepoint, value: Option<f64>) {
        let (row, col) = lab_index(enzyme, timepoint);
        self.values[row][col] = value;
    }

    #[must_use]
    pub fn with(mut self, enzyme: Enzyme, timepoint: Timepoint, value: Option<f64>) -> Self {
        self.set(enzyme, timepoint, value);
        self
    }
}

/// Per-patient computed fields.
///
/// Every value is `None` when an input is missing or the result is not
/// finite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    pub delta_ast_6: Option<f64>,
    pub delta_alt_6: Option<f64>,
    pub delta_alp_6: Option<f64>,
    pub pct_ast_6: Option<f64>,
}

impl Derived {
    /// Six-month change for the enzymes that carry one.
    pub fn delta_6(&self, enzyme: Enzyme) -> Option<f64> {
        match enzyme {
            Enzyme::Ast => self.delta_ast_6,
            Enzyme::Alt => self.delta_alt_6,
            Enzyme::Alp => self.delta_alp_6,
            Enzyme::Ggt => None,
        }
    }
}

/// One harmonized patient row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// 1-based data line in the source sheet.
    pub source_row: usize,
    /// Raw identifier text, kept for diagnostics.
    pub patient_id: String,
    pub group: Group,
    pub age: Option<f64>,
    /// Raw sex string as recorded in the sheet.
    pub sex: Option<String>,
    pub race: Race,
    pub comorbidities: Comorbidities,
    pub labs: LabPanel,
    pub derived: Derived,
    pub mgkg: Option<f64>,
    /// `None` when the source sheet carries no dose field.
    pub dose_category: Option<DoseCategory>,
    pub interval_days: Option<f64>,
    /// `None` when the source sheet carries no adverse-event field.
    pub adverse_event: Option<bool>,
}

impl PatientRecord {
    /// Empty record for a group; fields are filled by the harmonizer.
    pub fn new(group: Group, source_row: usize, patient_id: impl Into<String>) -> Self {
        Self {
            source_row,
            patient_id: patient_id.into(),
            group,
            age: None,
            sex: None,
            race: Race::Other,
            comorbidities: Comorbidities::default(),
            labs: LabPanel::default(),
            derived: Derived::default(),
            mgkg: None,
            dose_category: None,
            interval_days: None,
            adverse_event: None,
        }
    }
}
