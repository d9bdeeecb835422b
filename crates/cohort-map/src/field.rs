//! Canonical field keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cohort_model::{Comorbidity, Enzyme, Timepoint};

use crate::error::MappingError;

/// A field of the canonical patient record that can be sourced from a
/// sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CanonicalField {
    PatientId,
    Age,
    Sex,
    Race,
    Comorbidity(Comorbidity),
    Lab(Enzyme, Timepoint),
    DoseMgkg,
    IntervalDays,
    AdverseEvent,
}

impl CanonicalField {
    /// Fields every mapping table must carry.
    pub const REQUIRED: [CanonicalField; 3] = [
        CanonicalField::PatientId,
        CanonicalField::Age,
        CanonicalField::Sex,
    ];

    /// Every canonical field in schema order.
    pub fn all() -> Vec<CanonicalField> {
        let mut fields = vec![
            CanonicalField::PatientId,
            CanonicalField::Age,
            CanonicalField::Sex,
            CanonicalField::Race,
        ];
        fields.extend(Comorbidity::ALL.into_iter().map(CanonicalField::Comorbidity));
        for enzyme in Enzyme::ALL {
            for timepoint in Timepoint::ALL {
                fields.push(CanonicalField::Lab(enzyme, timepoint));
            }
        }
        fields.extend([
            CanonicalField::DoseMgkg,
            CanonicalField::IntervalDays,
            CanonicalField::AdverseEvent,
        ]);
        fields
    }

    pub fn key(self) -> String {
        match self {
            CanonicalField::PatientId => "patient_id".to_string(),
            CanonicalField::Age => "age".to_string(),
            CanonicalField::Sex => "sex".to_string(),
            CanonicalField::Race => "race".to_string(),
            CanonicalField::Comorbidity(flag) => flag.key().to_string(),
            CanonicalField::Lab(enzyme, timepoint) => {
                format!("{}_{}", enzyme.key(), timepoint.months())
            }
            CanonicalField::DoseMgkg => "mgkg".to_string(),
            CanonicalField::IntervalDays => "interval_days".to_string(),
            CanonicalField::AdverseEvent => "ae".to_string(),
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for CanonicalField {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        CanonicalField::all()
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| MappingError::UnknownField {
                field: s.to_string(),
            })
    }
}

impl TryFrom<String> for CanonicalField {
    type Error = MappingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CanonicalField> for String {
    fn from(field: CanonicalField) -> Self {
        field.key()
    }
}
