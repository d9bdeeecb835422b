//! Versioned mapping tables.
//!
//! A [`SheetMapping`] names, for one sheet, the source column that feeds each
//! [`CanonicalField`]. Fields left out of a table are absent for that sheet:
//! they harmonize to missing values, or to "not applicable" for dose and
//! adverse-event fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cohort_model::{Comorbidity, Enzyme, Group, Timepoint};

use crate::error::{MappingError, Result};
use crate::field::CanonicalField;

/// Column mapping for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMapping {
    pub version: u32,
    pub sheet: String,
    pub group: Group,
    pub columns: BTreeMap<CanonicalField, String>,
}

impl SheetMapping {
    pub fn column(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn maps(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Checks that required fields are present and no column name is blank.
    pub fn validate(&self) -> Result<()> {
        for field in CanonicalField::REQUIRED {
            if !self.maps(field) {
                return Err(MappingError::MissingRequiredField {
                    sheet: self.sheet.clone(),
                    version: self.version,
                    field,
                });
            }
        }
        if let Some((field, _)) = self
            .columns
            .iter()
            .find(|(_, column)| column.trim().is_empty())
        {
            return Err(MappingError::BlankColumn {
                sheet: self.sheet.clone(),
                version: self.version,
                field: *field,
            });
        }
        Ok(())
    }

    /// Built-in table for the treatment sheet.
    pub fn default_treatment() -> Self {
        let mut columns = BTreeMap::new();
        insert(&mut columns, CanonicalField::PatientId, "Patient #");
        insert(&mut columns, CanonicalField::Age, "Age at Y90");
        insert(&mut columns, CanonicalField::Sex, "Sex");
        insert(&mut columns, CanonicalField::Race, "Race");
        for (flag, column) in [
            (Comorbidity::PortalHtn, "Portal HTN"),
            (Comorbidity::Cpsh, "CPSH"),
            (Comorbidity::Pvt, "PVT"),
            (Comorbidity::IbdCvidCeliac, "IBD/CVID/Celiac"),
            (Comorbidity::Autoimmune, "Autoimmune disease"),
            (Comorbidity::Hypercoag, "Hypercoagulable"),
        ] {
            insert(&mut columns, CanonicalField::Comorbidity(flag), column);
        }
        for enzyme in Enzyme::ALL {
            for timepoint in Timepoint::ALL {
                let column = match timepoint {
                    Timepoint::Baseline => format!("{} baseline", enzyme.label()),
                    other => format!("{} {}mo", enzyme.label(), other.months()),
                };
                insert(&mut columns, CanonicalField::Lab(enzyme, timepoint), &column);
            }
        }
        insert(&mut columns, CanonicalField::DoseMgkg, "Dose (mg/kg)");
        insert(&mut columns, CanonicalField::IntervalDays, "Treatment interval (days)");
        insert(&mut columns, CanonicalField::AdverseEvent, "Adverse events");
        Self {
            version: 1,
            sheet: "treatment".to_string(),
            group: Group::Treatment,
            columns,
        }
    }

    /// Built-in table for the control sheet. It carries no dose or
    /// adverse-event columns.
    pub fn default_control() -> Self {
        let mut columns = BTreeMap::new();
        insert(&mut columns, CanonicalField::PatientId, "Study ID");
        insert(&mut columns, CanonicalField::Age, "Age");
        insert(&mut columns, CanonicalField::Sex, "Gender");
        insert(&mut columns, CanonicalField::Race, "Race/Ethnicity");
        for (flag, column) in [
            (Comorbidity::PortalHtn, "Portal hypertension"),
            (Comorbidity::Cpsh, "CPSH (1=yes)"),
            (Comorbidity::Pvt, "PVT (1=yes)"),
            (Comorbidity::IbdCvidCeliac, "IBD, CVID or celiac"),
            (Comorbidity::Autoimmune, "Autoimmune"),
            (Comorbidity::Hypercoag, "Hypercoagulable state"),
        ] {
            insert(&mut columns, CanonicalField::Comorbidity(flag), column);
        }
        for enzyme in Enzyme::ALL {
            for timepoint in Timepoint::ALL {
                let column = format!("{} {}", enzyme.label(), timepoint.months());
                insert(&mut columns, CanonicalField::Lab(enzyme, timepoint), &column);
            }
        }
        Self {
            version: 1,
            sheet: "control".to_string(),
            group: Group::Control,
            columns,
        }
    }
}

fn insert(columns: &mut BTreeMap<CanonicalField, String>, field: CanonicalField, column: &str) {
    columns.insert(field, column.to_string());
}

/// The pair of tables used by one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingSet {
    pub treatment: SheetMapping,
    pub control: SheetMapping,
}

impl Default for MappingSet {
    fn default() -> Self {
        Self {
            treatment: SheetMapping::default_treatment(),
            control: SheetMapping::default_control(),
        }
    }
}

impl MappingSet {
    pub fn get(&self, group: Group) -> &SheetMapping {
        match group {
            Group::Treatment => &self.treatment,
            Group::Control => &self.control,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.treatment.validate()?;
        self.control.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_are_valid() {
        MappingSet::default().validate().expect("valid defaults");
    }

    #[test]
    fn control_has_no_exposure_columns() {
        let control = SheetMapping::default_control();
        assert!(!control.maps(CanonicalField::DoseMgkg));
        assert!(!control.maps(CanonicalField::AdverseEvent));
        assert_eq!(
            control.column(CanonicalField::Lab(Enzyme::Ggt, Timepoint::Month12)),
            Some("GGT 12")
        );
    }

    #[test]
    fn treatment_lab_columns() {
        let treatment = SheetMapping::default_treatment();
        assert_eq!(
            treatment.column(CanonicalField::Lab(Enzyme::Ast, Timepoint::Baseline)),
            Some("AST baseline")
        );
        assert_eq!(
            treatment.column(CanonicalField::Lab(Enzyme::Alp, Timepoint::Month6)),
            Some("ALP 6mo")
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut mapping = SheetMapping::default_control();
        mapping.columns.remove(&CanonicalField::Sex);
        assert_eq!(
            mapping.validate(),
            Err(MappingError::MissingRequiredField {
                sheet: "control".to_string(),
                version: 1,
                field: CanonicalField::Sex,
            })
        );
    }

    #[test]
    fn blank_column_is_rejected() {
        let mut mapping = SheetMapping::default_treatment();
        mapping.columns.insert(CanonicalField::Race, "  ".to_string());
        assert!(matches!(
            mapping.validate(),
            Err(MappingError::BlankColumn { .. })
        ));
    }
}
