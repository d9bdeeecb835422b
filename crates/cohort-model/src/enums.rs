//! Categorical types shared across the cohort pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Study arm a patient record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Treatment,
    Control,
}

impl Group {
    /// Both arms, treatment first.
    pub const ALL: [Group; 2] = [Group::Treatment, Group::Control];

    pub fn as_str(self) -> &'static str {
        match self {
            Group::Treatment => "TREATMENT",
            Group::Control => "CONTROL",
        }
    }

    /// Response value of the propensity model (1 for treatment).
    pub fn indicator(self) -> u8 {
        match self {
            Group::Treatment => 1,
            Group::Control => 0,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TREATMENT" => Ok(Group::Treatment),
            "CONTROL" => Ok(Group::Control),
            _ => Err(ModelError::UnknownValue {
                kind: "group",
                value: s.to_string(),
            }),
        }
    }
}

/// Harmonized race category.
///
/// Missing source values land in `Other`, the same bucket as unrecognized
/// codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Race {
    White,
    Black,
    Hispanic,
    Asian,
    #[default]
    Other,
}

impl Race {
    pub const ALL: [Race; 5] = [
        Race::White,
        Race::Black,
        Race::Hispanic,
        Race::Asian,
        Race::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Race::White => "White",
            Race::Black => "Black",
            Race::Hispanic => "Hispanic",
            Race::Asian => "Asian",
            Race::Other => "Other",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight-based dose bucket in mg/kg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DoseCategory {
    Below10,
    From10To15,
    Above15,
    NotRecorded,
}

impl DoseCategory {
    /// Report order.
    pub const ALL: [DoseCategory; 4] = [
        DoseCategory::Below10,
        DoseCategory::From10To15,
        DoseCategory::Above15,
        DoseCategory::NotRecorded,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DoseCategory::Below10 => "<10",
            DoseCategory::From10To15 => "10\u{2013}15",
            DoseCategory::Above15 => ">15",
            DoseCategory::NotRecorded => "Not recorded",
        }
    }
}

impl fmt::Display for DoseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Comorbidity flags carried on every patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comorbidity {
    PortalHtn,
    Cpsh,
    Pvt,
    IbdCvidCeliac,
    Autoimmune,
    Hypercoag,
}

impl Comorbidity {
    pub const ALL: [Comorbidity; 6] = [
        Comorbidity::PortalHtn,
        Comorbidity::Cpsh,
        Comorbidity::Pvt,
        Comorbidity::IbdCvidCeliac,
        Comorbidity::Autoimmune,
        Comorbidity::Hypercoag,
    ];

    /// Canonical field key.
    pub fn key(self) -> &'static str {
        match self {
            Comorbidity::PortalHtn => "portal_htn",
            Comorbidity::Cpsh => "cpsh",
            Comorbidity::Pvt => "pvt",
            Comorbidity::IbdCvidCeliac => "ibd_cvid_celiac",
            Comorbidity::Autoimmune => "autoimmune",
            Comorbidity::Hypercoag => "hypercoag",
        }
    }

    /// Human-readable label for report rows.
    pub fn label(self) -> &'static str {
        match self {
            Comorbidity::PortalHtn => "Portal hypertension",
            Comorbidity::Cpsh => "CPSH",
            Comorbidity::Pvt => "Portal vein thrombosis",
            Comorbidity::IbdCvidCeliac => "IBD/CVID/Celiac",
            Comorbidity::Autoimmune => "Autoimmune disease",
            Comorbidity::Hypercoag => "Hypercoagulable state",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Comorbidity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Comorbidity::ALL
            .into_iter()
            .find(|flag| flag.key() == key)
            .ok_or_else(|| ModelError::UnknownValue {
                kind: "comorbidity",
                value: s.to_string(),
            })
    }
}

/// Liver enzymes tracked in the lab panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enzyme {
    Ast,
    Alt,
    Alp,
    Ggt,
}

impl Enzyme {
    pub const ALL: [Enzyme; 4] = [Enzyme::Ast, Enzyme::Alt, Enzyme::Alp, Enzyme::Ggt];

    pub fn key(self) -> &'static str {
        match self {
            Enzyme::Ast => "ast",
            Enzyme::Alt => "alt",
            Enzyme::Alp => "alp",
            Enzyme::Ggt => "ggt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Enzyme::Ast => "AST",
            Enzyme::Alt => "ALT",
            Enzyme::Alp => "ALP",
            Enzyme::Ggt => "GGT",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Lab draw timepoint relative to treatment start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timepoint {
    Baseline,
    Month6,
    Month12,
}

impl Timepoint {
    pub const ALL: [Timepoint; 3] = [Timepoint::Baseline, Timepoint::Month6, Timepoint::Month12];

    pub fn months(self) -> u32 {
        match self {
            Timepoint::Baseline => 0,
            Timepoint::Month6 => 6,
            Timepoint::Month12 => 12,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub(crate) fn comorbidity_index(flag: Comorbidity) -> usize {
    flag.index()
}

pub(crate) fn lab_index(enzyme: Enzyme, timepoint: Timepoint) -> (usize, usize) {
    (enzyme.index(), timepoint.index())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_parses_case_insensitively() {
        assert_eq!("treatment".parse::<Group>().unwrap(), Group::Treatment);
        assert_eq!(" CONTROL ".parse::<Group>().unwrap(), Group::Control);
        assert!("placebo".parse::<Group>().is_err());
    }

    #[test]
    fn dose_labels_use_en_dash() {
        assert_eq!(DoseCategory::From10To15.label(), "10–15");
        assert_eq!(DoseCategory::NotRecorded.to_string(), "Not recorded");
    }

    #[test]
    fn comorbidity_keys_round_trip() {
        for flag in Comorbidity::ALL {
            assert_eq!(flag.key().parse::<Comorbidity>().unwrap(), flag);
        }
    }
}
