//! Derived clinical fields.

use cohort_model::{Derived, Enzyme, LabPanel, Timepoint};

use crate::normalization::{finite, percent_change};

/// Six-month absolute change for one enzyme.
pub fn delta_6(labs: &LabPanel, enzyme: Enzyme) -> Option<f64> {
    let pre = labs.get(enzyme, Timepoint::Baseline)?;
    let post = labs.get(enzyme, Timepoint::Month6)?;
    finite(post - pre)
}

/// Six-month percent change for one enzyme.
pub fn pct_change_6(labs: &LabPanel, enzyme: Enzyme) -> Option<f64> {
    let pre = labs.get(enzyme, Timepoint::Baseline)?;
    let post = labs.get(enzyme, Timepoint::Month6)?;
    finite(percent_change(pre, post))
}

/// Computes every derived field from a lab panel.
pub fn derive_fields(labs: &LabPanel) -> Derived {
    Derived {
        delta_ast_6: delta_6(labs, Enzyme::Ast),
        delta_alt_6: delta_6(labs, Enzyme::Alt),
        delta_alp_6: delta_6(labs, Enzyme::Alp),
        pct_ast_6: pct_change_6(labs, Enzyme::Ast),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_fields() {
        let labs = LabPanel::default()
            .with(Enzyme::Ast, Timepoint::Baseline, Some(100.0))
            .with(Enzyme::Ast, Timepoint::Month6, Some(150.0))
            .with(Enzyme::Alt, Timepoint::Baseline, Some(40.0))
            .with(Enzyme::Alp, Timepoint::Month6, Some(90.0));

        let derived = derive_fields(&labs);
        assert_eq!(derived.delta_ast_6, Some(50.0));
        assert_eq!(derived.pct_ast_6, Some(50.0));
        assert_eq!(derived.delta_alt_6, None);
        assert_eq!(derived.delta_alp_6, None);
    }

    #[test]
    fn test_zero_baseline_percent_is_missing() {
        let labs = LabPanel::default()
            .with(Enzyme::Ast, Timepoint::Baseline, Some(0.0))
            .with(Enzyme::Ast, Timepoint::Month6, Some(50.0));

        let derived = derive_fields(&labs);
        assert_eq!(derived.delta_ast_6, Some(50.0));
        assert_eq!(derived.pct_ast_6, None);
    }
}
