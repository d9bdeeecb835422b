//! Union of the two arms into one matching table.

use cohort_model::{CombinedCohort, CombinedRecord, Group, PatientRecord};
use tracing::debug;

/// Binary sex encoding: 1 when the trimmed value starts with "M" in any
/// case, 0 for any other non-blank value, `None` when blank.
pub fn sex_indicator(sex: Option<&str>) -> Option<u8> {
    let first = sex?.trim().chars().next()?;
    Some(u8::from(first.eq_ignore_ascii_case(&'m')))
}

/// Unions the arms and drops rows lacking a matching covariate.
///
/// Treatment rows come first, then control rows, each in input order.
/// Every row is tagged with the arm it was passed in.
pub fn combine(treatment: Vec<PatientRecord>, control: Vec<PatientRecord>) -> CombinedCohort {
    let tagged = treatment
        .into_iter()
        .map(|record| (Group::Treatment, record))
        .chain(control.into_iter().map(|record| (Group::Control, record)));

    let mut cohort = CombinedCohort::default();
    for (group, mut record) in tagged {
        record.group = group;
        let age = record.age.filter(|age| age.is_finite());
        let sex_bin = sex_indicator(record.sex.as_deref());
        match (age, sex_bin) {
            (Some(age), Some(sex_bin)) => cohort.records.push(CombinedRecord {
                record,
                age,
                sex_bin,
            }),
            _ => cohort.dropped += 1,
        }
    }

    debug!(
        treatment = cohort.count(Group::Treatment),
        control = cohort.count(Group::Control),
        dropped = cohort.dropped,
        "cohorts combined"
    );
    cohort
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_indicator() {
        assert_eq!(sex_indicator(Some("M")), Some(1));
        assert_eq!(sex_indicator(Some(" male")), Some(1));
        assert_eq!(sex_indicator(Some("F")), Some(0));
        assert_eq!(sex_indicator(Some("unknown")), Some(0));
        assert_eq!(sex_indicator(Some("  ")), None);
        assert_eq!(sex_indicator(None), None);
    }

    #[test]
    fn test_combine_orders_and_retags() {
        let mut t = PatientRecord::new(Group::Control, 1, "1");
        t.age = Some(50.0);
        t.sex = Some("F".to_string());
        let mut c = PatientRecord::new(Group::Control, 1, "2");
        c.age = Some(60.0);
        c.sex = Some("M".to_string());

        let cohort = combine(vec![t], vec![c]);
        assert_eq!(cohort.len(), 2);
        assert_eq!(cohort.records[0].group(), Group::Treatment);
        assert_eq!(cohort.records[0].sex_bin, 0);
        assert_eq!(cohort.records[1].group(), Group::Control);
        assert_eq!(cohort.records[1].sex_bin, 1);
        assert_eq!(cohort.dropped, 0);
    }
}
