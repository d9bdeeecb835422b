//! Tests for cohort-model types.

use cohort_model::{
    CombinedRecord, Comorbidities, Comorbidity, Enzyme, Group, LabPanel, MatchedCohort,
    MatchedRecord, PatientRecord, Timepoint,
};

fn combined(group: Group, row: usize, age: f64) -> CombinedRecord {
    CombinedRecord {
        record: PatientRecord::new(group, row, row.to_string()),
        age,
        sex_bin: 1,
    }
}

#[test]
fn lab_panel_stores_each_cell_independently() {
    let panel = LabPanel::default()
        .with(Enzyme::Ast, Timepoint::Baseline, Some(40.0))
        .with(Enzyme::Ast, Timepoint::Month6, Some(55.0))
        .with(Enzyme::Ggt, Timepoint::Month12, Some(12.0));

    assert_eq!(panel.get(Enzyme::Ast, Timepoint::Baseline), Some(40.0));
    assert_eq!(panel.get(Enzyme::Ast, Timepoint::Month6), Some(55.0));
    assert_eq!(panel.get(Enzyme::Ggt, Timepoint::Month12), Some(12.0));
    assert_eq!(panel.get(Enzyme::Alt, Timepoint::Baseline), None);
}

#[test]
fn comorbidities_default_to_missing() {
    let flags = Comorbidities::default().with(Comorbidity::Pvt, Some(true));
    assert_eq!(flags.get(Comorbidity::Pvt), Some(true));
    for flag in Comorbidity::ALL {
        if flag != Comorbidity::Pvt {
            assert_eq!(flags.get(flag), None);
        }
    }
}

#[test]
fn new_record_has_no_exposure_fields() {
    let record = PatientRecord::new(Group::Control, 3, "17");
    assert_eq!(record.dose_category, None);
    assert_eq!(record.adverse_event, None);
    assert_eq!(record.source_row, 3);
}

#[test]
fn matched_cohort_pairs_follow_storage_order() {
    let cohort = MatchedCohort {
        records: vec![
            MatchedRecord {
                record: combined(Group::Treatment, 1, 40.0),
                propensity: 0.4,
                pair_id: 1,
            },
            MatchedRecord {
                record: combined(Group::Control, 2, 41.0),
                propensity: 0.39,
                pair_id: 1,
            },
        ],
    };

    assert_eq!(cohort.pair_count(), 1);
    assert_eq!(cohort.count(Group::Treatment), 1);
    assert_eq!(cohort.count(Group::Control), 1);
    let (treated, control) = cohort.pairs().next().expect("one pair");
    assert_eq!(treated.group(), Group::Treatment);
    assert_eq!(control.patient().source_row, 2);
}

#[test]
fn record_serializes() {
    let record = PatientRecord::new(Group::Treatment, 1, "101");
    let json = serde_json::to_string(&record).expect("serialize record");
    let round: PatientRecord = serde_json::from_str(&json).expect("deserialize record");
    assert_eq!(round, record);
}
