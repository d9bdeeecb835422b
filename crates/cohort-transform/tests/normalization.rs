use cohort_model::DoseCategory;
use cohort_transform::normalization::{clean_yes_no, dose_category, parse_numeric};
use proptest::prelude::*;

proptest! {
    #[test]
    fn dose_category_matches_bucket_bounds(dose in 0.0f64..40.0) {
        let expected = if dose < 10.0 {
            DoseCategory::Below10
        } else if dose <= 15.0 {
            DoseCategory::From10To15
        } else {
            DoseCategory::Above15
        };
        prop_assert_eq!(dose_category(Some(dose)), expected);
    }

    #[test]
    fn yes_prefixed_text_is_true(rest in "[a-z ]{0,12}") {
        let value = format!("y{rest}");
        prop_assert_eq!(clean_yes_no(Some(value.as_str())), Some(true));
    }

    #[test]
    fn parsed_numbers_are_finite(text in "\\PC{0,16}") {
        if let Some(value) = parse_numeric(&text) {
            prop_assert!(value.is_finite());
        }
    }

    #[test]
    fn formatted_numbers_round_trip(value in -1.0e6f64..1.0e6) {
        prop_assert_eq!(parse_numeric(&value.to_string()), Some(value));
    }
}
