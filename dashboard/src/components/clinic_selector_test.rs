use super::*;

#[test]
fn option_values_round_trip_ids() {
    assert_eq!(parse_selection(&selection_value(Some(7))), Some(7));
}

#[test]
fn empty_value_means_all_clinics() {
    assert_eq!(selection_value(None), ALL_CLINICS_VALUE);
    assert_eq!(parse_selection(ALL_CLINICS_VALUE), None);
    assert_eq!(parse_selection("abc"), None);
}
