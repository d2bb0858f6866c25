use super::*;

#[test]
fn columns_put_id_first_and_skip_nested() {
    let rows = vec![serde_json::json!({
        "name": "Amina",
        "id": 3,
        "clinic": {"id": 1, "name": "A"},
        "age": 41,
        "tags": ["x"]
    })];
    assert_eq!(table_columns(&rows), vec!["id", "age", "name"]);
}

#[test]
fn columns_empty_for_no_rows_or_non_objects() {
    assert!(table_columns(&[]).is_empty());
    assert!(table_columns(&[serde_json::json!(5)]).is_empty());
}

#[test]
fn columns_capped() {
    let row = serde_json::json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6, "g": 7});
    assert_eq!(table_columns(&[row]).len(), MAX_COLUMNS);
}

#[test]
fn labels_title_case_snake_keys() {
    assert_eq!(column_label("clinic_name"), "Clinic Name");
    assert_eq!(column_label("id"), "Id");
}

#[test]
fn cell_text_formats_values() {
    assert_eq!(cell_text(&Value::Null), "-");
    assert_eq!(cell_text(&serde_json::json!(true)), "Yes");
    assert_eq!(cell_text(&serde_json::json!(12)), "12");
    assert_eq!(cell_text(&serde_json::json!([1, 2])), "2 items");
    assert_eq!(cell_text(&serde_json::json!({"clinic_name": "Wellness"})), "Wellness");
    assert_eq!(cell_text(&serde_json::json!({"x": 1})), "...");
}

#[test]
fn row_id_accepts_numbers_and_strings() {
    assert_eq!(row_id(&serde_json::json!({"id": 9})), Some("9".to_owned()));
    assert_eq!(row_id(&serde_json::json!({"id": "p-1"})), Some("p-1".to_owned()));
    assert_eq!(row_id(&serde_json::json!({"id": ""})), None);
    assert_eq!(row_id(&serde_json::json!({})), None);
}

#[test]
fn only_latest_request_is_current() {
    let owner = Owner::new();
    owner.with(|| {
        let seq = RequestSeq::new();
        let first = seq.begin();
        let second = seq.begin();

        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    });
}
