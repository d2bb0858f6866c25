use super::*;

#[test]
fn method_names_are_uppercase() {
    assert_eq!(Method::Get.as_str(), "GET");
    assert_eq!(Method::Patch.as_str(), "PATCH");
    assert_eq!(Method::Delete.as_str(), "DELETE");
}

#[test]
fn header_lookup_ignores_case() {
    let mut request = HttpRequest::new(Method::Get, "/api/patients/");
    request.headers.push(("content-type".to_owned(), "text/plain".to_owned()));
    assert_eq!(request.header("Content-Type"), Some("text/plain"));
    assert_eq!(request.header("Authorization"), None);
}

#[test]
fn body_bytes_follow_body_kind() {
    let mut request = HttpRequest::new(Method::Post, "/x");
    assert_eq!(request.body_bytes(), None);

    request.body = RequestBody::Json(serde_json::json!({"a": 1}));
    assert_eq!(request.body_bytes(), Some(br#"{"a":1}"#.to_vec()));

    request.body = RequestBody::Binary { bytes: vec![1, 2, 3], content_type: None };
    assert_eq!(request.body_bytes(), Some(vec![1, 2, 3]));
}

#[test]
fn success_range_is_2xx() {
    assert!(HttpResponse::new(200, "").is_success());
    assert!(HttpResponse::new(204, "").is_success());
    assert!(!HttpResponse::new(301, "").is_success());
    assert!(!HttpResponse::new(401, "").is_success());
}

#[test]
fn json_value_tolerates_empty_body() {
    assert_eq!(HttpResponse::new(204, "").json_value(), serde_json::Value::Null);
    assert_eq!(
        HttpResponse::new(200, r#"{"detail":"x"}"#).json_value(),
        serde_json::json!({"detail": "x"})
    );
}
