use super::*;
use crate::storage::MemoryStore;
use crate::test_helpers::{Harness, harness_with_storage, make_token, signed_in_harness};
use crate::transport::TransportError;

fn signed_in_with(role: Role, entries: &[(&str, &str)]) -> Harness {
    let token = make_token("1", role);
    let mut all = vec![(crate::storage::TOKEN_KEY, token.as_str())];
    all.extend_from_slice(entries);
    let h = harness_with_storage(MemoryStore::with_entries(&all));
    h.session.initialize();
    h
}

fn summary(id: i64, name: &str) -> ClinicSummary {
    ClinicSummary { clinic_id: id, clinic_name: name.to_owned() }
}

// =============================================================
// normalize_clinics
// =============================================================

#[test]
fn normalizes_registry_and_assignment_shapes() {
    let registry = serde_json::json!([{"id": 1, "name": "Afya", "address": "Nairobi"}]);
    let assigned = serde_json::json!([{"clinic_id": 7, "clinic_name": "Wellness", "role": "doctor"}]);
    assert_eq!(normalize_clinics(registry).unwrap(), vec![summary(1, "Afya")]);
    assert_eq!(normalize_clinics(assigned).unwrap(), vec![summary(7, "Wellness")]);
}

#[test]
fn normalizes_paginated_envelope_and_dedupes() {
    let body = serde_json::json!({
        "count": 3,
        "results": [
            {"clinic_id": 2, "clinic_name": "B"},
            {"clinic_id": 1, "clinic_name": "A"},
            {"clinic_id": 2, "clinic_name": "B (second assignment)"}
        ]
    });
    assert_eq!(normalize_clinics(body).unwrap(), vec![summary(2, "B"), summary(1, "A")]);
}

#[test]
fn skips_unrecognized_entries() {
    let body = serde_json::json!([{"id": 1, "name": "A"}, {"foo": "bar"}, 5]);
    assert_eq!(normalize_clinics(body).unwrap(), vec![summary(1, "A")]);
}

#[test]
fn rejects_non_list_body() {
    assert!(normalize_clinics(serde_json::json!({"detail": "x"})).is_err());
}

#[test]
fn endpoint_depends_on_role() {
    assert_eq!(clinics_endpoint(Role::Admin), ADMIN_CLINICS_ENDPOINT);
    assert_eq!(clinics_endpoint(Role::Doctor), DOCTOR_CLINICS_ENDPOINT);
    assert_eq!(clinics_endpoint(Role::Staff), STAFF_CLINICS_ENDPOINT);
}

// =============================================================
// resolve: reconciliation
// =============================================================

#[tokio::test]
async fn doctor_autoselects_first_clinic_and_persists_it() {
    let h = signed_in_harness(Role::Doctor);
    h.transport.push_json(200, serde_json::json!([{"clinic_id": 7, "clinic_name": "Wellness"}]));
    let resolver = ClinicScopeResolver::new(h.fetch.clone());

    let scope = resolver.resolve(Role::Doctor).await;

    assert_eq!(scope.selected, Some(summary(7, "Wellness")));
    assert_eq!(h.storage.get(SELECTED_CLINIC_KEY).as_deref(), Some("7"));
    assert_eq!(h.transport.last_request().url, "http://api.test/api/doctors/my-clinics/");
}

#[tokio::test]
async fn admin_with_stale_persisted_id_selects_none_and_clears_it() {
    let h = signed_in_with(Role::Admin, &[(SELECTED_CLINIC_KEY, "99")]);
    h.transport.push_json(200, serde_json::json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]));
    let resolver = ClinicScopeResolver::new(h.fetch.clone());

    let scope = resolver.resolve(Role::Admin).await;

    assert_eq!(scope.selected, None);
    assert_eq!(scope.clinics.len(), 2);
    assert!(h.storage.get(SELECTED_CLINIC_KEY).is_none());
}

#[tokio::test]
async fn admin_without_persisted_id_sees_all() {
    let h = signed_in_harness(Role::Admin);
    h.transport.push_json(200, serde_json::json!([{"id": 1, "name": "A"}]));
    let resolver = ClinicScopeResolver::new(h.fetch.clone());

    let scope = resolver.resolve(Role::Admin).await;

    assert_eq!(scope.selected, None);
    assert_eq!(scope.clinics, vec![summary(1, "A")]);
}

#[tokio::test]
async fn persisted_id_in_list_is_restored() {
    for role in [Role::Admin, Role::Staff] {
        let h = signed_in_with(role, &[(SELECTED_CLINIC_KEY, "2")]);
        h.transport.push_json(
            200,
            serde_json::json!([
                {"id": 1, "name": "A", "clinic_id": 1, "clinic_name": "A"},
                {"id": 2, "name": "B", "clinic_id": 2, "clinic_name": "B"}
            ]),
        );
        let resolver = ClinicScopeResolver::new(h.fetch.clone());

        let scope = resolver.resolve(role).await;

        assert_eq!(scope.selected, Some(summary(2, "B")), "role {role}");
        assert_eq!(h.storage.get(SELECTED_CLINIC_KEY).as_deref(), Some("2"));
    }
}

#[tokio::test]
async fn staff_stale_persisted_id_falls_back_to_first() {
    let h = signed_in_with(Role::Staff, &[(SELECTED_CLINIC_KEY, "99")]);
    h.transport.push_json(
        200,
        serde_json::json!([{"clinic_id": 3, "clinic_name": "C"}, {"clinic_id": 4, "clinic_name": "D"}]),
    );
    let resolver = ClinicScopeResolver::new(h.fetch.clone());

    let scope = resolver.resolve(Role::Staff).await;

    assert_eq!(scope.selected, Some(summary(3, "C")));
    assert_eq!(h.storage.get(SELECTED_CLINIC_KEY).as_deref(), Some("3"));
}

#[tokio::test]
async fn non_admin_always_has_selection_when_clinics_exist() {
    for role in [Role::Doctor, Role::Staff] {
        for persisted in [None, Some("1"), Some("42"), Some("junk")] {
            let entries: Vec<(&str, &str)> = persisted.map(|p| (SELECTED_CLINIC_KEY, p)).into_iter().collect();
            let h = signed_in_with(role, &entries);
            h.transport.push_json(
                200,
                serde_json::json!([{"clinic_id": 1, "clinic_name": "A"}, {"clinic_id": 5, "clinic_name": "E"}]),
            );
            let resolver = ClinicScopeResolver::new(h.fetch.clone());

            let scope = resolver.resolve(role).await;

            assert!(scope.selected.is_some(), "role {role} persisted {persisted:?}");
        }
    }
}

#[tokio::test]
async fn doctor_with_no_clinics_selects_none() {
    let h = signed_in_harness(Role::Doctor);
    h.transport.push_json(200, serde_json::json!([]));
    let resolver = ClinicScopeResolver::new(h.fetch.clone());

    let scope = resolver.resolve(Role::Doctor).await;

    assert!(scope.clinics.is_empty());
    assert_eq!(scope.selected, None);
}

// =============================================================
// resolve: failures and staleness
// =============================================================

#[tokio::test]
async fn fetch_failure_clears_scope_and_warns() {
    let h = signed_in_harness(Role::Staff);
    let resolver = ClinicScopeResolver::new(h.fetch.clone());
    h.transport.push_json(200, serde_json::json!([{"clinic_id": 1, "clinic_name": "A"}]));
    resolver.resolve(Role::Staff).await;
    h.transport.push_error(TransportError::Network("offline".to_owned()));

    let scope = resolver.resolve(Role::Staff).await;

    assert!(scope.clinics.is_empty());
    assert_eq!(scope.selected, None);
    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert!(h.session.user().is_some());
}

#[tokio::test]
async fn server_error_clears_scope_and_warns() {
    let h = signed_in_harness(Role::Admin);
    h.transport.push_json(500, serde_json::json!({"detail": "boom"}));
    let resolver = ClinicScopeResolver::new(h.fetch.clone());

    let scope = resolver.resolve(Role::Admin).await;

    assert!(scope.clinics.is_empty());
    assert_eq!(h.notifier.notices().len(), 1);
}

#[tokio::test]
async fn unauthorized_clears_scope_without_second_notice() {
    let h = signed_in_harness(Role::Doctor);
    h.transport.push_json(401, serde_json::json!({"detail": "expired"}));
    let resolver = ClinicScopeResolver::new(h.fetch.clone());

    let scope = resolver.resolve(Role::Doctor).await;

    assert!(scope.clinics.is_empty());
    assert_eq!(scope.selected, None);
    assert_eq!(h.notifier.notices().len(), 1);
    assert_eq!(h.notifier.count_titled("Session Expired"), 1);
    assert!(h.session.user().is_none());
}

#[tokio::test]
async fn response_landing_after_logout_is_dropped() {
    let h = signed_in_harness(Role::Doctor);
    let resolver = ClinicScopeResolver::new(h.fetch.clone());
    let session = h.session.clone();
    h.transport.on_send(move |_| session.logout());
    h.transport.push_json(200, serde_json::json!([{"clinic_id": 7, "clinic_name": "Wellness"}]));

    let scope = resolver.resolve(Role::Doctor).await;

    assert!(scope.clinics.is_empty());
    assert_eq!(scope.selected, None);
    assert!(h.storage.get(SELECTED_CLINIC_KEY).is_none());
}

// =============================================================
// set_selection
// =============================================================

async fn resolved(role: Role) -> (Harness, ClinicScopeResolver) {
    let h = signed_in_harness(role);
    h.transport.push_json(
        200,
        serde_json::json!([
            {"id": 1, "name": "A", "clinic_id": 1, "clinic_name": "A"},
            {"id": 2, "name": "B", "clinic_id": 2, "clinic_name": "B"}
        ]),
    );
    let resolver = ClinicScopeResolver::new(h.fetch.clone());
    resolver.resolve(role).await;
    (h, resolver)
}

#[tokio::test]
async fn set_selection_persists_valid_choice() {
    let (h, resolver) = resolved(Role::Admin).await;

    let change = resolver.set_selection(Some(2));

    assert_eq!(change, SelectionChange { selected: Some(summary(2, "B")), changed: true });
    assert_eq!(h.storage.get(SELECTED_CLINIC_KEY).as_deref(), Some("2"));
    assert_eq!(resolver.scope().selected_id(), Some(2));
}

#[tokio::test]
async fn set_selection_same_clinic_is_unchanged() {
    let (_h, resolver) = resolved(Role::Admin).await;
    resolver.set_selection(Some(1));
    assert!(!resolver.set_selection(Some(1)).changed);
}

#[tokio::test]
async fn admin_can_select_all() {
    let (h, resolver) = resolved(Role::Admin).await;
    resolver.set_selection(Some(1));

    let change = resolver.set_selection(None);

    assert_eq!(change.selected, None);
    assert!(change.changed);
    assert!(h.storage.get(SELECTED_CLINIC_KEY).is_none());
}

#[tokio::test]
async fn admin_unknown_id_becomes_none() {
    let (_h, resolver) = resolved(Role::Admin).await;
    assert_eq!(resolver.set_selection(Some(99)).selected, None);
}

#[tokio::test]
async fn non_admin_cannot_clear_selection() {
    let (h, resolver) = resolved(Role::Doctor).await;
    resolver.set_selection(Some(2));

    let change = resolver.set_selection(None);

    assert_eq!(change.selected, Some(summary(1, "A")));
    assert_eq!(h.storage.get(SELECTED_CLINIC_KEY).as_deref(), Some("1"));
}

// =============================================================
// session events
// =============================================================

#[tokio::test]
async fn logout_event_clears_scope() {
    let (_h, resolver) = resolved(Role::Staff).await;
    resolver.on_session_event(&SessionEvent::LoggedOut);
    let scope = resolver.scope();
    assert!(scope.clinics.is_empty());
    assert!(!scope.stale);
}

#[tokio::test]
async fn login_event_marks_scope_stale() {
    let (h, resolver) = resolved(Role::Staff).await;
    resolver.on_session_event(&SessionEvent::LoggedIn(h.session.user().unwrap()));
    assert!(resolver.scope().stale);
}

#[tokio::test]
async fn user_update_with_same_role_keeps_scope() {
    let (h, resolver) = resolved(Role::Staff).await;
    let before = resolver.scope();
    resolver.on_session_event(&SessionEvent::UserUpdated(h.session.user().unwrap()));
    assert_eq!(resolver.scope(), before);
}

#[tokio::test]
async fn adopting_another_doctors_token_marks_scope_stale() {
    let (h, resolver) = resolved(Role::Doctor).await;
    h.session.subscribe(resolver.observer());
    assert_eq!(resolver.scope().clinics.len(), 2);

    h.session.adopt_token(&make_token("2", Role::Doctor)).unwrap();

    let scope = resolver.scope();
    assert!(scope.stale);
    assert!(scope.clinics.is_empty());
    assert_eq!(scope.selected, None);
}

// =============================================================
// collapse_path
// =============================================================

#[test]
fn collapse_path_climbs_to_list_view() {
    assert_eq!(collapse_path("/patients/12"), Some("/patients".to_owned()));
    assert_eq!(collapse_path("/patients/12/cases/3?tab=notes"), Some("/patients".to_owned()));
}

#[test]
fn collapse_path_leaves_top_level_views() {
    assert_eq!(collapse_path("/patients"), None);
    assert_eq!(collapse_path("/patients/"), None);
    assert_eq!(collapse_path("/"), None);
    assert_eq!(collapse_path(""), None);
}
