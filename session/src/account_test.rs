use super::*;
use crate::storage::{KeyValueStore, MemoryStore, TOKEN_KEY};
use crate::test_helpers::{harness_with_storage, make_token, signed_in_harness, token_with_payload};
use crate::token::Role;
use crate::transport::RequestBody;

fn reset_pending_harness() -> crate::test_helpers::Harness {
    let token = token_with_payload(&serde_json::json!({
        "user_id": "8", "name": "New", "email": "new@jamii.test", "role": "staff", "must_change_password": true
    }));
    let h = harness_with_storage(MemoryStore::with_entries(&[(TOKEN_KEY, &token)]));
    h.session.initialize();
    h
}

// =============================================================
// validation
// =============================================================

#[test]
fn login_input_trims_and_requires_both_fields() {
    assert_eq!(validate_login_input("  a@x.com ", "pw"), Ok("a@x.com".to_owned()));
    assert_eq!(validate_login_input("", "pw"), Err("Enter both email and password."));
    assert_eq!(validate_login_input("a@x.com", ""), Err("Enter both email and password."));
    assert_eq!(validate_login_input("ax.com", "pw"), Err("Enter a valid email address."));
}

#[test]
fn password_change_rules() {
    assert_eq!(validate_password_change("old", "", ""), Err("Fill in all password fields."));
    assert_eq!(
        validate_password_change("old", "short", "short"),
        Err("New password must be at least 8 characters.")
    );
    assert_eq!(
        validate_password_change("old", "longenough1", "longenough2"),
        Err("New passwords do not match.")
    );
    assert_eq!(
        validate_password_change("samepassword", "samepassword", "samepassword"),
        Err("New password must differ from the current one.")
    );
    assert_eq!(validate_password_change("oldpassword", "newpassword", "newpassword"), Ok(()));
}

// =============================================================
// change_password
// =============================================================

#[tokio::test]
async fn change_password_clears_reset_flag() {
    let h = reset_pending_harness();
    h.transport.push_json(200, serde_json::json!({"detail": "Password updated."}));

    let user = change_password(&h.fetch, "temp-pass", "new-password").await.unwrap().unwrap();

    assert!(!user.must_change_password);
    let sent = h.transport.last_request();
    assert_eq!(sent.url, "http://api.test/api/change-password/");
    assert_eq!(
        sent.body,
        RequestBody::Json(serde_json::json!({"old_password": "temp-pass", "new_password": "new-password"}))
    );
}

#[tokio::test]
async fn change_password_adopts_reissued_token() {
    let h = reset_pending_harness();
    let fresh = make_token("8", Role::Staff);
    h.transport.push_json(200, serde_json::json!({"access": fresh}));

    let user = change_password(&h.fetch, "temp-pass", "new-password").await.unwrap().unwrap();

    assert!(!user.must_change_password);
    assert_eq!(h.storage.get(TOKEN_KEY).as_deref(), Some(fresh.as_str()));
}

#[tokio::test]
async fn rejected_change_keeps_flag() {
    let h = reset_pending_harness();
    h.transport.push_json(400, serde_json::json!({"old_password": ["Wrong password."]}));

    let err = change_password(&h.fetch, "bad", "new-password").await.unwrap_err();

    assert_eq!(err.to_string(), "old_password: Wrong password.");
    assert!(h.session.user().unwrap().must_change_password);
}

#[tokio::test]
async fn change_password_unauthorized_ends_session() {
    let h = signed_in_harness(Role::Doctor);
    h.transport.push_json(401, serde_json::json!({}));

    let err = change_password(&h.fetch, "a", "b").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(h.session.user().is_none());
}
