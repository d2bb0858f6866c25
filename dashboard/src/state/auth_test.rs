use super::*;
use session::{Role, User};

fn user(id: &str, role: Role) -> User {
    User {
        id: id.to_owned(),
        name: format!("User {id}"),
        email: format!("user{id}@jamii.test"),
        role,
        avatar: session::token::DEFAULT_AVATAR.to_owned(),
        must_change_password: false,
    }
}

#[test]
fn initialize_ends_loading() {
    let mut snap = SessionSnapshot::default();
    assert!(snap.loading);

    mirror_event(&mut snap, &SessionEvent::Initialized(None));

    assert!(!snap.loading);
    assert!(snap.user.is_none());
}

#[test]
fn login_and_logout_bump_generation() {
    let mut snap = SessionSnapshot::default();
    mirror_event(&mut snap, &SessionEvent::LoggedIn(user("1", Role::Doctor)));
    let after_login = snap.generation;

    mirror_event(&mut snap, &SessionEvent::LoggedOut);

    assert!(snap.user.is_none());
    assert_eq!(snap.generation, after_login + 1);
}

#[test]
fn flag_update_keeps_generation() {
    let mut snap = SessionSnapshot::default();
    let mut u = user("4", Role::Staff);
    u.must_change_password = true;
    mirror_event(&mut snap, &SessionEvent::LoggedIn(u.clone()));
    let generation = snap.generation;

    u.must_change_password = false;
    mirror_event(&mut snap, &SessionEvent::UserUpdated(u));

    assert_eq!(snap.generation, generation);
    assert!(!snap.user.unwrap().must_change_password);
}

#[test]
fn display_name_falls_back_to_email() {
    let mut u = user("2", Role::Admin);
    u.name = "  ".to_owned();
    let snap = SessionSnapshot { user: Some(u), loading: false, generation: 1 };
    assert_eq!(display_name(&snap), "user2@jamii.test");
    assert_eq!(display_name(&SessionSnapshot::default()), "");
}

#[test]
fn observer_updates_both_signals() {
    let owner = Owner::new();
    owner.with(|| {
        let session = RwSignal::new(SessionSnapshot::default());
        let clinics = RwSignal::new(ClinicScope { role: Some(Role::Doctor), ..ClinicScope::default() });
        let observer = mirror_observer(session, clinics);

        observer(&SessionEvent::LoggedOut);

        assert!(!session.get_untracked().loading);
        assert_eq!(clinics.get_untracked(), ClinicScope::default());
    });
}
