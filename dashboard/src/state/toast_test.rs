use super::*;

#[test]
fn push_assigns_increasing_ids() {
    let mut state = ToastState::default();
    let a = state.push(Notice::new(NoticeLevel::Info, "A", "first"));
    let b = state.push(Notice::session_expired());
    assert!(b > a);
    assert_eq!(state.items.len(), 2);
}

#[test]
fn dismiss_removes_only_matching_toast() {
    let mut state = ToastState::default();
    let a = state.push(Notice::new(NoticeLevel::Info, "A", ""));
    state.push(Notice::new(NoticeLevel::Error, "B", ""));

    state.dismiss(a);

    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].notice.title, "B");
}

#[test]
fn overflow_drops_oldest() {
    let mut state = ToastState::default();
    for i in 0..=MAX_VISIBLE {
        state.push(Notice::new(NoticeLevel::Info, format!("T{i}"), ""));
    }
    assert_eq!(state.items.len(), MAX_VISIBLE);
    assert_eq!(state.items[0].notice.title, "T1");
}

#[test]
fn warning_class() {
    assert_eq!(level_class(NoticeLevel::Warning), "toast toast--warning");
}
