//! Toast queue shown in the top-right corner.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

use session::{Notice, NoticeLevel};

/// Oldest toasts are dropped past this many.
pub const MAX_VISIBLE: usize = 4;
/// Auto-dismiss delay in milliseconds.
pub const DISMISS_AFTER_MS: u32 = 5_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToastState {
    pub items: Vec<Toast>,
    next_id: u64,
}

impl ToastState {
    /// Queue a notice and return its toast id.
    pub fn push(&mut self, notice: Notice) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Toast { id, notice });
        if self.items.len() > MAX_VISIBLE {
            let excess = self.items.len() - MAX_VISIBLE;
            self.items.drain(..excess);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|toast| toast.id != id);
    }
}

/// CSS modifier for a notice level.
pub fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "toast toast--info",
        NoticeLevel::Success => "toast toast--success",
        NoticeLevel::Warning => "toast toast--warning",
        NoticeLevel::Error => "toast toast--error",
    }
}
