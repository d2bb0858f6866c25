//! Notifier that feeds the toast signal.

#[cfg(test)]
#[path = "notifier_test.rs"]
mod notifier_test;

use leptos::prelude::*;
use session::{Notice, Notifier};

use crate::state::toast::ToastState;
#[cfg(feature = "csr")]
use crate::state::toast::DISMISS_AFTER_MS;

/// Pushes notices onto the toast queue and schedules their dismissal.
#[derive(Clone, Copy)]
pub struct ToastNotifier {
    toasts: RwSignal<ToastState>,
}

impl ToastNotifier {
    pub fn new(toasts: RwSignal<ToastState>) -> Self {
        Self { toasts }
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notice: Notice) {
        tracing::info!(title = %notice.title, "notice");
        let Some(id) = self.toasts.try_update(|state| state.push(notice)) else {
            return;
        };
        #[cfg(feature = "csr")]
        {
            let toasts = self.toasts;
            leptos::task::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(DISMISS_AFTER_MS).await;
                let _ = toasts.try_update(|state| state.dismiss(id));
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = id;
        }
    }
}
