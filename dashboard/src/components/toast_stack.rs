//! Renders queued notices from the toast signal.

use leptos::prelude::*;

use crate::state::toast::{Toast, ToastState, level_class};

#[component]
pub fn ToastStack() -> impl IntoView {
    let toasts = expect_context::<RwSignal<ToastState>>();

    view! {
        <div class="toast-stack" role="status">
            <For
                each=move || toasts.get().items
                key=|toast| toast.id
                children=move |toast: Toast| {
                    let id = toast.id;
                    view! {
                        <div class=level_class(toast.notice.level)>
                            <strong class="toast__title">{toast.notice.title}</strong>
                            <p class="toast__message">{toast.notice.message}</p>
                            <button
                                class="toast__close"
                                title="Dismiss"
                                on:click=move |_| toasts.update(|s| s.dismiss(id))
                            >
                                "×"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
