//! Sidebar clinic picker.
//!
//! Changing the clinic persists the selection through the resolver and, when
//! the current view is a nested record, navigates back to its list view.

#[cfg(test)]
#[path = "clinic_selector_test.rs"]
mod clinic_selector_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};
use session::clinic::collapse_path;
use session::{ClinicScope, ClinicSummary, SessionContext};

/// `<option>` value meaning "all clinics" (admins only).
pub const ALL_CLINICS_VALUE: &str = "";

/// Parse an `<option>` value into a clinic id.
pub fn parse_selection(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

pub fn selection_value(selected: Option<i64>) -> String {
    selected.map_or_else(|| ALL_CLINICS_VALUE.to_owned(), |id| id.to_string())
}

#[component]
pub fn ClinicSelector() -> impl IntoView {
    let ctx = expect_context::<SessionContext>();
    let clinics = expect_context::<RwSignal<ClinicScope>>();
    let location = use_location();
    let navigate = use_navigate();

    let on_change = move |ev: leptos::ev::Event| {
        let requested = parse_selection(&event_target_value(&ev));
        let change = ctx.clinics.set_selection(requested);
        clinics.set(ctx.clinics.scope());
        if change.changed {
            if let Some(target) = collapse_path(&location.pathname.get_untracked()) {
                navigate(&target, NavigateOptions::default());
            }
        }
    };

    let is_admin = move || clinics.with(|scope| scope.role.is_some_and(session::Role::is_admin));

    view! {
        <div class="clinic-selector" class:clinic-selector--empty=move || clinics.with(|s| s.clinics.is_empty())>
            <label class="clinic-selector__label">"Clinic"</label>
            <select
                class="clinic-selector__select"
                prop:value=move || selection_value(clinics.with(ClinicScope::selected_id))
                on:change=on_change
            >
                <Show when=is_admin>
                    <option value=ALL_CLINICS_VALUE>"All clinics"</option>
                </Show>
                <For
                    each=move || clinics.get().clinics
                    key=|clinic| clinic.clinic_id
                    children=move |clinic: ClinicSummary| {
                        view! { <option value=clinic.clinic_id.to_string()>{clinic.clinic_name}</option> }
                    }
                />
            </select>
        </div>
    }
}
