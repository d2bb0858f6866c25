//! Generic list and detail screens for REST resources.
//!
//! DESIGN
//! ======
//! Records stay as JSON values. The list view derives its columns from the
//! first record; the detail view renders every field. Listings follow the
//! selected clinic and reload when it changes.
//!
//! ERROR HANDLING
//! ==============
//! A 401 has already ended the session and queued a notice, so it is not
//! shown again here. Other failures render inline.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use leptos::prelude::*;
use leptos::tachys::view::any_view::IntoAny;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;
use serde_json::Value;
use session::resource::ResourceKind;
use session::{ClinicScope, SessionContext};

/// Most columns shown in a list table.
pub const MAX_COLUMNS: usize = 6;

/// Column keys for `rows`: `id` first, then the first record's other scalar
/// fields in key order.
pub fn table_columns(rows: &[Value]) -> Vec<String> {
    let Some(Value::Object(first)) = rows.first() else {
        return Vec::new();
    };
    let mut columns = Vec::new();
    if first.contains_key("id") {
        columns.push("id".to_owned());
    }
    columns.extend(
        first
            .iter()
            .filter(|(key, value)| key.as_str() != "id" && !value.is_object() && !value.is_array())
            .map(|(key, _)| key.clone()),
    );
    columns.truncate(MAX_COLUMNS);
    columns
}

/// Human-readable column header: `clinic_name` -> `Clinic Name`.
pub fn column_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |c| c.to_uppercase().chain(chars).collect())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display text for one field value.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_owned(),
        Value::Bool(true) => "Yes".to_owned(),
        Value::Bool(false) => "No".to_owned(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("{} items", items.len()),
        Value::Object(map) => ["name", "clinic_name", "title", "id"]
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
            .map_or_else(|| "...".to_owned(), cell_text),
    }
}

/// Record id as a path segment.
pub fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Load<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

/// Tags async loads so only the most recent one may publish its result.
#[derive(Clone, Copy)]
struct RequestSeq(RwSignal<u64>);

impl RequestSeq {
    fn new() -> Self {
        Self(RwSignal::new(0))
    }

    fn begin(self) -> u64 {
        self.0.update_untracked(|n| *n += 1);
        self.0.get_untracked()
    }

    #[cfg_attr(not(feature = "csr"), allow(dead_code))]
    fn is_current(self, seq: u64) -> bool {
        self.0.try_get_untracked() == Some(seq)
    }
}

fn resource_param() -> Memo<Option<ResourceKind>> {
    let params = use_params_map();
    Memo::new(move |_| params.with(|p| p.get("resource")).and_then(|s| s.parse().ok()))
}

#[component]
pub fn ResourceListPage() -> impl IntoView {
    let ctx = expect_context::<SessionContext>();
    let clinics = expect_context::<RwSignal<ClinicScope>>();
    let kind = resource_param();
    let state = RwSignal::new(Load::<Vec<Value>>::Idle);
    let request_seq = RequestSeq::new();

    Effect::new(move || {
        let Some(kind) = kind.get() else {
            return;
        };
        let (stale, clinic_id) = clinics.with(|scope| (scope.stale, scope.selected_id()));
        if stale {
            return;
        }
        let seq = request_seq.begin();
        state.set(Load::Loading);

        #[cfg(feature = "csr")]
        {
            let resources = ctx.resources.clone();
            leptos::task::spawn_local(async move {
                let result = resources.list(kind, clinic_id).await;
                if !request_seq.is_current(seq) {
                    return;
                }
                let next = match result {
                    Ok(rows) => Load::Ready(rows),
                    Err(e) if e.is_unauthorized() => Load::Idle,
                    Err(e) => Load::Failed(e.to_string()),
                };
                let _ = state.try_set(next);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&ctx, kind, clinic_id, seq);
        }
    });

    let title = move || kind.get().map(ResourceKind::label).unwrap_or_default();
    let slug = move || kind.get().map(ResourceKind::slug).unwrap_or_default();

    view! {
        <section class="resource">
            <h1>{title}</h1>
            {move || match state.get() {
                Load::Idle => ().into_any(),
                Load::Loading => view! { <p class="resource__status">"Loading..."</p> }.into_any(),
                Load::Failed(message) => view! { <p class="resource__error">{message}</p> }.into_any(),
                Load::Ready(rows) if rows.is_empty() => {
                    view! { <p class="resource__status">"No records found."</p> }.into_any()
                }
                Load::Ready(rows) => {
                    let columns = table_columns(&rows);
                    let headers = columns.clone();
                    let base = slug();
                    view! {
                        <table class="resource__table">
                            <thead>
                                <tr>
                                    {headers.into_iter().map(|c| view! { <th>{column_label(&c)}</th> }).collect_view()}
                                </tr>
                            </thead>
                            <tbody>
                                {rows
                                    .into_iter()
                                    .map(|row| {
                                        let href = row_id(&row).map(|id| format!("/{base}/{id}"));
                                        let cells = columns
                                            .iter()
                                            .map(|c| cell_text(row.get(c).unwrap_or(&Value::Null)))
                                            .collect::<Vec<_>>();
                                        view! {
                                            <tr>
                                                {cells
                                                    .into_iter()
                                                    .enumerate()
                                                    .map(|(i, text)| match (&href, i) {
                                                        (Some(href), 0) => {
                                                            view! { <td><A href=href.clone()>{text}</A></td> }.into_any()
                                                        }
                                                        _ => view! { <td>{text}</td> }.into_any(),
                                                    })
                                                    .collect_view()}
                                            </tr>
                                        }
                                    })
                                    .collect_view()}
                            </tbody>
                        </table>
                    }
                        .into_any()
                }
            }}
        </section>
    }
}

#[component]
pub fn ResourceDetailPage() -> impl IntoView {
    let ctx = expect_context::<SessionContext>();
    let params = use_params_map();
    let kind = resource_param();
    let record_id = Memo::new(move |_| params.with(|p| p.get("id")));
    let state = RwSignal::new(Load::<Value>::Idle);
    let request_seq = RequestSeq::new();

    Effect::new(move || {
        let (Some(kind), Some(id)) = (kind.get(), record_id.get()) else {
            return;
        };
        let seq = request_seq.begin();
        state.set(Load::Loading);

        #[cfg(feature = "csr")]
        {
            let resources = ctx.resources.clone();
            leptos::task::spawn_local(async move {
                let result = resources.get(kind, &id).await;
                if !request_seq.is_current(seq) {
                    return;
                }
                let next = match result {
                    Ok(record) => Load::Ready(record),
                    Err(e) if e.is_unauthorized() => Load::Idle,
                    Err(e) => Load::Failed(e.to_string()),
                };
                let _ = state.try_set(next);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&ctx, kind, id, seq);
        }
    });

    let back = move || kind.get().map(|k| format!("/{}", k.slug())).unwrap_or_else(|| "/".to_owned());
    let back_label = move || kind.get().map(ResourceKind::label).unwrap_or_default();

    view! {
        <section class="resource resource--detail">
            <A href=back attr:class="resource__back">"Back to " {back_label}</A>
            {move || match state.get() {
                Load::Idle => ().into_any(),
                Load::Loading => view! { <p class="resource__status">"Loading..."</p> }.into_any(),
                Load::Failed(message) => view! { <p class="resource__error">{message}</p> }.into_any(),
                Load::Ready(Value::Object(fields)) => {
                    view! {
                        <dl class="resource__fields">
                            {fields
                                .into_iter()
                                .map(|(key, value)| {
                                    view! {
                                        <dt>{column_label(&key)}</dt>
                                        <dd>{cell_text(&value)}</dd>
                                    }
                                })
                                .collect_view()}
                        </dl>
                    }
                        .into_any()
                }
                Load::Ready(other) => view! { <pre>{other.to_string()}</pre> }.into_any(),
            }}
        </section>
    }
}
