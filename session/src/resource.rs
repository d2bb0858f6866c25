//! Generic CRUD access to the dashboard's REST resources.
//!
//! Every call goes through [`AuthorizedFetch`], so a 401 from any resource
//! screen ends the session the same way. Payloads stay as JSON values; screens
//! pick out the fields they render.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::fetch::{AuthorizedFetch, FetchError, RequestOptions};
use crate::transport::Method;

/// REST collections exposed by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Clinics,
    Doctors,
    Staff,
    Patients,
    MedicalCases,
    MedicalRecords,
    Complications,
    TreatmentSchedules,
}

impl ResourceKind {
    pub const ALL: [Self; 8] = [
        Self::Clinics,
        Self::Doctors,
        Self::Staff,
        Self::Patients,
        Self::MedicalCases,
        Self::MedicalRecords,
        Self::Complications,
        Self::TreatmentSchedules,
    ];

    /// URL slug shared by the API and the dashboard routes.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Clinics => "clinics",
            Self::Doctors => "doctors",
            Self::Staff => "staff",
            Self::Patients => "patients",
            Self::MedicalCases => "medical-cases",
            Self::MedicalRecords => "medical-records",
            Self::Complications => "complications",
            Self::TreatmentSchedules => "treatment-schedules",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Clinics => "Clinics",
            Self::Doctors => "Doctors",
            Self::Staff => "Staff",
            Self::Patients => "Patients",
            Self::MedicalCases => "Medical Cases",
            Self::MedicalRecords => "Medical Records",
            Self::Complications => "Complications",
            Self::TreatmentSchedules => "Treatment Schedules",
        }
    }

    /// Whether listings are filtered by the selected clinic.
    #[must_use]
    pub fn clinic_scoped(self) -> bool {
        !matches!(self, Self::Clinics)
    }

    #[must_use]
    pub fn collection_path(self) -> String {
        format!("/api/{}/", self.slug())
    }

    #[must_use]
    pub fn item_path(self, id: &str) -> String {
        format!("/api/{}/{id}/", self.slug())
    }

    /// Collection path, filtered by clinic when the kind is clinic-scoped.
    #[must_use]
    pub fn list_path(self, clinic_id: Option<i64>) -> String {
        match clinic_id {
            Some(id) if self.clinic_scoped() => format!("{}?clinic_id={id}", self.collection_path()),
            _ => self.collection_path(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_matches('/').replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| format!("unknown resource: {s}"))
    }
}

/// Unwrap a list body that may be paginated (`{"results": [...]}`).
#[must_use]
pub fn list_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// CRUD helper over [`AuthorizedFetch`].
#[derive(Clone)]
pub struct ResourceClient {
    fetch: AuthorizedFetch,
}

impl ResourceClient {
    #[must_use]
    pub fn new(fetch: AuthorizedFetch) -> Self {
        Self { fetch }
    }

    /// List records, scoped to `clinic_id` for clinic-bound kinds.
    ///
    /// # Errors
    ///
    /// Propagates [`FetchError`]s from the fetch layer.
    pub async fn list(&self, kind: ResourceKind, clinic_id: Option<i64>) -> Result<Vec<Value>, FetchError> {
        let body: Value = self.fetch.get_json(&kind.list_path(clinic_id)).await?;
        Ok(list_items(body))
    }

    /// # Errors
    ///
    /// Propagates [`FetchError`]s from the fetch layer.
    pub async fn get(&self, kind: ResourceKind, id: &str) -> Result<Value, FetchError> {
        self.fetch.get_json(&kind.item_path(id)).await
    }

    /// # Errors
    ///
    /// Propagates [`FetchError`]s from the fetch layer.
    pub async fn create(&self, kind: ResourceKind, body: &Value) -> Result<Value, FetchError> {
        self.fetch.send_json(Method::Post, &kind.collection_path(), body).await
    }

    /// Partial update via `PATCH`.
    ///
    /// # Errors
    ///
    /// Propagates [`FetchError`]s from the fetch layer.
    pub async fn update(&self, kind: ResourceKind, id: &str, body: &Value) -> Result<Value, FetchError> {
        self.fetch.send_json(Method::Patch, &kind.item_path(id), body).await
    }

    /// # Errors
    ///
    /// Propagates [`FetchError`]s from the fetch layer.
    pub async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), FetchError> {
        let _: Value = self.fetch.json(&kind.item_path(id), RequestOptions::delete()).await?;
        Ok(())
    }
}
