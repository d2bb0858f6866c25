//! Wiring for the session core.
//!
//! ARCHITECTURE
//! ============
//! One `SessionContext` is created at application start and dropped at
//! teardown. It owns the session store, the authorized fetch bound to it, the
//! clinic scope resolver subscribed to its events, and a resource client.
//! UI layers hold clones of these handles instead of ambient globals.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::sync::Arc;

use crate::clinic::{ClinicScope, ClinicScopeResolver};
use crate::config::ApiConfig;
use crate::fetch::AuthorizedFetch;
use crate::notify::Notifier;
use crate::resource::ResourceClient;
use crate::session::SessionStore;
use crate::storage::KeyValueStore;
use crate::transport::HttpTransport;

#[derive(Clone)]
pub struct SessionContext {
    pub session: SessionStore,
    pub fetch: AuthorizedFetch,
    pub clinics: ClinicScopeResolver,
    pub resources: ResourceClient,
}

impl SessionContext {
    #[must_use]
    pub fn new(
        api: ApiConfig,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = SessionStore::new(api, transport, storage);
        let fetch = AuthorizedFetch::new(session.clone(), notifier);
        let clinics = ClinicScopeResolver::new(fetch.clone());
        let resources = ResourceClient::new(fetch.clone());

        session.subscribe(clinics.observer());

        Self { session, fetch, clinics, resources }
    }

    /// Restore the session and, when signed in, resolve the clinic scope.
    pub async fn start(&self) -> ClinicScope {
        self.session.initialize();
        self.refresh_scope().await
    }

    /// Re-resolve the clinic scope for the current user, if any.
    pub async fn refresh_scope(&self) -> ClinicScope {
        match self.session.user() {
            Some(user) => self.clinics.resolve(user.role).await,
            None => self.clinics.scope(),
        }
    }
}
