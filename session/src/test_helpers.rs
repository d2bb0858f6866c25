//! Fakes for the transport, storage and notifier seams.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::config::ApiConfig;
use crate::fetch::AuthorizedFetch;
use crate::notify::{Notice, Notifier};
use crate::session::SessionStore;
use crate::storage::MemoryStore;
use crate::token::Role;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

pub const TEST_BASE_URL: &str = "http://api.test";

/// Build an unsigned token around an arbitrary JSON payload.
pub fn token_with_payload(payload: &serde_json::Value) -> String {
    format!("header.{}.signature", URL_SAFE_NO_PAD.encode(payload.to_string()))
}

/// Build a valid token for `role`.
pub fn make_token(user_id: &str, role: Role) -> String {
    token_with_payload(&serde_json::json!({
        "user_id": user_id,
        "name": format!("User {user_id}"),
        "email": format!("user{user_id}@jamii.test"),
        "role": role.as_str(),
    }))
}

pub fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

type SendHook = Box<dyn Fn(&HttpRequest) + Send + Sync>;

/// Transport that replays scripted responses in order and records requests.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    hook: Mutex<Option<SendHook>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push(json_response(status, &body));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Run `hook` inside `send`, before the response is returned. Simulates
    /// state changes that land while a request is in flight.
    pub fn on_send(&self, hook: impl Fn(&HttpRequest) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().last().cloned().expect("no request was sent")
    }
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(&request);
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_owned())))
    }
}

/// Notifier that keeps every notice for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count_titled(&self, title: &str) -> usize {
        self.notices().iter().filter(|n| n.title == title).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Wired-up store + fetch over fakes.
pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub storage: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub session: SessionStore,
    pub fetch: AuthorizedFetch,
}

pub fn harness_with_storage(storage: MemoryStore) -> Harness {
    let transport = MockTransport::new();
    let storage = Arc::new(storage);
    let notifier = RecordingNotifier::new();
    let session = SessionStore::new(ApiConfig::new(TEST_BASE_URL), transport.clone(), storage.clone());
    let fetch = AuthorizedFetch::new(session.clone(), notifier.clone());
    Harness { transport, storage, notifier, session, fetch }
}

pub fn harness() -> Harness {
    harness_with_storage(MemoryStore::new())
}

/// Harness whose session is already initialized from a stored token for `role`.
pub fn signed_in_harness(role: Role) -> Harness {
    let token = make_token("1", role);
    let h = harness_with_storage(MemoryStore::with_entries(&[(crate::storage::TOKEN_KEY, &token)]));
    h.session.initialize();
    h
}
