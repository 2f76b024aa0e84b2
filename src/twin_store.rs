//! Digital-twin store client.
//!
//! The store is an external collaborator reached over its REST API. The
//! [`TwinStore`] trait is the seam that keeps the handlers testable with an
//! injected in-memory fake.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ------------------------------------------------------------------ //
//  Types                                                              //
// ------------------------------------------------------------------ //

/// A persisted digital-twin record.
///
/// Keyed by the device's registration id; the model id is the type tag that
/// decides whether an existing twin is reusable or must be superseded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitalTwin {
    #[serde(rename = "dtId")]
    pub id: String,
    #[serde(rename = "modelId")]
    pub model_id: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
    /// Opaque content fields carried by the twin.
    #[serde(default)]
    pub contents: HashMap<String, Value>,
}

#[derive(Debug, Error)]
pub enum TwinStoreError {
    /// No twin exists at the requested id. Expected; the resolver recovers
    /// by creating one.
    #[error("twin '{0}' not found")]
    NotFound(String),

    /// The store rejected the request.
    #[error("twin store returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure talking to the store.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Request/response client interface consumed by the resolver.
#[async_trait]
pub trait TwinStore: Send + Sync {
    /// Fetch the twin identified by `id`.
    async fn get(&self, id: &str) -> Result<DigitalTwin, TwinStoreError>;

    /// Create a twin at `id`, or overwrite whatever is already there.
    /// No optimistic-concurrency precondition is applied.
    async fn create_or_replace(
        &self,
        id: &str,
        model_id: &str,
        contents: HashMap<String, Value>,
    ) -> Result<DigitalTwin, TwinStoreError>;
}

// ------------------------------------------------------------------ //
//  HTTP implementation                                                //
// ------------------------------------------------------------------ //

/// [`TwinStore`] backed by the store's REST API.
///
/// Holds one shared [`reqwest::Client`]; stateless apart from its connection
/// pool, so it is safe to reuse across concurrent invocations.
pub struct HttpTwinStore {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpTwinStore {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    fn twin_url(&self, id: &str) -> String {
        format!("{}/digitaltwins/{}", self.base_url, id)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl TwinStore for HttpTwinStore {
    async fn get(&self, id: &str) -> Result<DigitalTwin, TwinStoreError> {
        let resp = self.authorize(self.http.get(self.twin_url(id))).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(TwinStoreError::NotFound(id.to_string())),
            s if s.is_success() => Ok(resp.json().await?),
            s => Err(TwinStoreError::Status {
                status: s.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn create_or_replace(
        &self,
        id: &str,
        model_id: &str,
        contents: HashMap<String, Value>,
    ) -> Result<DigitalTwin, TwinStoreError> {
        let twin = DigitalTwin {
            id: id.to_string(),
            model_id: model_id.to_string(),
            tags: HashMap::new(),
            properties: HashMap::new(),
            contents,
        };

        let resp = self
            .authorize(self.http.put(self.twin_url(id)).json(&twin))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            // Stores that echo the stored twin back win; otherwise the body
            // we sent is authoritative.
            Ok(resp.json().await.unwrap_or(twin))
        } else {
            Err(TwinStoreError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            })
        }
    }
}

// ------------------------------------------------------------------ //
//  Test doubles                                                       //
// ------------------------------------------------------------------ //

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory twin store for tests, with call counters.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeTwinStore {
        twins: Mutex<HashMap<String, DigitalTwin>>,
        gets: AtomicUsize,
        writes: AtomicUsize,
    }

    impl FakeTwinStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_twin(id: &str, model_id: &str) -> Self {
            let store = Self::default();
            store.insert(id, model_id);
            store
        }

        pub fn insert(&self, id: &str, model_id: &str) {
            let twin = DigitalTwin {
                id: id.to_string(),
                model_id: model_id.to_string(),
                tags: HashMap::new(),
                properties: HashMap::new(),
                contents: HashMap::new(),
            };
            self.twins.lock().unwrap().insert(id.to_string(), twin);
        }

        pub fn get_count(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub fn stored_model(&self, id: &str) -> Option<String> {
            self.twins.lock().unwrap().get(id).map(|t| t.model_id.clone())
        }

        pub fn stored_contents(&self, id: &str) -> Option<HashMap<String, Value>> {
            self.twins.lock().unwrap().get(id).map(|t| t.contents.clone())
        }
    }

    #[async_trait]
    impl TwinStore for FakeTwinStore {
        async fn get(&self, id: &str) -> Result<DigitalTwin, TwinStoreError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.twins
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| TwinStoreError::NotFound(id.to_string()))
        }

        async fn create_or_replace(
            &self,
            id: &str,
            model_id: &str,
            contents: HashMap<String, Value>,
        ) -> Result<DigitalTwin, TwinStoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let twin = DigitalTwin {
                id: id.to_string(),
                model_id: model_id.to_string(),
                tags: HashMap::new(),
                properties: HashMap::new(),
                contents,
            };
            self.twins.lock().unwrap().insert(id.to_string(), twin.clone());
            Ok(twin)
        }
    }

    /// Store whose every call fails, for exercising the 500 path.
    pub struct BrokenTwinStore;

    #[async_trait]
    impl TwinStore for BrokenTwinStore {
        async fn get(&self, _id: &str) -> Result<DigitalTwin, TwinStoreError> {
            Err(TwinStoreError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            })
        }

        async fn create_or_replace(
            &self,
            _id: &str,
            _model_id: &str,
            _contents: HashMap<String, Value>,
        ) -> Result<DigitalTwin, TwinStoreError> {
            Err(TwinStoreError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            })
        }
    }
}
