//! Process-wide configuration, resolved once at startup.

/// Runtime configuration for the allocation webhook.
///
/// Built in `main` and threaded into the state constructors so handlers stay
/// testable with injected fakes; nothing reads the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Base URL of the digital-twin store REST API.
    pub twin_store_url: String,
    /// Optional bearer token for the twin store.
    pub twin_store_token: Option<String>,
}

impl Config {
    /// Read configuration from the environment, applying defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("ALLOCATOR_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            twin_store_url: std::env::var("TWIN_STORE_URL")
                .unwrap_or_else(|_| "http://localhost:8800".to_string()),
            twin_store_token: std::env::var("TWIN_STORE_TOKEN").ok(),
        }
    }
}
