pub mod http_transport;

use async_trait::async_trait;
use serde_json::{json, Value};

/// Status used for requests that never produced a response.
pub const NETWORK_FAILURE_STATUS: u16 = 500;

/// Uniform result of a single HTTP exchange.
///
/// Error responses (4xx/5xx) are carried here with their real status and
/// body, the same as successful ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: u16,
    pub payload: Value,
}

impl Outcome {
    pub fn new(status: u16, payload: Value) -> Self {
        Self { status, payload }
    }

    /// Synthetic outcome for timeouts, DNS errors, refused connections and
    /// bodies that could not be read.
    pub fn network_failure() -> Self {
        Self {
            status: NETWORK_FAILURE_STATUS,
            payload: json!({ "error": "network failure" }),
        }
    }
}

#[async_trait]
pub trait Transport {
    async fn get(&self, url: &str) -> Outcome;
    async fn post(&self, url: &str, body: &Value) -> Outcome;
}
