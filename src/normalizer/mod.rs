use serde_json::{json, Value};

use crate::transport::Outcome;

/// The two-element result every service call yields: body and status code.
pub type Reply = (Value, u16);

/// Classifies transport outcomes into success and failure.
///
/// Statuses in `200..400` pass through untouched. Everything else is wrapped
/// as `{ "error": "request failed", "details": <payload> }` with the status
/// preserved.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, outcome: Outcome) -> Reply {
        let Outcome { status, payload } = outcome;

        if is_success(status) {
            return (payload, status);
        }

        tracing::debug!(status, "normalizing failed outcome");
        (json!({ "error": "request failed", "details": payload }), status)
    }
}

pub fn is_success(status: u16) -> bool {
    (200..400).contains(&status)
}
