use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::app::Result;
use crate::config::HttpConfig;
use crate::transport::{Outcome, Transport};

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Self::with_timeout(config.timeout(), &config.user_agent)
    }

    pub fn with_timeout(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    async fn complete(&self, request: RequestBuilder, url: &str) -> Outcome {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "request produced no response");
                return Outcome::network_failure();
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => {
                tracing::debug!(url, status, bytes = body.len(), "response received");
                Outcome::new(status, decode_body(&body))
            }
            Err(e) => {
                tracing::warn!(url, status, error = %e, "failed to read response body");
                Outcome::network_failure()
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Outcome {
        self.complete(self.client.get(url), url).await
    }

    async fn post(&self, url: &str, body: &Value) -> Outcome {
        self.complete(self.client.post(url).json(body), url).await
    }
}

/// JSON bodies decode to their value, anything else is kept as text.
fn decode_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/ok", get(|| async { Json(json!({ "hello": "world" })) }))
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "message": "not here" }))) }),
            )
            .route(
                "/plain",
                get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .route(
                "/echo",
                post(|headers: HeaderMap, body: String| async move {
                    let content_type = headers
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
                    (
                        StatusCode::CREATED,
                        Json(json!({ "content_type": content_type, "body": body })),
                    )
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn transport() -> HttpTransport {
        HttpTransport::with_timeout(Duration::from_millis(300), "wikidash-test").unwrap()
    }

    #[tokio::test]
    async fn test_get_success_passes_body_through() {
        let base = spawn_server().await;
        let outcome = transport().get(&format!("{}/ok", base)).await;

        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.payload, json!({ "hello": "world" }));
    }

    #[tokio::test]
    async fn test_error_status_is_captured_not_raised() {
        let base = spawn_server().await;
        let outcome = transport().get(&format!("{}/missing", base)).await;

        assert_eq!(outcome.status, 404);
        assert_eq!(outcome.payload["message"], "not here");
    }

    #[tokio::test]
    async fn test_non_json_body_kept_as_text() {
        let base = spawn_server().await;
        let outcome = transport().get(&format!("{}/plain", base)).await;

        assert_eq!(outcome.status, 502);
        assert_eq!(outcome.payload, Value::String("upstream down".into()));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let base = spawn_server().await;
        let body = json!({ "q": "hola", "source": "auto", "target": "en" });
        let outcome = transport().post(&format!("{}/echo", base), &body).await;

        assert_eq!(outcome.status, 201);
        assert_eq!(outcome.payload["content_type"], "application/json");
        assert_eq!(outcome.payload["body"], body);
    }

    #[tokio::test]
    async fn test_refused_connection_maps_to_network_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = transport().get(&format!("http://{}/ok", addr)).await;
        assert_eq!(outcome, Outcome::network_failure());
    }

    #[tokio::test]
    async fn test_timeout_maps_to_network_failure() {
        let base = spawn_server().await;
        let outcome = transport().get(&format!("{}/slow", base)).await;

        assert_eq!(outcome.status, 500);
        assert_eq!(outcome.payload["error"], "network failure");
    }

    #[test]
    fn test_decode_empty_body_is_null() {
        assert_eq!(decode_body(b""), Value::Null);
    }
}
