//! Cross-origin proxy for the featured-content feed.
//!
//! `GET /api/feed?date=&language=` forwards to the content API and returns
//! the upstream body unchanged. It adds CORS headers for allow-listed
//! origins and does nothing else: no pagination, no state.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ALLOW, ORIGIN, VARY,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::Result;
use crate::domain::selection::parse_date;
use crate::service::ContentService;

const UPSTREAM_ERROR: &str = "Failed to fetch Wikipedia data";

#[derive(Clone)]
pub struct ProxyState {
    service: Arc<ContentService>,
    allowed_origins: Arc<Vec<String>>,
}

impl ProxyState {
    pub fn new(service: Arc<ContentService>, allowed_origins: Vec<String>) -> Self {
        Self {
            service,
            allowed_origins: Arc::new(allowed_origins),
        }
    }

    fn allows(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    date: Option<String>,
    language: Option<String>,
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/feed", get(feed).fallback(method_not_allowed))
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: ProxyState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "proxy listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn feed(State(state): State<ProxyState>, Query(query): Query<FeedQuery>) -> Response {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(date), Some(language)) = (present(query.date), present(query.language)) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Missing date or language parameters" })),
        )
            .into_response();
    };

    let Some(date) = parse_date(&date) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid date parameter" })),
        )
            .into_response();
    };

    match state.service.fetch_featured_content(&language, date).await {
        Ok((data, 200)) => (StatusCode::OK, Json(data)).into_response(),
        Ok((data, status)) => {
            tracing::warn!(status, %language, %date, "upstream feed request failed");
            upstream_failure(format!(
                "Wikipedia API returned an error: {}",
                upstream_reason(&data, status)
            ))
        }
        Err(e) => {
            tracing::warn!(error = %e, %language, "feed request rejected");
            upstream_failure(e.to_string())
        }
    }
}

fn upstream_failure(details: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": UPSTREAM_ERROR, "details": details })),
    )
        .into_response()
}

fn upstream_reason(data: &Value, status: u16) -> String {
    data.pointer("/details/message")
        .or_else(|| data.pointer("/details/error"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("unknown status")
                .to_string()
        })
}

async fn method_not_allowed() -> Response {
    let mut response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Method Not Allowed" })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET"));
    response
}

async fn cors(State(state): State<ProxyState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|origin| state.allows(origin))
        .and_then(|origin| HeaderValue::from_str(origin).ok());

    let preflight = request.method() == Method::OPTIONS;
    let mut response = match (&origin, preflight) {
        (Some(_), true) => StatusCode::NO_CONTENT.into_response(),
        _ => next.run(request).await,
    };

    if let Some(origin) = origin {
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, HEAD"));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("content-type"));
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }

    response
}
