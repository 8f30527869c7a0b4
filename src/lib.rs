//! # Wikidash
//!
//! Featured encyclopedia content for one language and one day, with a
//! paginated most-read list, transient notifications and persisted
//! read status.
//!
//! ## Architecture
//!
//! ```text
//! Transport → Normalizer → Service → Controller → CLI / Proxy
//! ```
//!
//! - [`transport`]: HTTP GET/POST that never fails, only reports a status
//! - [`normalizer`]: Maps raw outcomes to `(data, status)` replies
//! - [`service`]: Content API and translation endpoints
//! - [`controller`]: Retrieval and pagination state machine
//!
//! ## Quick Start
//!
//! ```bash
//! # Today's featured content in English
//! wikidash fetch
//!
//! # A given day in French, second page of ten
//! wikidash fetch -l fr -d 2024-09-01 --page 2 --page-size 10
//!
//! # Interactive session
//! wikidash browse
//!
//! # Cross-origin proxy on the configured address
//! wikidash serve
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together transport,
/// service, notification channel and store.
pub mod app;

/// Command-line interface using clap.
///
/// - `fetch` - Fetch once and print a page
/// - `languages [--remote]` - List languages
/// - `translate <text> -t <lang>` - Translate text
/// - `browse` - Interactive session on stdin
/// - `serve` - Run the feed proxy
pub mod cli;

/// Configuration loaded from `~/.config/wikidash/config.toml`.
pub mod config;

/// Retrieval-and-pagination controller.
///
/// - [`DashboardController`](controller::DashboardController): Idle/Loading
///   state machine with page-size growth
/// - [`SearchRequest`](controller::SearchRequest): The in-flight half of a search
pub mod controller;

/// Core domain models.
///
/// - [`RawContentPayload`](domain::RawContentPayload): Featured content as returned upstream
/// - [`Article`](domain::Article): Most-read entries and the featured article
/// - [`PaginationState`](domain::PaginationState): Page index and size
/// - [`Selection`](domain::Selection): Language and date
pub mod domain;

/// Response normalization into `(data, status)` replies.
pub mod normalizer;

/// Transient success/error notifications with a display window.
pub mod notification;

/// `GET /api/feed` proxy built with axum.
pub mod proxy;

/// Idempotent read-status tracking on top of a key-value store.
pub mod read_status;

/// Content service over a [`Transport`](transport::Transport).
pub mod service;

/// Key-value persistence.
///
/// - [`KeyValueStore`](store::KeyValueStore): Storage trait
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`MemoryStore`](store::MemoryStore): In-process implementation
pub mod store;

/// HTTP transport.
///
/// - [`Transport`](transport::Transport): Async trait for GET/POST
/// - [`HttpTransport`](transport::http_transport::HttpTransport): reqwest-based implementation
pub mod transport;
