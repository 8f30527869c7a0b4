//! Retrieval and pagination controller.
//!
//! A search moves the controller from `Idle` to `Loading`; its resolution
//! always brings it back to `Idle`, whatever the outcome. Only one search can
//! be in flight: [`DashboardController::begin_search`] returns `None` while
//! loading. The request captures the selection at call time, so changing the
//! language or date mid-flight does not affect what gets committed.
//!
//! ```text
//! begin_search ──► SearchRequest::execute().await ──► finish_search
//!   (Idle→Loading)        (no controller borrow)       (Loading→Idle)
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use crate::app::{Result, WikidashError};
use crate::config::DashboardConfig;
use crate::domain::{
    Article, ImageArticle, PaginatedView, PaginationState, RawContentPayload, Selection,
};
use crate::normalizer::Reply;
use crate::notification::{Dispatch, NotificationEvent};
use crate::read_status::ReadStatusTracker;
use crate::service::ContentService;

pub const DEFAULT_PAGE_SIZE_STEP: usize = 5;
pub const SUCCESS_MESSAGE: &str = "Data found with success!";
pub const FAILURE_MESSAGE: &str = "Failed to fetch featured content.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
}

/// How the last search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Status 200 and a usable body; payload replaced.
    Success,
    /// Any other status; payload kept.
    Failure,
    /// Local error before or after the request; payload kept.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub initial_page_size: usize,
    pub page_size_step: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            initial_page_size: DEFAULT_PAGE_SIZE_STEP,
            page_size_step: DEFAULT_PAGE_SIZE_STEP,
        }
    }
}

impl From<&DashboardConfig> for ControllerSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            initial_page_size: config.initial_page_size,
            page_size_step: config.page_size_step,
        }
    }
}

/// A featured-content fetch bound to the selection it was started with.
pub struct SearchRequest {
    service: Arc<ContentService>,
    selection: Selection,
}

impl SearchRequest {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub async fn execute(self) -> SearchResolution {
        let result = self
            .service
            .fetch_featured_content(&self.selection.language, self.selection.date)
            .await;

        SearchResolution {
            selection: self.selection,
            result,
        }
    }
}

pub struct SearchResolution {
    selection: Selection,
    result: Result<Reply>,
}

impl SearchResolution {
    /// Resolution for a search that never completed, e.g. a panicked task.
    pub fn failed(selection: Selection, error: WikidashError) -> Self {
        Self {
            selection,
            result: Err(error),
        }
    }
}

pub struct DashboardController {
    service: Arc<ContentService>,
    dispatch: Dispatch,
    read_status: ReadStatusTracker,
    selection: Selection,
    phase: Phase,
    last_status: Option<SearchStatus>,
    payload: Option<RawContentPayload>,
    payload_selection: Option<Selection>,
    pagination: PaginationState,
    page_size_step: usize,
    view: PaginatedView,
}

impl DashboardController {
    pub fn new(
        service: Arc<ContentService>,
        dispatch: Dispatch,
        read_status: ReadStatusTracker,
        selection: Selection,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            service,
            dispatch,
            read_status,
            selection,
            phase: Phase::Idle,
            last_status: None,
            payload: None,
            payload_selection: None,
            pagination: PaginationState::new(settings.initial_page_size),
            page_size_step: settings.page_size_step,
            view: PaginatedView::default(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Takes effect on the next search.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.selection.language = language.into();
        tracing::debug!(language = %self.selection.language, "language selected");
    }

    /// Takes effect on the next search.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.selection.date = date;
        tracing::debug!(%date, "date selected");
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn last_status(&self) -> Option<SearchStatus> {
        self.last_status
    }

    /// Enters `Loading` and returns the request to run, or `None` if a search
    /// is already in flight.
    pub fn begin_search(&mut self) -> Option<SearchRequest> {
        if self.is_loading() {
            tracing::debug!("search ignored: already loading");
            return None;
        }

        self.phase = Phase::Loading;
        tracing::debug!(
            language = %self.selection.language,
            date = %self.selection.date,
            "search started"
        );

        Some(SearchRequest {
            service: self.service.clone(),
            selection: self.selection.clone(),
        })
    }

    /// Commits a resolution and returns to `Idle`. Every path dispatches
    /// exactly one notification. Returns `None` if no search was in flight.
    pub fn finish_search(&mut self, resolution: SearchResolution) -> Option<SearchStatus> {
        if !self.is_loading() {
            tracing::warn!("search resolution ignored: no search in flight");
            return None;
        }

        let SearchResolution { selection, result } = resolution;
        self.phase = Phase::Idle;

        let status = match result {
            Ok((data, 200)) => match RawContentPayload::from_value(data) {
                Ok(payload) => {
                    tracing::info!(
                        language = %selection.language,
                        date = %selection.date,
                        most_read = payload.most_read().len(),
                        "featured content loaded"
                    );
                    self.payload = Some(payload);
                    self.payload_selection = Some(selection);
                    (self.dispatch)(NotificationEvent::success(SUCCESS_MESSAGE));
                    SearchStatus::Success
                }
                Err(e) => {
                    tracing::warn!(error = %e, "featured content body was not usable");
                    (self.dispatch)(NotificationEvent::error(FAILURE_MESSAGE));
                    SearchStatus::Error
                }
            },
            Ok((data, status)) => {
                let message = failure_message(&data);
                tracing::warn!(status, %message, "featured content request failed");
                (self.dispatch)(NotificationEvent::error(message));
                SearchStatus::Failure
            }
            Err(e) => {
                tracing::error!(error = %e, "error getting featured content");
                (self.dispatch)(NotificationEvent::error(FAILURE_MESSAGE));
                SearchStatus::Error
            }
        };

        self.last_status = Some(status);
        self.refresh_view();
        Some(status)
    }

    /// Runs a whole search in place. `None` if one was already in flight.
    pub async fn trigger_search(&mut self) -> Option<SearchStatus> {
        let request = self.begin_search()?;
        let resolution = request.execute().await;
        self.finish_search(resolution)
    }

    /// Near-bottom signal: grows the page size by one step unless loading.
    /// Returns whether the page size changed.
    pub fn request_more(&mut self) -> bool {
        if self.is_loading() {
            tracing::debug!("show-more ignored: loading");
            return false;
        }
        if self.page_size_step == 0 {
            return false;
        }

        self.pagination.grow(self.page_size_step);
        tracing::debug!(page_size = self.pagination.page_size(), "page size grown");
        self.refresh_view();
        true
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.pagination.set_page_index(page_index);
        self.refresh_view();
    }

    /// Explicit page-size choice; returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.pagination.select_page_size(page_size);
        self.refresh_view();
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn view(&self) -> &PaginatedView {
        &self.view
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.view.count)
    }

    pub fn payload(&self) -> Option<&RawContentPayload> {
        self.payload.as_ref()
    }

    /// Selection the current payload was fetched with.
    pub fn payload_selection(&self) -> Option<&Selection> {
        self.payload_selection.as_ref()
    }

    pub fn featured_article(&self) -> Option<&Article> {
        self.payload.as_ref().and_then(|p| p.tfa.as_ref())
    }

    pub fn featured_image(&self) -> Option<&ImageArticle> {
        self.payload.as_ref().and_then(|p| p.image.as_ref())
    }

    pub fn is_read(&self, tid: &str) -> bool {
        self.read_status.is_read(tid)
    }

    /// First interaction with an article marks it read.
    pub fn open_article(&mut self, tid: &str) -> bool {
        self.read_status.mark_read(tid)
    }

    fn refresh_view(&mut self) {
        self.view = PaginatedView::derive(self.payload.as_ref(), &self.pagination);
    }
}

/// Message for a failed reply: the upstream message when there is one.
fn failure_message(data: &Value) -> String {
    [
        "/message",
        "/details/message",
        "/details/detail",
        "/details/title",
        "/details/httpReason",
        "/details/error",
        "/error",
    ]
    .iter()
    .filter_map(|pointer| data.pointer(pointer).and_then(Value::as_str))
    .find(|message| !message.trim().is_empty())
    .unwrap_or(FAILURE_MESSAGE)
    .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::config::ApiConfig;
    use crate::notification::NotificationKind;
    use crate::store::MemoryStore;
    use crate::transport::testing::{Call, ScriptedTransport};
    use crate::transport::Outcome;

    struct Harness {
        controller: DashboardController,
        transport: Arc<ScriptedTransport>,
        events: Arc<Mutex<Vec<NotificationEvent>>>,
    }

    impl Harness {
        fn new(outcomes: Vec<Outcome>) -> Self {
            Self::with_settings(outcomes, ControllerSettings::default())
        }

        fn with_settings(outcomes: Vec<Outcome>, settings: ControllerSettings) -> Self {
            let transport = Arc::new(ScriptedTransport::new(outcomes));
            let api = ApiConfig {
                content_base_url: "https://content.test".to_string(),
                ..ApiConfig::default()
            };
            let service = Arc::new(ContentService::new(transport.clone(), &api).unwrap());

            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = events.clone();
            let dispatch: Dispatch =
                Arc::new(move |event: NotificationEvent| sink.lock().unwrap().push(event));

            let read_status = ReadStatusTracker::load(Arc::new(MemoryStore::new()));
            let controller = DashboardController::new(
                service,
                dispatch,
                read_status,
                Selection::new("en", date()),
                settings,
            );

            Self {
                controller,
                transport,
                events,
            }
        }

        fn events(&self) -> Vec<NotificationEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    fn feed(n: usize) -> Outcome {
        let articles: Vec<_> = (0..n)
            .map(|i| json!({ "tid": format!("t{}", i), "titles": { "normalized": format!("Article {}", i) } }))
            .collect();
        Outcome::new(
            200,
            json!({
                "tfa": { "tid": "tfa", "titles": { "normalized": "Featured" } },
                "image": { "title": "File:Daily.jpg" },
                "mostread": { "articles": articles }
            }),
        )
    }

    fn tids(view: &PaginatedView) -> Vec<&str> {
        view.articles
            .iter()
            .filter_map(|a| a.tid.as_deref())
            .collect()
    }

    #[tokio::test]
    async fn test_success_replaces_payload_and_notifies_once() {
        let mut h = Harness::new(vec![feed(10)]);

        let status = h.controller.trigger_search().await;

        assert_eq!(status, Some(SearchStatus::Success));
        assert_eq!(h.controller.phase(), Phase::Idle);
        assert_eq!(h.events(), vec![NotificationEvent::success(SUCCESS_MESSAGE)]);
        assert_eq!(h.controller.view().count, 10);
        assert_eq!(tids(h.controller.view()), vec!["t0", "t1", "t2", "t3", "t4"]);
        assert_eq!(h.controller.featured_article().unwrap().display_title(), "Featured");
        assert_eq!(h.controller.featured_image().unwrap().display_title(), "File:Daily.jpg");
        assert_eq!(
            h.transport.calls(),
            vec![Call::Get(
                "https://content.test/feed/v1/wikipedia/en/featured/2024/09/01".into()
            )]
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_payload() {
        let mut h = Harness::new(vec![
            feed(3),
            Outcome::new(500, json!({ "message": "Upstream exploded" })),
        ]);
        h.controller.trigger_search().await;
        let before = h.controller.payload().cloned();

        let status = h.controller.trigger_search().await;

        assert_eq!(status, Some(SearchStatus::Failure));
        assert_eq!(h.controller.payload().cloned(), before);
        assert_eq!(h.controller.view().count, 3);
        assert_eq!(
            h.events().last(),
            Some(&NotificationEvent::error("Upstream exploded"))
        );
        assert_eq!(h.events().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_before_any_payload() {
        let mut h = Harness::new(vec![Outcome::new(404, json!({ "detail": "Not found" }))]);

        let status = h.controller.trigger_search().await;

        assert_eq!(status, Some(SearchStatus::Failure));
        assert!(h.controller.payload().is_none());
        assert_eq!(h.controller.view(), &PaginatedView::default());
        assert_eq!(h.events(), vec![NotificationEvent::error("Not found")]);
    }

    #[tokio::test]
    async fn test_network_failure_message() {
        // queue empty: transport reports a network failure
        let mut h = Harness::new(vec![]);

        h.controller.trigger_search().await;

        let events = h.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, NotificationKind::Error);
        assert_eq!(events[0].message, "network failure");
    }

    #[tokio::test]
    async fn test_non_200_success_status_is_not_committed() {
        let mut h = Harness::new(vec![Outcome::new(204, serde_json::Value::Null)]);

        let status = h.controller.trigger_search().await;

        assert_eq!(status, Some(SearchStatus::Failure));
        assert!(h.controller.payload().is_none());
        assert_eq!(h.events(), vec![NotificationEvent::error(FAILURE_MESSAGE)]);
    }

    #[tokio::test]
    async fn test_unusable_body_is_generic_error() {
        let mut h = Harness::new(vec![Outcome::new(200, json!("<html>oops</html>"))]);

        let status = h.controller.trigger_search().await;

        assert_eq!(status, Some(SearchStatus::Error));
        assert!(h.controller.payload().is_none());
        assert_eq!(h.events(), vec![NotificationEvent::error(FAILURE_MESSAGE)]);
        assert!(!h.controller.is_loading());
    }

    #[tokio::test]
    async fn test_array_body_keeps_stale_payload() {
        let mut h = Harness::new(vec![feed(3), Outcome::new(200, json!([]))]);
        h.controller.trigger_search().await;

        let status = h.controller.trigger_search().await;

        assert_eq!(status, Some(SearchStatus::Error));
        assert_eq!(h.controller.view().count, 3);
        assert_eq!(h.controller.featured_article().unwrap().display_title(), "Featured");
        assert_eq!(
            h.events(),
            vec![
                NotificationEvent::success(SUCCESS_MESSAGE),
                NotificationEvent::error(FAILURE_MESSAGE),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_language_is_generic_error_and_recoverable() {
        let mut h = Harness::new(vec![feed(2)]);
        h.controller.set_language("EN!");

        assert_eq!(h.controller.trigger_search().await, Some(SearchStatus::Error));
        assert_eq!(h.events(), vec![NotificationEvent::error(FAILURE_MESSAGE)]);
        assert!(h.transport.calls().is_empty());

        h.controller.set_language("en");
        assert_eq!(h.controller.trigger_search().await, Some(SearchStatus::Success));
    }

    #[tokio::test]
    async fn test_second_search_while_loading_is_ignored() {
        let mut h = Harness::new(vec![feed(1), feed(2)]);

        let request = h.controller.begin_search().unwrap();
        assert!(h.controller.is_loading());
        assert!(h.controller.begin_search().is_none());
        assert_eq!(h.controller.trigger_search().await, None);

        let resolution = request.execute().await;
        h.controller.finish_search(resolution);

        assert_eq!(h.transport.calls().len(), 1);
        assert_eq!(h.events().len(), 1);
        assert_eq!(h.controller.view().count, 1);
    }

    #[tokio::test]
    async fn test_selection_is_captured_at_call_time() {
        let mut h = Harness::new(vec![feed(1)]);

        let request = h.controller.begin_search().unwrap();
        h.controller.set_language("fr");
        h.controller.set_date(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        let resolution = request.execute().await;
        h.controller.finish_search(resolution);

        assert_eq!(h.controller.selection().language, "fr");
        assert_eq!(h.controller.payload_selection(), Some(&Selection::new("en", date())));
        assert_eq!(
            h.transport.calls(),
            vec![Call::Get(
                "https://content.test/feed/v1/wikipedia/en/featured/2024/09/01".into()
            )]
        );
    }

    #[tokio::test]
    async fn test_selection_change_does_not_refetch() {
        let mut h = Harness::new(vec![]);

        h.controller.set_language("de");
        h.controller.set_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert!(h.transport.calls().is_empty());
        assert!(h.events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_resolution_notifies_and_returns_to_idle() {
        let mut h = Harness::new(vec![]);

        let request = h.controller.begin_search().unwrap();
        let selection = request.selection().clone();
        drop(request);
        h.controller.finish_search(SearchResolution::failed(
            selection,
            WikidashError::Other("task panicked".into()),
        ));

        assert_eq!(h.controller.last_status(), Some(SearchStatus::Error));
        assert!(!h.controller.is_loading());
        assert_eq!(h.events(), vec![NotificationEvent::error(FAILURE_MESSAGE)]);
    }

    #[tokio::test]
    async fn test_stray_resolution_is_ignored() {
        let mut h = Harness::new(vec![]);

        let ignored = h.controller.finish_search(SearchResolution::failed(
            Selection::new("en", date()),
            WikidashError::Other("late".into()),
        ));

        assert_eq!(ignored, None);
        assert!(h.events().is_empty());
    }

    #[tokio::test]
    async fn test_pages_of_ten_items() {
        let mut h = Harness::new(vec![feed(10)]);
        h.controller.trigger_search().await;

        h.controller.set_page(2);

        assert_eq!(tids(h.controller.view()), vec!["t5", "t6", "t7", "t8", "t9"]);
        assert_eq!(h.controller.view().count, 10);
        assert_eq!(h.controller.page_count(), 2);
    }

    #[tokio::test]
    async fn test_request_more_grows_page_size() {
        let mut h = Harness::new(vec![feed(12)]);
        h.controller.trigger_search().await;

        assert!(h.controller.request_more());
        assert_eq!(h.controller.pagination().page_size(), 10);
        assert_eq!(h.controller.view().articles.len(), 10);

        assert!(h.controller.request_more());
        assert_eq!(h.controller.view().articles.len(), 12);
        assert_eq!(h.controller.view().count, 12);
    }

    #[tokio::test]
    async fn test_request_more_ignored_while_loading() {
        let mut h = Harness::new(vec![feed(12)]);

        let request = h.controller.begin_search().unwrap();
        assert!(!h.controller.request_more());
        assert!(!h.controller.request_more());
        assert_eq!(h.controller.pagination().page_size(), 5);

        let resolution = request.execute().await;
        h.controller.finish_search(resolution);
        assert!(h.controller.request_more());
        assert_eq!(h.controller.pagination().page_size(), 10);
    }

    #[tokio::test]
    async fn test_request_more_with_zero_step_changes_nothing() {
        let settings = ControllerSettings {
            initial_page_size: 5,
            page_size_step: 0,
        };
        let mut h = Harness::with_settings(vec![feed(12)], settings);
        h.controller.trigger_search().await;

        assert!(!h.controller.request_more());
        assert_eq!(h.controller.pagination().page_size(), 5);
        assert_eq!(h.controller.view().articles.len(), 5);
    }

    #[tokio::test]
    async fn test_page_size_selection_resets_page() {
        let mut h = Harness::new(vec![feed(20)]);
        h.controller.trigger_search().await;
        h.controller.set_page(3);

        h.controller.request_more();
        assert_eq!(h.controller.pagination().page_index(), 3);

        h.controller.set_page_size(4);
        assert_eq!(h.controller.pagination().page_index(), 1);
        assert_eq!(tids(h.controller.view()), vec!["t0", "t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn test_zero_initial_page_size_shows_nothing_until_grown() {
        let settings = ControllerSettings {
            initial_page_size: 0,
            page_size_step: 5,
        };
        let mut h = Harness::with_settings(vec![feed(7)], settings);
        h.controller.trigger_search().await;

        assert!(h.controller.view().articles.is_empty());
        assert_eq!(h.controller.view().count, 7);
        assert_eq!(h.controller.page_count(), 0);

        h.controller.request_more();
        assert_eq!(h.controller.view().articles.len(), 5);
    }

    #[tokio::test]
    async fn test_open_article_marks_read_once() {
        let mut h = Harness::new(vec![]);

        assert!(!h.controller.is_read("t1"));
        assert!(h.controller.open_article("t1"));
        assert!(!h.controller.open_article("t1"));
        assert!(h.controller.is_read("t1"));
    }

    #[test]
    fn test_failure_message_lookup() {
        assert_eq!(failure_message(&json!({ "message": "direct" })), "direct");
        assert_eq!(
            failure_message(&json!({ "error": "request failed", "details": { "message": "nested" } })),
            "nested"
        );
        assert_eq!(
            failure_message(&json!({ "error": "request failed", "details": "text body" })),
            "request failed"
        );
        assert_eq!(failure_message(&json!({ "message": "  " })), FAILURE_MESSAGE);
        assert_eq!(failure_message(&json!(null)), FAILURE_MESSAGE);
    }
}
