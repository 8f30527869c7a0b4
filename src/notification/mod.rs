//! Session-scoped notification channel.
//!
//! Holds at most one live `(kind, message)` pair. A subscriber shows an event
//! for a fixed window measured from the moment *it* receives the event; a new
//! publish supersedes the live one and restarts the window.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

pub const NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => f.write_str("success"),
            NotificationKind::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub message: String,
}

impl NotificationEvent {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Dispatch capability handed to producers such as the controller.
pub type Dispatch = Arc<dyn Fn(NotificationEvent) + Send + Sync>;

pub struct NotificationChannel {
    tx: Arc<watch::Sender<Option<NotificationEvent>>>,
    ttl: Duration,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl NotificationChannel {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            ttl,
        }
    }

    pub fn publish(&self, event: NotificationEvent) {
        publish_on(&self.tx, event);
    }

    pub fn dispatcher(&self) -> Dispatch {
        let tx = self.tx.clone();
        Arc::new(move |event: NotificationEvent| publish_on(&tx, event))
    }

    pub fn subscribe(&self) -> NotificationSubscriber {
        NotificationSubscriber {
            rx: self.tx.subscribe(),
            live: None,
            ttl: self.ttl,
        }
    }
}

fn publish_on(tx: &watch::Sender<Option<NotificationEvent>>, event: NotificationEvent) {
    tracing::debug!(kind = %event.kind, message = %event.message, "notification published");
    // send_replace stores the value even when nobody is subscribed yet
    tx.send_replace(Some(event));
}

struct LiveNotification {
    event: NotificationEvent,
    received_at: Instant,
}

pub struct NotificationSubscriber {
    rx: watch::Receiver<Option<NotificationEvent>>,
    live: Option<LiveNotification>,
    ttl: Duration,
}

impl NotificationSubscriber {
    /// The event that should be visible right now, if any.
    pub fn current(&mut self) -> Option<&NotificationEvent> {
        if self.rx.has_changed().unwrap_or(false) {
            let published = self.rx.borrow_and_update().clone();
            if let Some(event) = published {
                self.receive(event);
            }
        }

        let expired = self
            .live
            .as_ref()
            .is_some_and(|live| live.received_at.elapsed() >= self.ttl);
        if expired {
            self.live = None;
        }

        self.live.as_ref().map(|live| &live.event)
    }

    /// Waits for the next publish and starts its display window.
    /// Returns `None` once every publisher is gone.
    pub async fn changed(&mut self) -> Option<NotificationEvent> {
        loop {
            self.rx.changed().await.ok()?;
            let published = self.rx.borrow_and_update().clone();
            if let Some(event) = published {
                self.receive(event.clone());
                return Some(event);
            }
        }
    }

    /// When the live event stops being visible.
    pub fn expires_at(&self) -> Option<Instant> {
        self.live.as_ref().map(|live| live.received_at + self.ttl)
    }

    fn receive(&mut self, event: NotificationEvent) {
        self.live = Some(LiveNotification {
            event,
            received_at: Instant::now(),
        });
    }
}
