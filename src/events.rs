use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, trace, warn};

/// Default capacity of the session event channel
pub const SESSION_EVENT_CAPACITY: usize = 64;

/// Why a session ended without the user asking for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationReason {
    /// A request was rejected and no refresh token was stored
    MissingRefreshToken,
    /// The renewal endpoint answered with a non-success status
    RenewalRejected { status: u16, message: String },
    /// The renewal endpoint could not be reached or returned garbage
    RenewalFailed { message: String },
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRefreshToken => write!(f, "no refresh token available"),
            Self::RenewalRejected { status, message } => {
                write!(f, "renewal rejected with status {}: {}", status, message)
            }
            Self::RenewalFailed { message } => write!(f, "renewal failed: {}", message),
        }
    }
}

/// Changes to the session lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Credentials were created by login or registration
    SignedIn,
    /// Credentials were replaced by a successful renewal
    Renewed,
    /// Credentials were destroyed because renewal was impossible
    Terminated { reason: TerminationReason },
    /// Credentials were destroyed by an explicit logout
    SignedOut,
}

impl SessionEvent {
    /// Short name used for statistics and logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignedIn => "signed_in",
            Self::Renewed => "renewed",
            Self::Terminated { .. } => "terminated",
            Self::SignedOut => "signed_out",
        }
    }

    /// True for events after which the user must authenticate again
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::Terminated { .. } | Self::SignedOut)
    }
}

/// Envelope for a published session event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNotice {
    pub id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event: SessionEvent,
}

impl SessionNotice {
    pub fn new(event: SessionEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
            event,
        }
    }
}

/// Counters kept by the session event bus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBusStats {
    /// Events delivered to at least one receiver
    pub events_published: u64,
    /// Events published while nobody was listening
    pub events_dropped: u64,
    /// Per-kind totals, keyed by [`SessionEvent::kind`]
    pub kind_counts: HashMap<String, u64>,
}

/// Broadcast bus carrying session lifecycle events to the rest of the app
pub struct SessionEventBus {
    sender: broadcast::Sender<SessionNotice>,
    capacity: usize,
    stats: Arc<RwLock<EventBusStats>>,
}

impl SessionEventBus {
    /// `capacity` bounds how far a slow subscriber may fall behind
    pub fn new(capacity: usize) -> Self {
        info!(capacity, "Creating session event bus");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            capacity,
            stats: Arc::new(RwLock::new(EventBusStats::default())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        trace!("New subscriber registered to session event bus");
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers, returning how many received it.
    ///
    /// Publishing with nobody listening is not an error; the event is counted
    /// as dropped.
    pub async fn publish(&self, event: SessionEvent) -> usize {
        let kind = event.kind();
        trace!(kind, "Publishing session event");

        match self.sender.send(SessionNotice::new(event)) {
            Ok(receivers) => {
                let mut stats = self.stats.write().await;
                stats.events_published += 1;
                *stats.kind_counts.entry(kind.to_string()).or_insert(0) += 1;

                trace!(receivers, kind, "Session event published");
                receivers
            }
            Err(_) => {
                let mut stats = self.stats.write().await;
                stats.events_dropped += 1;

                warn!(kind, "No receivers for session event, message dropped");
                0
            }
        }
    }

    pub async fn stats(&self) -> EventBusStats {
        self.stats.read().await.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live receivers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new(SESSION_EVENT_CAPACITY)
    }
}

impl Clone for SessionEventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            capacity: self.capacity,
            stats: Arc::clone(&self.stats),
        }
    }
}
