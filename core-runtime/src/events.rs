//! # Event Bus System
//!
//! Provides an event-driven architecture for the library core using `tokio::sync::broadcast`.
//! Collections and services publish typed events; any number of observers (the
//! UI shell, a sync layer, tests) subscribe independently.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies per domain
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ```text
//! ┌────────────────┐    publish    ┌───────────┐    subscribe    ┌────────────┐
//! │ BookCollection ├──────────────>│           ├────────────────>│ Subscriber │
//! └────────────────┘               │ EventBus  │                 └────────────┘
//! ┌────────────────┐    publish    │           │    subscribe    ┌────────────┐
//! │SettingsService ├──────────────>│           ├────────────────>│ Subscriber │
//! └────────────────┘               └───────────┘                 └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus.publish(CoreEvent::Library(LibraryEvent::BookCountChanged { count: 3 }));
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event, CoreEvent::Library(LibraryEvent::BookCountChanged { count: 3 }));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal.
//! - **`RecvError::Closed`**: every sender was dropped. Treat as shutdown.
//!
//! Publishers use [`EventBus::publish`], which treats "nobody is listening"
//! as a normal outcome. [`EventBus::emit`] surfaces it for callers that care.
//!
//! ## Relation to `Signal`
//!
//! The bus is asynchronous and lossy for slow subscribers. Anything that must
//! react before a mutating call returns (the library view invalidating its
//! ordering) uses the synchronous `Signal` in `core-library` instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tracing::{debug, trace};

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Library content events
    Library(LibraryEvent),
    /// User settings events
    Settings(SettingsEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Settings(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Library(LibraryEvent::BookDeleted { .. }) => EventSeverity::Info,
            CoreEvent::Library(LibraryEvent::BookAdded { .. }) => EventSeverity::Info,
            CoreEvent::Settings(SettingsEvent::UserSettingsLoaded { .. }) => EventSeverity::Info,
            CoreEvent::Settings(SettingsEvent::UserDataCleared) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
}

// ============================================================================
// Library Events
// ============================================================================

/// Events related to library content changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// New book added to the library.
    BookAdded {
        book_id: String,
        title: String,
        authors: String,
    },
    /// Book metadata or reading state changed.
    BookUpdated {
        book_id: String,
        /// Names of the fields that differ from the previous record.
        updated_fields: Vec<String>,
    },
    /// Book removed from the library.
    BookDeleted { book_id: String },
    /// Tag attached to a book.
    TagAdded { book_id: String, tag: String },
    /// Number of books in the library changed.
    BookCountChanged { count: u64 },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::BookAdded { .. } => "Book added to library",
            LibraryEvent::BookUpdated { .. } => "Book updated",
            LibraryEvent::BookDeleted { .. } => "Book removed from library",
            LibraryEvent::TagAdded { .. } => "Tag added to book",
            LibraryEvent::BookCountChanged { .. } => "Library size changed",
        }
    }
}

// ============================================================================
// Settings Events
// ============================================================================

/// Events related to per-user settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SettingsEvent {
    /// Settings for a user were loaded (and defaults seeded).
    UserSettingsLoaded {
        /// Opaque per-user namespace, never the e-mail itself.
        user_hash: String,
        /// Number of default keys that had to be written.
        seeded_defaults: u32,
    },
    /// A single setting was written.
    SettingChanged { key: String },
    /// The active user was forgotten.
    UserDataCleared,
}

impl SettingsEvent {
    fn description(&self) -> &str {
        match self {
            SettingsEvent::UserSettingsLoaded { .. } => "User settings loaded",
            SettingsEvent::SettingChanged { .. } => "Setting changed",
            SettingsEvent::UserDataCleared => "User data cleared",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to core events.
///
/// Cloning the bus is cheap; every clone publishes into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Publishes an event, treating the absence of subscribers as a no-op.
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&self, event: CoreEvent) -> usize {
        match event.severity() {
            EventSeverity::Debug => trace!(event = event.description(), "Publishing event"),
            EventSeverity::Info => debug!(event = event.description(), "Publishing event"),
        }

        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(SendError(event)) => {
                trace!(event = event.description(), "No subscribers for event");
                0
            }
        }
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let library_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Library(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    fn book_added(title: &str) -> CoreEvent {
        CoreEvent::Library(LibraryEvent::BookAdded {
            book_id: format!("book-{}", title.to_lowercase()),
            title: title.to_string(),
            authors: "Frank Herbert".to_string(),
        })
    }

    #[test]
    fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_emit_without_subscribers_is_error_but_publish_is_not() {
        let bus = EventBus::new(10);
        assert!(bus.emit(book_added("Dune")).is_err());
        assert_eq!(bus.publish(book_added("Dune")), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = book_added("Dune");
        assert_eq!(bus.publish(event.clone()), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Settings(_)));

        bus.publish(book_added("Dune"));
        let settings_event = CoreEvent::Settings(SettingsEvent::SettingChanged {
            key: "Appearance/Theme".to_string(),
        });
        bus.publish(settings_event.clone());

        assert_eq!(stream.recv().await.unwrap(), settings_event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for count in 0..5 {
            bus.publish(CoreEvent::Library(LibraryEvent::BookCountChanged { count }));
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_try_recv() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());

        let event = book_added("Foundation");
        bus.publish(event.clone());
        assert_eq!(stream.try_recv().unwrap().unwrap(), event);
    }

    #[test]
    fn test_event_severity_and_description() {
        assert_eq!(book_added("Dune").severity(), EventSeverity::Info);
        assert_eq!(book_added("Dune").description(), "Book added to library");

        let count = CoreEvent::Library(LibraryEvent::BookCountChanged { count: 1 });
        assert_eq!(count.severity(), EventSeverity::Debug);

        let cleared = CoreEvent::Settings(SettingsEvent::UserDataCleared);
        assert_eq!(cleared.severity(), EventSeverity::Info);
        assert_eq!(cleared.description(), "User data cleared");
    }

    #[derive(Clone, Default)]
    struct LevelRecorder(Arc<Mutex<Vec<Level>>>);

    impl<S: tracing::Subscriber> Layer<S> for LevelRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn test_publish_logs_at_event_severity() {
        let recorder = LevelRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());
        let bus = EventBus::new(10);
        let _sub = bus.subscribe();

        tracing::subscriber::with_default(subscriber, || {
            bus.publish(book_added("Dune"));
            bus.publish(CoreEvent::Library(LibraryEvent::BookCountChanged { count: 1 }));
        });

        assert_eq!(*recorder.0.lock().unwrap(), vec![Level::DEBUG, Level::TRACE]);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Library(LibraryEvent::TagAdded {
            book_id: "book-1".to_string(),
            tag: "Sci-Fi".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Library\""));
        assert!(json.contains("\"event\":\"TagAdded\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
