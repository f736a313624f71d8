//! # Event Bus System
//!
//! Broadcasts sync progress to observers without coupling the sync engine to
//! any of them.
//!
//! ## Overview
//!
//! The event bus is built on `tokio::sync::broadcast`. The sync engine holds an
//! optional [`EventBus`] and emits a [`TransferEvent`] at the start of a batch,
//! after every file, and when the batch ends. The CLI subscribes to build its
//! Teams summary; tests subscribe to assert on ordering.
//!
//! Emitting with no subscribers is not an error for the engine: the send
//! result is ignored, so an unobserved bus costs one failed `send` per event.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, TransferDirection, TransferEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Transfer(TransferEvent::FileTransferred {
//!     direction: TransferDirection::Download,
//!     name: "PrEP_Q1.csv".to_string(),
//!     bytes: 1024,
//! }))
//! .ok();
//!
//! let event = rx.recv().await.unwrap();
//! assert!(matches!(event, CoreEvent::Transfer(_)));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events and can keep
//!   receiving.
//! - **`RecvError::Closed`**: every sender has been dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Transfer batch lifecycle and per-file outcomes
    Transfer(TransferEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Transfer(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Transfer(TransferEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Transfer(TransferEvent::FileFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Transfer(TransferEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Which way a transfer batch moves files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Remote folder to local directory
    Download,
    /// Local directory to remote folder
    Upload,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferDirection::Download => write!(f, "download"),
            TransferDirection::Upload => write!(f, "upload"),
        }
    }
}

/// Events emitted by one download or upload batch.
///
/// A batch emits `Started`, then one `FileTransferred` or `FileFailed` per
/// attempted file, then exactly one of `Completed` or `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum TransferEvent {
    /// Batch started.
    Started {
        direction: TransferDirection,
        /// Folder or directory files are read from
        source: String,
        /// Folder or directory files are written to
        destination: String,
    },
    /// One file was written to its destination.
    FileTransferred {
        direction: TransferDirection,
        name: String,
        bytes: u64,
    },
    /// One file could not be transferred.
    FileFailed {
        direction: TransferDirection,
        name: String,
        message: String,
    },
    /// Batch finished; failures were collected rather than aborting.
    Completed {
        direction: TransferDirection,
        transferred: usize,
        skipped: usize,
        failed: usize,
        duration_ms: u64,
    },
    /// Batch aborted.
    Failed {
        direction: TransferDirection,
        message: String,
    },
}

impl TransferEvent {
    fn description(&self) -> &str {
        match self {
            TransferEvent::Started { .. } => "Transfer started",
            TransferEvent::FileTransferred { .. } => "File transferred",
            TransferEvent::FileFailed { .. } => "File transfer failed",
            TransferEvent::Completed { .. } => "Transfer completed",
            TransferEvent::Failed { .. } => "Transfer aborted",
        }
    }

    pub fn direction(&self) -> TransferDirection {
        match self {
            TransferEvent::Started { direction, .. }
            | TransferEvent::FileTransferred { direction, .. }
            | TransferEvent::FileFailed { direction, .. }
            | TransferEvent::Completed { direction, .. }
            | TransferEvent::Failed { direction, .. } => *direction,
        }
    }
}

/// Broadcast channel for [`CoreEvent`]s.
///
/// Cloning is cheap and every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers that fall more than `capacity` events behind receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transferred(name: &str) -> CoreEvent {
        CoreEvent::Transfer(TransferEvent::FileTransferred {
            direction: TransferDirection::Upload,
            name: name.to_string(),
            bytes: 42,
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(transferred("a.csv")).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = transferred("PrEP_Q1.csv");
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_clone_publishes_into_same_channel() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();

        let clone = bus.clone();
        clone.emit(transferred("x.csv")).ok();

        assert_eq!(sub.recv().await.unwrap(), transferred("x.csv"));
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(transferred(&format!("file-{}.csv", i))).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Transfer(TransferEvent::Failed {
            direction: TransferDirection::Download,
            message: "folder not found".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Error);

        let file_failed = CoreEvent::Transfer(TransferEvent::FileFailed {
            direction: TransferDirection::Upload,
            name: "a.csv".to_string(),
            message: "denied".to_string(),
        });
        assert_eq!(file_failed.severity(), EventSeverity::Warning);

        let completed = CoreEvent::Transfer(TransferEvent::Completed {
            direction: TransferDirection::Upload,
            transferred: 2,
            skipped: 1,
            failed: 0,
            duration_ms: 15,
        });
        assert_eq!(completed.severity(), EventSeverity::Info);
        assert_eq!(completed.description(), "Transfer completed");

        assert_eq!(transferred("a").severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Transfer(TransferEvent::Started {
            direction: TransferDirection::Download,
            source: "Tableau".to_string(),
            destination: "/srv/extracts".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Transfer\""));
        assert!(json.contains("\"event\":\"Started\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn test_direction_accessor_and_display() {
        let event = TransferEvent::FileFailed {
            direction: TransferDirection::Upload,
            name: "a.csv".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(event.direction(), TransferDirection::Upload);
        assert_eq!(TransferDirection::Download.to_string(), "download");
    }
}
