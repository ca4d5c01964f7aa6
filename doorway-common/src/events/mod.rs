//! Event types for the doorway event system
//!
//! Provides shared event definitions and the EventBus used by the journey
//! components to report state changes to whatever renders them.

mod playback_types;

pub use playback_types::{LoopMode, PlaybackState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Journey event types
///
/// Events are broadcast via EventBus and are serializable so a view layer
/// (or the smoke harness) can log them verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JourneyEvent {
    /// Playback state changed
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: DateTime<Utc>,
    },

    /// A narrative section became the active one
    ///
    /// `cue_seconds` is None when the section has no usable cue point.
    SectionActivated {
        section_id: String,
        cue_seconds: Option<f64>,
        timestamp: DateTime<Utc>,
    },

    /// A section was revealed for the first time (never repeats per section)
    SectionRevealed {
        section_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Source fallback chain moved to the next candidate after a load error
    SourceAdvanced {
        from_index: usize,
        to_index: usize,
        url: String,
        timestamp: DateTime<Utc>,
    },

    /// Explicit reload back to the first candidate with a fresh cache token
    SourceReloaded {
        url: String,
        timestamp: DateTime<Utc>,
    },

    /// The last candidate failed; nothing left to try
    SourcesExhausted {
        url: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Loop configuration changed
    LoopModeChanged {
        loop_mode: LoopMode,
        timestamp: DateTime<Utc>,
    },

    /// Scroll completion changed (0-100)
    ProgressChanged {
        percent: f64,
        timestamp: DateTime<Utc>,
    },

    /// Engine selection changed the outbound link
    EngineSelected {
        engine: String,
        url: String,
        timestamp: DateTime<Utc>,
    },

    /// User session fields changed
    SessionChanged {
        name: String,
        is_subscribed: bool,
        timestamp: DateTime<Utc>,
    },

    /// First user interaction managed to start playback
    AudioUnlocked { timestamp: DateTime<Utc> },
}

impl JourneyEvent {
    /// Variant name, for logging and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            JourneyEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            JourneyEvent::SectionActivated { .. } => "SectionActivated",
            JourneyEvent::SectionRevealed { .. } => "SectionRevealed",
            JourneyEvent::SourceAdvanced { .. } => "SourceAdvanced",
            JourneyEvent::SourceReloaded { .. } => "SourceReloaded",
            JourneyEvent::SourcesExhausted { .. } => "SourcesExhausted",
            JourneyEvent::LoopModeChanged { .. } => "LoopModeChanged",
            JourneyEvent::ProgressChanged { .. } => "ProgressChanged",
            JourneyEvent::EngineSelected { .. } => "EngineSelected",
            JourneyEvent::SessionChanged { .. } => "SessionChanged",
            JourneyEvent::AudioUnlocked { .. } => "AudioUnlocked",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
///
/// # Examples
///
/// ```
/// use doorway_common::events::{EventBus, JourneyEvent, PlaybackState};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(JourneyEvent::PlaybackStateChanged {
///     old_state: PlaybackState::Idle,
///     new_state: PlaybackState::Playing,
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.event_type(), "PlaybackStateChanged");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JourneyEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<JourneyEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: JourneyEvent,
    ) -> Result<usize, broadcast::error::SendError<JourneyEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: JourneyEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_emit_without_subscribers() {
        let bus = EventBus::new(10);
        let result = bus.emit(JourneyEvent::AudioUnlocked {
            timestamp: Utc::now(),
        });
        assert!(result.is_err());

        // Lossy variant must not panic
        bus.emit_lossy(JourneyEvent::AudioUnlocked {
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn test_eventbus_emit_lossy_when_full() {
        let bus = EventBus::new(2);
        let mut _rx = bus.subscribe();

        for i in 0..10 {
            bus.emit_lossy(JourneyEvent::ProgressChanged {
                percent: i as f64 * 10.0,
                timestamp: Utc::now(),
            });
        }

        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn test_eventbus_multiple_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(JourneyEvent::SectionActivated {
            section_id: "breath".to_string(),
            cue_seconds: Some(7.5),
            timestamp: Utc::now(),
        })
        .expect("emit should succeed");

        assert_eq!(rx1.try_recv().unwrap().event_type(), "SectionActivated");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "SectionActivated");
    }

    #[tokio::test]
    async fn test_eventbus_async_receive() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit_lossy(JourneyEvent::LoopModeChanged {
            loop_mode: LoopMode::Off,
            timestamp: Utc::now(),
        });

        match rx.recv().await.unwrap() {
            JourneyEvent::LoopModeChanged { loop_mode, .. } => assert_eq!(loop_mode, LoopMode::Off),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = JourneyEvent::EngineSelected {
            engine: "gpt5".to_string(),
            url: "https://gpt5.example.com".to_string(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "EngineSelected");
        assert_eq!(value["engine"], "gpt5");
    }
}
