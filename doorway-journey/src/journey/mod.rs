//! Audio-synchronized scroll journey
//!
//! Leaf to root: sections/cue table, source fallback chain, section observer,
//! scroll progress, and the playback controller that ties them to the media
//! element. Host plumbing lives in `host` and `media`.

pub mod controller;
pub mod host;
pub mod media;
pub mod observer;
pub mod progress;
pub mod sections;
pub mod sources;

pub use controller::{AudioPlaybackController, TimeTelemetry, SOFT_LOOP_EPSILON};
pub use host::{HostCapabilities, HostEvent, ListenerKind, ListenerRegistry, MediaEvent, Subscription};
pub use media::{MediaElement, PlayOutcome, SimulatedHost, SimulatedMedia};
pub use observer::{IntersectionEntry, ObserverUpdate, SectionObserver, DEFAULT_ACTIVE_THRESHOLD};
pub use progress::{scroll_progress, ScrollMetrics, ScrollProgressTracker};
pub use sections::{default_sections, CueTable, NarrativeSection, SectionTable};
pub use sources::{default_sources, SourceFallbackChain};
