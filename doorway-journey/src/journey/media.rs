//! Media element abstraction
//!
//! The controller drives a host media element only through this trait. A real
//! binding wraps the page's audio element; `SimulatedMedia` is the in-memory
//! stand-in used by the smoke harness and tests.

use std::collections::HashSet;
use tracing::trace;

/// Result of asking the element to start playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Playback started
    Started,
    /// Host refused because no user gesture preceded the request.
    /// Not an error: retry after a genuine interaction.
    BlockedPendingGesture,
    /// Playback failed for another reason
    Failed(String),
}

impl PlayOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, PlayOutcome::Started)
    }
}

/// Imperative surface of a host media element
pub trait MediaElement {
    /// Select a new source (does not fetch until `load`)
    fn set_source(&mut self, url: &str);

    /// Currently selected source
    fn source(&self) -> &str;

    /// (Re)fetch the selected source
    fn load(&mut self);

    fn play(&mut self) -> PlayOutcome;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Track duration; NaN or infinite while unknown
    fn duration(&self) -> f64;

    /// Native whole-track loop flag
    fn set_loop(&mut self, enabled: bool);

    fn is_loop(&self) -> bool;
}

/// In-memory media element
///
/// - Playback is refused with `BlockedPendingGesture` until `grant_gesture`
/// - Sources listed via `fail_source` report as broken (`source_is_broken`)
/// - Every seek and play request is recorded for assertions
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    source: String,
    paused: bool,
    current_time: f64,
    duration: f64,
    loop_flag: bool,
    gesture_granted: bool,
    broken_sources: HashSet<String>,
    /// Every `set_current_time` call in order
    pub seeks: Vec<f64>,
    /// Number of `play` requests, whatever the outcome
    pub play_requests: usize,
    /// Number of `load` calls
    pub loads: usize,
}

impl SimulatedMedia {
    /// New element with a known track duration
    pub fn new(duration: f64) -> Self {
        Self {
            source: String::new(),
            paused: true,
            current_time: 0.0,
            duration,
            loop_flag: false,
            gesture_granted: false,
            broken_sources: HashSet::new(),
            seeks: Vec::new(),
            play_requests: 0,
            loads: 0,
        }
    }

    /// Element whose metadata has not loaded yet
    pub fn without_metadata() -> Self {
        Self::new(f64::NAN)
    }

    /// Simulate a user gesture (autoplay now allowed)
    pub fn grant_gesture(&mut self) {
        self.gesture_granted = true;
    }

    /// Mark a source URL (prefix match) as failing to load
    pub fn fail_source(&mut self, url_prefix: &str) {
        self.broken_sources.insert(url_prefix.to_string());
    }

    /// Whether the selected source is one of the failing ones
    pub fn source_is_broken(&self) -> bool {
        self.broken_sources
            .iter()
            .any(|prefix| self.source.starts_with(prefix.as_str()))
    }

    /// Metadata arrives
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    /// Let playback run for `seconds`; does not wrap or stop at the end
    pub fn advance(&mut self, seconds: f64) {
        if !self.paused {
            self.current_time += seconds;
        }
    }

    /// Move the playhead without recording a seek (playback tick)
    pub fn set_playhead(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    /// Element reached the end of the track on its own
    pub fn finish(&mut self) {
        if self.duration.is_finite() {
            self.current_time = self.duration;
        }
        self.paused = true;
    }
}

/// Host-side handle on a `SimulatedMedia` owned by a controller
///
/// Covers what the browser does to an element by itself. Seeking, play,
/// pause and source selection stay with the controller.
pub struct SimulatedHost<'a> {
    media: &'a mut SimulatedMedia,
}

impl<'a> SimulatedHost<'a> {
    pub(crate) fn new(media: &'a mut SimulatedMedia) -> Self {
        Self { media }
    }

    /// A user gesture happened
    pub fn grant_gesture(&mut self) {
        self.media.grant_gesture();
    }

    /// The network starts failing for sources under `url_prefix`
    pub fn fail_source(&mut self, url_prefix: &str) {
        self.media.fail_source(url_prefix);
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.media.set_duration(duration);
    }

    pub fn advance(&mut self, seconds: f64) {
        self.media.advance(seconds);
    }

    pub fn set_playhead(&mut self, seconds: f64) {
        self.media.set_playhead(seconds);
    }

    pub fn finish(&mut self) {
        self.media.finish();
    }
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self::new(64.0)
    }
}

impl MediaElement for SimulatedMedia {
    fn set_source(&mut self, url: &str) {
        self.source = url.to_string();
        self.paused = true;
        self.current_time = 0.0;
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn load(&mut self) {
        self.loads += 1;
    }

    fn play(&mut self) -> PlayOutcome {
        self.play_requests += 1;
        if self.source_is_broken() {
            return PlayOutcome::Failed(format!("source not playable: {}", self.source));
        }
        if !self.gesture_granted {
            trace!("Simulated play blocked pending gesture");
            return PlayOutcome::BlockedPendingGesture;
        }
        self.paused = false;
        PlayOutcome::Started
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.seeks.push(seconds);
        self.current_time = seconds;
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_loop(&mut self, enabled: bool) {
        self.loop_flag = enabled;
    }

    fn is_loop(&self) -> bool {
        self.loop_flag
    }
}
