//! Audio playback controller
//!
//! Sole owner of the media element. Tracks `PlaybackState`, `LoopMode` and
//! time telemetry, reacts to active-section changes by seeking to cue points,
//! implements soft (segment) looping on time-update ticks, and walks the
//! source fallback chain on load errors.
//!
//! # Per-section policy
//!
//! - Entering the final section starts playback (best effort, failures are
//!   swallowed).
//! - Entering the first section force-pauses and parks the playhead on its
//!   cue point, the resting position of the whole experience.
//!
//! # Error policy
//!
//! Nothing here returns an error. A blocked autoplay leaves the state as it
//! was; a load error advances the source chain; only the final candidate
//! failing moves the controller to `Error` with an inline message.

use super::media::{MediaElement, PlayOutcome, SimulatedHost, SimulatedMedia};
use super::sections::{CueTable, SectionTable};
use super::sources::SourceFallbackChain;
use crate::context::DoorwayContext;
use chrono::Utc;
use doorway_common::events::{JourneyEvent, LoopMode, PlaybackState};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Soft loop wraps this far before the end so discrete ticks never miss it
pub const SOFT_LOOP_EPSILON: f64 = 0.02;

/// Playhead telemetry refreshed on every time-update tick
///
/// `duration_seconds` is 0 until metadata has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TimeTelemetry {
    pub current_seconds: f64,
    pub duration_seconds: f64,
}

/// Drives one media element through the journey
pub struct AudioPlaybackController<M: MediaElement> {
    ctx: DoorwayContext,
    media: M,
    sources: SourceFallbackChain,
    cues: Arc<CueTable>,
    resting_section: String,
    final_section: String,
    state: PlaybackState,
    loop_mode: LoopMode,
    telemetry: TimeTelemetry,
    error: Option<String>,
}

impl<M: MediaElement> AudioPlaybackController<M> {
    /// Take ownership of `media`, select the first source and apply `loop_mode`
    pub fn new(
        ctx: DoorwayContext,
        mut media: M,
        sources: SourceFallbackChain,
        sections: &SectionTable,
        loop_mode: LoopMode,
    ) -> Self {
        let url = sources.current_url();
        media.set_source(&url);
        media.load();
        media.set_loop(loop_mode.is_native());

        info!(source = %url, loop_mode = %loop_mode, "Audio controller initialized");

        Self {
            ctx,
            media,
            sources,
            cues: Arc::new(sections.cue_table()),
            resting_section: sections.first().id.clone(),
            final_section: sections.last().id.clone(),
            state: PlaybackState::Idle,
            loop_mode,
            telemetry: TimeTelemetry::default(),
            error: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn telemetry(&self) -> TimeTelemetry {
        self.telemetry
    }

    /// Inline error text for the status line, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sources(&self) -> &SourceFallbackChain {
        &self.sources
    }

    pub fn cues(&self) -> &Arc<CueTable> {
        &self.cues
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    // ========================================
    // Commands
    // ========================================

    /// Request playback
    ///
    /// `BlockedPendingGesture` leaves the state untouched and clears any
    /// error text; the caller may retry after a real interaction.
    pub fn play(&mut self) -> PlayOutcome {
        if self.state == PlaybackState::Playing && !self.media.is_paused() {
            return PlayOutcome::Started;
        }

        debug!(state = %self.state, "play() requested");
        let outcome = self.media.play();
        match &outcome {
            PlayOutcome::Started => {
                self.error = None;
                self.set_state(PlaybackState::Playing);
            }
            PlayOutcome::BlockedPendingGesture => {
                self.error = None;
                debug!("play() blocked until user gesture");
            }
            PlayOutcome::Failed(reason) => {
                warn!(reason = %reason, "play() failed");
                self.error = Some(reason.clone());
                self.set_state(PlaybackState::Error);
            }
        }
        outcome
    }

    /// Pause if currently playing
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.media.pause();
            self.set_state(PlaybackState::Paused);
        }
    }

    /// Pause and rewind to the start of the track
    pub fn stop(&mut self) {
        self.media.pause();
        self.media.set_current_time(0.0);
        self.telemetry.current_seconds = 0.0;
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Loading) {
            self.set_state(PlaybackState::Paused);
        }
    }

    /// Back to the first source with a fresh cache-busting token
    pub fn reload(&mut self) -> String {
        let url = self.sources.reset_with_fresh_token();
        info!(source = %url, "Reloading audio from primary source");

        self.media.set_source(&url);
        self.media.load();
        self.error = None;
        self.telemetry = TimeTelemetry::default();
        self.set_state(PlaybackState::Loading);

        self.ctx.emit(JourneyEvent::SourceReloaded {
            url: url.clone(),
            timestamp: Utc::now(),
        });
        url
    }

    /// Switch loop mode; native and soft loop exclude each other
    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.media.set_loop(mode.is_native());
        if self.loop_mode != mode {
            debug!(from = %self.loop_mode, to = %mode, "Loop mode changed");
        }
        self.loop_mode = mode;
        self.ctx.emit(JourneyEvent::LoopModeChanged {
            loop_mode: mode,
            timestamp: Utc::now(),
        });
    }

    /// Seek to a section's cue point without applying section policy
    ///
    /// Returns the cue that was applied, or None if the section has none.
    pub fn seek_to_section(&mut self, section_id: &str) -> Option<f64> {
        let cue = self.cues.cue(section_id)?;
        self.media.set_current_time(cue);
        self.telemetry.current_seconds = cue;
        debug!(section = %section_id, cue, "Seeked to cue point");
        Some(cue)
    }

    // ========================================
    // Host notifications
    // ========================================

    /// Active section changed: seek to its cue, then apply section policy
    pub fn on_active_section_changed(&mut self, section_id: &str) {
        let cue = self.seek_to_section(section_id);
        if cue.is_none() {
            debug!(section = %section_id, "No cue point configured for section");
        }

        self.ctx.emit(JourneyEvent::SectionActivated {
            section_id: section_id.to_string(),
            cue_seconds: cue,
            timestamp: Utc::now(),
        });

        if section_id == self.final_section {
            self.autoplay_best_effort();
        } else if section_id == self.resting_section {
            self.media.pause();
            if let Some(cue) = cue {
                if self.media.current_time() != cue {
                    self.media.set_current_time(cue);
                }
            }
            if matches!(self.state, PlaybackState::Playing | PlaybackState::Loading) {
                self.set_state(PlaybackState::Paused);
            }
        }
    }

    /// Playback tick: refresh telemetry and enforce the soft loop boundary
    ///
    /// Returns true if the tick wrapped the soft loop.
    pub fn on_time_update(&mut self) -> bool {
        let current = finite_or_zero(self.media.current_time());
        let duration = finite_or_zero(self.media.duration());
        self.telemetry = TimeTelemetry {
            current_seconds: current,
            duration_seconds: duration,
        };

        let LoopMode::Soft {
            from_seconds,
            to_seconds,
        } = self.loop_mode
        else {
            return false;
        };
        if duration <= 0.0 {
            return false;
        }

        let start = from_seconds.max(0.0);
        let end = if to_seconds > 0.0 {
            to_seconds.min(duration)
        } else {
            duration
        };
        // A segment shorter than the epsilon would wrap on every tick
        if end - start <= SOFT_LOOP_EPSILON {
            return false;
        }

        if current >= end - SOFT_LOOP_EPSILON {
            debug!(current, start, end, "Soft loop boundary reached");
            self.media.set_current_time(start);
            self.telemetry.current_seconds = start;
            if !self.media.is_paused() {
                // Re-issue play so the wrap doesn't stall
                match self.media.play() {
                    PlayOutcome::Started => {}
                    PlayOutcome::BlockedPendingGesture => {
                        debug!("Soft loop replay blocked pending gesture")
                    }
                    PlayOutcome::Failed(reason) => {
                        warn!(source = %self.media.source(), "Soft loop replay failed: {}", reason)
                    }
                }
            }
            return true;
        }
        false
    }

    /// Metadata arrived: duration is now known
    pub fn on_loaded_metadata(&mut self) {
        self.telemetry = TimeTelemetry {
            current_seconds: finite_or_zero(self.media.current_time()),
            duration_seconds: finite_or_zero(self.media.duration()),
        };
        debug!(duration = self.telemetry.duration_seconds, "Metadata loaded");
    }

    /// Source can play: a pending load is finished
    pub fn on_can_play(&mut self) {
        if self.state == PlaybackState::Loading {
            self.set_state(PlaybackState::Idle);
        }
    }

    /// Element started playing on its own (native controls)
    pub fn on_media_play(&mut self) {
        if self.state != PlaybackState::Playing {
            self.error = None;
            self.set_state(PlaybackState::Playing);
        }
    }

    /// Element paused on its own (native controls)
    pub fn on_media_pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.set_state(PlaybackState::Paused);
        }
    }

    /// Track ended
    ///
    /// With no loop active, restart manually so the journey is never left
    /// silent on hosts whose native loop is unreliable.
    pub fn on_ended(&mut self) {
        self.set_state(PlaybackState::Ended);

        if self.loop_mode == LoopMode::Off {
            info!("Track ended with no loop active, restarting");
            self.media.set_current_time(0.0);
            self.telemetry.current_seconds = 0.0;
            match self.media.play() {
                PlayOutcome::Started => self.set_state(PlaybackState::Playing),
                other => debug!(outcome = ?other, "Failsafe restart did not start"),
            }
        }
    }

    /// Current source failed to load: advance the fallback chain
    ///
    /// Returns true if another candidate was selected.
    pub fn on_source_error(&mut self) -> bool {
        let from_index = self.sources.index();

        if self.sources.advance() {
            let url = self.sources.current_url();
            warn!(
                failed = %self.sources.candidates()[from_index],
                next = %url,
                "Audio source failed, trying next candidate"
            );
            self.media.set_source(&url);
            self.media.load();
            self.set_state(PlaybackState::Loading);

            self.ctx.emit(JourneyEvent::SourceAdvanced {
                from_index,
                to_index: self.sources.index(),
                url,
                timestamp: Utc::now(),
            });
            return true;
        }

        let message = self.sources.failure_message();
        error!(source = %self.sources.current_url(), "{}", message);
        self.error = Some(message.clone());
        self.set_state(PlaybackState::Error);

        self.ctx.emit(JourneyEvent::SourcesExhausted {
            url: self.sources.current_url(),
            message,
            timestamp: Utc::now(),
        });
        false
    }

    // ========================================
    // Internals
    // ========================================

    fn autoplay_best_effort(&mut self) {
        match self.media.play() {
            PlayOutcome::Started => {
                self.error = None;
                self.set_state(PlaybackState::Playing);
            }
            other => debug!(outcome = ?other, "Final-section autoplay did not start"),
        }
    }

    fn set_state(&mut self, new_state: PlaybackState) {
        let old_state = self.state;
        if old_state == new_state {
            return;
        }
        self.state = new_state;
        debug!(from = %old_state, to = %new_state, "Playback state changed");

        self.ctx.emit(JourneyEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: Utc::now(),
        });
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl AudioPlaybackController<SimulatedMedia> {
    /// What the host does to the element on its own: gestures, playback
    /// ticks, metadata, end of track
    pub fn simulated_host(&mut self) -> SimulatedHost<'_> {
        SimulatedHost::new(&mut self.media)
    }
}
