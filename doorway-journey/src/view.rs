//! Rendered page state
//!
//! `PageSnapshot` is everything the view layer shows, captured at one
//! instant. It carries no behaviour; the smoke harness prints it as JSON.

use crate::engine_router::{EngineLink, EngineOption};
use crate::journey::MediaElement;
use crate::page::DoorwayPage;
use crate::session::KeyValueStore;
use doorway_common::events::{LoopMode, PlaybackState};
use doorway_common::human_time::format_progress_clock;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub name: String,
    pub badge: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSnapshot {
    pub build_stamp: String,
    pub status: PlaybackState,
    /// Inline error text, e.g. the exhausted source list
    pub error: Option<String>,
    /// `m:ss / m:ss`
    pub time: String,
    pub progress_percent: f64,
    pub active_section: String,
    pub revealed_sections: Vec<String>,
    pub loop_mode: LoopMode,
    pub source: String,
    pub engine: EngineLink,
    /// Confirmation required before following `engine`
    pub engine_leave_prompt: Option<String>,
    pub engine_options: Vec<EngineOption>,
    pub session: SessionView,
    pub audio_unlocked: bool,
    pub fallback_root: bool,
}

impl PageSnapshot {
    pub fn capture<M: MediaElement, S: KeyValueStore>(page: &DoorwayPage<M, S>) -> Self {
        let controller = page.controller();
        let telemetry = controller.telemetry();

        Self {
            build_stamp: page.context().build.stamp.clone(),
            status: controller.state(),
            error: controller.error_message().map(str::to_string),
            time: format_progress_clock(telemetry.current_seconds, telemetry.duration_seconds),
            progress_percent: page.progress(),
            active_section: page.observer().active().to_string(),
            revealed_sections: page.observer().revealed().to_vec(),
            loop_mode: controller.loop_mode(),
            source: controller.media().source().to_string(),
            engine: page.router().link(),
            engine_leave_prompt: page.engine_leave_prompt().map(str::to_string),
            engine_options: page.router().options(),
            session: SessionView {
                name: page.session().display_name().to_string(),
                badge: page.session().badge().to_string(),
            },
            audio_unlocked: page.is_unlocked(),
            fallback_root: page.fallback_root(),
        }
    }

    /// One-line status, as shown under the player
    pub fn status_line(&self) -> String {
        match &self.error {
            Some(error) => format!("{} · {}", self.status, error),
            None => format!("{} · {}", self.status, self.time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JourneyConfig;
    use crate::context::DoorwayContext;
    use crate::engine_router::EngineRouter;
    use crate::journey::{HostCapabilities, HostEvent, MediaEvent, ScrollMetrics, SimulatedMedia};
    use crate::session::UserSession;
    use doorway_common::config::EngineUrls;

    fn mounted_page() -> DoorwayPage<SimulatedMedia> {
        let ctx = DoorwayContext::default();
        let router = EngineRouter::new(ctx.clone(), EngineUrls::default(), None);
        let session = UserSession::in_memory(ctx.clone());
        let mut page = DoorwayPage::new(
            ctx,
            &JourneyConfig::default(),
            SimulatedMedia::new(64.0),
            router,
            session,
        )
        .unwrap();
        page.mount(HostCapabilities::default(), ScrollMetrics::new(600.0, 3200.0, 800.0));
        page
    }

    #[test]
    fn test_initial_snapshot() {
        let page = mounted_page();
        let snapshot = page.snapshot();

        assert_eq!(snapshot.status, PlaybackState::Idle);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.time, "0:00 / 0:00");
        assert_eq!(snapshot.progress_percent, 25.0);
        assert_eq!(snapshot.active_section, "threshold");
        assert!(snapshot.revealed_sections.is_empty());
        assert_eq!(snapshot.engine.label, "Enter The Architect");
        assert_eq!(snapshot.engine_leave_prompt, None);
        assert_eq!(snapshot.session.name, "Guest");
        assert_eq!(snapshot.session.badge, "FREE");
        assert!(!snapshot.fallback_root);
    }

    #[test]
    fn test_time_after_metadata() {
        let mut page = mounted_page();
        page.navigate_to("breath");
        page.dispatch(HostEvent::Media(MediaEvent::LoadedMetadata));

        assert_eq!(page.snapshot().time, "0:07 / 1:04");
    }

    #[test]
    fn test_error_status_line_names_sources() {
        let mut page = mounted_page();
        for _ in 0..3 {
            page.dispatch(HostEvent::Media(MediaEvent::Error));
        }

        let snapshot = page.snapshot();
        assert_eq!(snapshot.status, PlaybackState::Error);
        assert!(snapshot.status_line().starts_with("error · Audio failed to load."));
        assert!(snapshot.status_line().contains("/doorway.mp3"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(mounted_page().snapshot()).unwrap();
        assert_eq!(json["status"], "idle");
        assert_eq!(json["loop_mode"]["mode"], "native");
        assert_eq!(json["session"]["badge"], "FREE");
    }
}
