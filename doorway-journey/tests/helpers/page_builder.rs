//! Page construction for integration tests

use doorway_common::config::EngineUrls;
use doorway_common::events::{JourneyEvent, LoopMode};
use doorway_journey::config::{JourneyConfig, LoopModeSetting};
use doorway_journey::engine_router::EngineRouter;
use doorway_journey::journey::{
    HostCapabilities, HostEvent, IntersectionEntry, ScrollMetrics, SimulatedMedia,
};
use doorway_journey::session::{KeyValueStore, MemoryStore, UserSession};
use doorway_journey::{DoorwayContext, DoorwayPage};
use tokio::sync::broadcast;

pub const TEST_SOURCES: [&str; 3] = [
    "https://cdn.example.com/doorway.mp3",
    "/doorway.mp3",
    "https://public.example.com/doorway.wav",
];

/// Four sections, one viewport each
pub fn tall_viewport() -> ScrollMetrics {
    ScrollMetrics::new(0.0, 3200.0, 800.0)
}

/// Report `section_id` as fully visible
pub fn enter_section<S: KeyValueStore>(page: &mut DoorwayPage<SimulatedMedia, S>, section_id: &str) -> bool {
    page.dispatch(HostEvent::Intersection(vec![IntersectionEntry::visible(section_id)]))
}

/// Everything currently buffered on the receiver
pub fn drain_events(rx: &mut broadcast::Receiver<JourneyEvent>) -> Vec<JourneyEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub struct PageBuilder {
    config: JourneyConfig,
    media: SimulatedMedia,
    engines: EngineUrls,
    query: Option<String>,
    capabilities: HostCapabilities,
}

impl PageBuilder {
    pub fn new() -> Self {
        let mut config = JourneyConfig::default();
        config.audio.sources = TEST_SOURCES.iter().map(|s| s.to_string()).collect();

        Self {
            config,
            media: SimulatedMedia::new(64.0),
            engines: EngineUrls::default(),
            query: None,
            capabilities: HostCapabilities::default(),
        }
    }

    pub fn loop_mode(mut self, mode: LoopMode) -> Self {
        match mode {
            LoopMode::Native => self.config.audio.loop_mode = LoopModeSetting::Native,
            LoopMode::Off => self.config.audio.loop_mode = LoopModeSetting::Off,
            LoopMode::Soft {
                from_seconds,
                to_seconds,
            } => {
                self.config.audio.loop_mode = LoopModeSetting::Soft;
                self.config.audio.soft_from = from_seconds;
                self.config.audio.soft_to = to_seconds;
            }
        }
        self
    }

    pub fn with_gesture(mut self) -> Self {
        self.media.grant_gesture();
        self
    }

    pub fn failing_source(mut self, url_prefix: &str) -> Self {
        self.media.fail_source(url_prefix);
        self
    }

    pub fn auto_unlock(mut self, enabled: bool) -> Self {
        self.config.flags.audio_auto_unlock = enabled;
        self
    }

    pub fn smooth_scroll(mut self, enabled: bool) -> Self {
        self.config.flags.smooth_scroll = enabled;
        self
    }

    pub fn link_guard(mut self, enabled: bool) -> Self {
        self.config.flags.external_link_guard = enabled;
        self
    }

    pub fn engines(mut self, engines: EngineUrls) -> Self {
        self.engines = engines;
        self
    }

    pub fn query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn capabilities(mut self, capabilities: HostCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Build and mount with an in-memory session
    pub fn mount(self) -> (DoorwayPage<SimulatedMedia>, broadcast::Receiver<JourneyEvent>) {
        let ctx = DoorwayContext::default();
        let session = UserSession::new(ctx.clone(), MemoryStore::new());
        self.mount_with_session(ctx, session)
    }

    pub fn mount_with_session<S: KeyValueStore>(
        self,
        ctx: DoorwayContext,
        session: UserSession<S>,
    ) -> (DoorwayPage<SimulatedMedia, S>, broadcast::Receiver<JourneyEvent>) {
        let rx = ctx.events.subscribe();
        let router = EngineRouter::new(ctx.clone(), self.engines, self.query.as_deref());
        let mut page = DoorwayPage::new(ctx, &self.config, self.media, router, session)
            .expect("test page should build");
        page.mount(self.capabilities, tall_viewport());
        (page, rx)
    }
}
