//! Doorway page
//!
//! Composes the journey for one page lifetime: playback controller, section
//! observer, scroll progress, listener registry, engine router and user
//! session. The host delivers notifications through `dispatch`; events whose
//! listener kind is not bound (before `mount`, after `unmount`, or a kind the
//! host cannot provide) are dropped.
//!
//! # Lifecycle
//!
//! 1. `new` wires the components from a `JourneyConfig`
//! 2. `mount` binds listeners and computes progress once
//! 3. `dispatch` for every host notification
//! 4. `unmount` releases every listener
//!
//! `mount` and `unmount` are both idempotent.

use crate::config::JourneyConfig;
use crate::context::DoorwayContext;
use crate::engine_router::EngineRouter;
use crate::journey::{
    AudioPlaybackController, HostCapabilities, HostEvent, IntersectionEntry, ListenerKind,
    ListenerRegistry, MediaElement, MediaEvent, PlayOutcome, ScrollMetrics,
    ScrollProgressTracker, SectionObserver, SectionTable, SimulatedHost, SimulatedMedia,
};
use crate::session::{KeyValueStore, MemoryStore, UserSession};
use crate::view::PageSnapshot;
use crate::Result;
use chrono::Utc;
use doorway_common::events::JourneyEvent;
use tracing::{debug, info, trace, warn};

/// One mounted doorway page
pub struct DoorwayPage<M: MediaElement, S: KeyValueStore = MemoryStore> {
    ctx: DoorwayContext,
    sections: SectionTable,
    controller: AudioPlaybackController<M>,
    observer: SectionObserver,
    progress: ScrollProgressTracker,
    registry: ListenerRegistry,
    router: EngineRouter,
    session: UserSession<S>,
    site_url: String,
    auto_unlock: bool,
    smooth_scroll: bool,
    link_guard: bool,
    unlocked: bool,
    fallback_root: bool,
}

impl<M: MediaElement, S: KeyValueStore> DoorwayPage<M, S> {
    /// Wire the page; fails only on an invalid section table or source list
    pub fn new(
        ctx: DoorwayContext,
        config: &JourneyConfig,
        media: M,
        router: EngineRouter,
        session: UserSession<S>,
    ) -> Result<Self> {
        let sections = config.section_table()?;
        let sources = config.source_chain()?;

        let controller = AudioPlaybackController::new(
            ctx.clone(),
            media,
            sources,
            &sections,
            config.loop_mode(),
        );
        let observer = SectionObserver::new(&sections, config.observer.threshold);

        info!(
            build = %ctx.build.stamp,
            sections = sections.sections().len(),
            threshold = observer.threshold(),
            auto_unlock = config.flags.audio_auto_unlock,
            smooth_scroll = config.flags.smooth_scroll,
            link_guard = config.flags.external_link_guard,
            "Doorway page created"
        );

        Ok(Self {
            ctx,
            sections,
            controller,
            observer,
            progress: ScrollProgressTracker::new(),
            registry: ListenerRegistry::new(),
            router,
            session,
            site_url: config.site.url.clone(),
            auto_unlock: config.flags.audio_auto_unlock,
            smooth_scroll: config.flags.smooth_scroll,
            link_guard: config.flags.external_link_guard,
            unlocked: false,
            fallback_root: false,
        })
    }

    // ========================================
    // Lifecycle
    // ========================================

    /// Bind host listeners and take the initial scroll reading
    pub fn mount(&mut self, capabilities: HostCapabilities, initial: ScrollMetrics) {
        if !capabilities.root_mount && !self.fallback_root {
            warn!("Root mount point missing, rendering into a fallback root");
            self.fallback_root = true;
        }

        self.registry.register(ListenerKind::Scroll);
        self.registry.register(ListenerKind::Media);

        if capabilities.intersection_observer {
            self.registry.register(ListenerKind::Intersection);
        } else {
            warn!(
                active = %self.observer.active(),
                "Intersection observation unavailable, active section stays at its initial value"
            );
        }

        if self.auto_unlock && !self.unlocked {
            self.registry.register(ListenerKind::Interaction);
        }

        self.on_scroll(initial);
        debug!(listeners = self.registry.bound_count(), "Page mounted");
    }

    /// Release every host listener
    pub fn unmount(&mut self) {
        let released = self.registry.clear();
        debug!(released, "Page unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.registry.bound_count() > 0
    }

    /// Deliver one host notification
    ///
    /// Returns false if the event was dropped because its kind is unbound.
    pub fn dispatch(&mut self, event: HostEvent) -> bool {
        let kind = event.kind();
        if !self.registry.is_bound(kind) {
            trace!(?kind, "Dropping event for unbound listener");
            return false;
        }

        match event {
            HostEvent::Scroll(metrics) => self.on_scroll(metrics),
            HostEvent::Intersection(entries) => self.on_intersection(&entries),
            HostEvent::Media(media_event) => self.on_media_event(media_event),
            HostEvent::Interaction => self.on_interaction(),
        }
        true
    }

    // ========================================
    // Navigation
    // ========================================

    /// Direct jump to a section: seek immediately, before the observer
    /// reports the section as active
    ///
    /// Returns false for unknown sections.
    pub fn navigate_to(&mut self, section_id: &str) -> bool {
        if !self.sections.contains(section_id) {
            debug!(section = %section_id, "Ignoring navigation to unknown section");
            return false;
        }
        self.controller.seek_to_section(section_id);
        true
    }

    /// `#section` fragment navigation
    ///
    /// Returns false when the link is left to the host: smooth scrolling is
    /// disabled, the fragment is empty, or no section matches. The observer
    /// still picks up the section once the host has scrolled to it.
    pub fn navigate_to_hash(&mut self, hash: &str) -> bool {
        if !self.smooth_scroll {
            trace!(hash = %hash, "Smooth scrolling disabled, leaving fragment to the host");
            return false;
        }
        let target = hash.trim().trim_start_matches('#');
        if target.is_empty() {
            return false;
        }
        self.navigate_to(target)
    }

    /// Confirmation the engine link needs before it is followed
    pub fn engine_leave_prompt(&self) -> Option<&'static str> {
        self.router.link().leave_prompt(&self.site_url, self.link_guard)
    }

    /// Follow the engine link
    ///
    /// `confirm` is asked only when the guard applies. Returns the URL to
    /// open, or None if the user declined.
    pub fn follow_engine_link<F>(&self, confirm: F) -> Option<String>
    where
        F: FnOnce(&str) -> bool,
    {
        let link = self.router.link();
        match link.leave_prompt(&self.site_url, self.link_guard) {
            Some(prompt) if !confirm(prompt) => {
                info!(href = %link.href, "Leaving the site declined");
                None
            }
            _ => Some(link.href),
        }
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn context(&self) -> &DoorwayContext {
        &self.ctx
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    pub fn controller(&self) -> &AudioPlaybackController<M> {
        &self.controller
    }

    /// Play/pause/stop/reload/loop buttons
    pub fn controller_mut(&mut self) -> &mut AudioPlaybackController<M> {
        &mut self.controller
    }

    pub fn observer(&self) -> &SectionObserver {
        &self.observer
    }

    pub fn progress(&self) -> f64 {
        self.progress.percent()
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn router(&self) -> &EngineRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut EngineRouter {
        &mut self.router
    }

    pub fn session(&self) -> &UserSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut UserSession<S> {
        &mut self.session
    }

    /// A user interaction has started playback
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn fallback_root(&self) -> bool {
        self.fallback_root
    }

    /// Page address outbound links are compared against
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot::capture(self)
    }

    // ========================================
    // Handlers
    // ========================================

    fn on_scroll(&mut self, metrics: ScrollMetrics) {
        let percent = self.progress.update(metrics);
        self.ctx.emit(JourneyEvent::ProgressChanged {
            percent,
            timestamp: Utc::now(),
        });
    }

    fn on_intersection(&mut self, entries: &[IntersectionEntry]) {
        let update = self.observer.handle_entries(entries);

        for section_id in update.newly_revealed {
            self.ctx.emit(JourneyEvent::SectionRevealed {
                section_id,
                timestamp: Utc::now(),
            });
        }

        if let Some(section_id) = update.activated {
            self.controller.on_active_section_changed(&section_id);
        }
    }

    fn on_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate => {
                self.controller.on_time_update();
            }
            MediaEvent::LoadedMetadata => self.controller.on_loaded_metadata(),
            MediaEvent::CanPlay => self.controller.on_can_play(),
            MediaEvent::Play => self.controller.on_media_play(),
            MediaEvent::Pause => self.controller.on_media_pause(),
            MediaEvent::Ended => self.controller.on_ended(),
            MediaEvent::Error => {
                self.controller.on_source_error();
            }
        }
    }

    /// First interaction retries playback; once it starts, stop listening
    fn on_interaction(&mut self) {
        if self.unlocked {
            return;
        }

        match self.controller.play() {
            PlayOutcome::Started => {
                self.unlocked = true;
                if let Some(subscription) = self.registry.subscription(ListenerKind::Interaction) {
                    self.registry.deregister(subscription);
                }
                info!("Audio unlocked by user interaction");
                self.ctx.emit(JourneyEvent::AudioUnlocked {
                    timestamp: Utc::now(),
                });
            }
            other => debug!(outcome = ?other, "Interaction did not unlock audio"),
        }
    }
}

impl<S: KeyValueStore> DoorwayPage<SimulatedMedia, S> {
    /// Host-side driver for the simulated element
    pub fn simulated_host(&mut self) -> SimulatedHost<'_> {
        self.controller.simulated_host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::SimulatedMedia;
    use doorway_common::config::EngineUrls;
    use doorway_common::events::PlaybackState;

    fn page_with(config: JourneyConfig) -> DoorwayPage<SimulatedMedia> {
        let ctx = DoorwayContext::default();
        let router = EngineRouter::new(ctx.clone(), EngineUrls::default(), None);
        let session = UserSession::in_memory(ctx.clone());
        DoorwayPage::new(ctx, &config, SimulatedMedia::new(64.0), router, session).unwrap()
    }

    fn page() -> DoorwayPage<SimulatedMedia> {
        page_with(JourneyConfig::default())
    }

    fn tall_page() -> ScrollMetrics {
        ScrollMetrics::new(0.0, 3200.0, 800.0)
    }

    #[test]
    fn test_events_before_mount_are_dropped() {
        let mut page = page();
        assert!(!page.dispatch(HostEvent::Scroll(ScrollMetrics::new(1200.0, 3200.0, 800.0))));
        assert_eq!(page.progress(), 0.0);
    }

    #[test]
    fn test_mount_binds_all_listeners_once() {
        let mut page = page();
        page.mount(HostCapabilities::default(), tall_page());
        page.mount(HostCapabilities::default(), tall_page());

        assert_eq!(page.registry().bound_count(), 4);
        assert!(page.is_mounted());
    }

    #[test]
    fn test_mount_computes_progress_eagerly() {
        let mut page = page();
        page.mount(HostCapabilities::default(), ScrollMetrics::new(2400.0, 3200.0, 800.0));
        assert_eq!(page.progress(), 100.0);
    }

    #[test]
    fn test_unmount_drops_later_events() {
        let mut page = page();
        page.mount(HostCapabilities::default(), tall_page());
        page.unmount();
        page.unmount();

        assert!(!page.is_mounted());
        assert!(!page.dispatch(HostEvent::Intersection(vec![IntersectionEntry::visible("glyph")])));
        assert_eq!(page.observer().active(), "threshold");
    }

    #[test]
    fn test_missing_root_sets_fallback() {
        let mut page = page();
        page.mount(
            HostCapabilities {
                intersection_observer: true,
                root_mount: false,
            },
            tall_page(),
        );
        assert!(page.fallback_root());
    }

    #[test]
    fn test_auto_unlock_disabled_skips_interaction_listener() {
        let mut config = JourneyConfig::default();
        config.flags.audio_auto_unlock = false;
        let mut page = page_with(config);
        page.mount(HostCapabilities::default(), tall_page());

        assert!(!page.registry().is_bound(ListenerKind::Interaction));
        assert!(!page.dispatch(HostEvent::Interaction));
    }

    #[test]
    fn test_blocked_interaction_keeps_listening() {
        let mut page = page();
        page.mount(HostCapabilities::default(), tall_page());

        assert!(page.dispatch(HostEvent::Interaction));
        assert!(!page.is_unlocked());
        assert!(page.registry().is_bound(ListenerKind::Interaction));
        assert_eq!(page.controller().state(), PlaybackState::Idle);
    }

    #[test]
    fn test_media_error_walks_sources() {
        let mut page = page();
        page.mount(HostCapabilities::default(), tall_page());
        page.dispatch(HostEvent::Media(MediaEvent::Error));

        assert_eq!(page.controller().sources().index(), 1);
        assert_eq!(page.controller().state(), PlaybackState::Loading);

        page.dispatch(HostEvent::Media(MediaEvent::CanPlay));
        assert_eq!(page.controller().state(), PlaybackState::Idle);
    }

    #[test]
    fn test_hash_navigation() {
        let mut page = page();
        assert!(page.navigate_to_hash("#glyph"));
        assert_eq!(page.controller().media().current_time(), 18.2);

        assert!(!page.navigate_to_hash("#"));
        assert!(!page.navigate_to_hash("#nowhere"));
        assert_eq!(page.controller().media().seeks, vec![18.2]);
    }

    #[test]
    fn test_hash_navigation_left_to_host_without_smooth_scroll() {
        let mut config = JourneyConfig::default();
        config.flags.smooth_scroll = false;
        let mut page = page_with(config);

        assert!(!page.navigate_to_hash("#glyph"));
        assert!(page.controller().media().seeks.is_empty());

        // Direct jumps are unaffected
        assert!(page.navigate_to("glyph"));
        assert_eq!(page.controller().media().seeks, vec![18.2]);
    }

    #[test]
    fn test_link_guard_disabled_never_asks() {
        let page = page();
        assert_eq!(page.engine_leave_prompt(), None);

        let href = page.follow_engine_link(|_| panic!("guard is off"));
        assert_eq!(href.as_deref(), Some(doorway_common::config::DEFAULT_ORION_URL));
    }

    #[test]
    fn test_link_guard_asks_before_leaving() {
        let mut config = JourneyConfig::default();
        config.flags.external_link_guard = true;
        let page = page_with(config);

        assert_eq!(
            page.engine_leave_prompt(),
            Some(crate::engine_router::LEAVING_SITE_PROMPT)
        );

        let mut asked = None;
        let declined = page.follow_engine_link(|prompt| {
            asked = Some(prompt.to_string());
            false
        });
        assert_eq!(declined, None);
        assert!(asked.unwrap().starts_with("You are leaving AsArchitect.com."));

        assert_eq!(
            page.follow_engine_link(|_| true).as_deref(),
            Some(doorway_common::config::DEFAULT_ORION_URL)
        );
    }

    #[test]
    fn test_link_guard_ignores_same_site_engine() {
        let mut config = JourneyConfig::default();
        config.flags.external_link_guard = true;
        config.site.url = "https://orion.example.com/doorway".to_string();

        let ctx = DoorwayContext::default();
        let urls = EngineUrls {
            orion: "https://orion.example.com/chat".to_string(),
            ..EngineUrls::default()
        };
        let router = EngineRouter::new(ctx.clone(), urls, None);
        let session = UserSession::in_memory(ctx.clone());
        let page =
            DoorwayPage::new(ctx, &config, SimulatedMedia::new(64.0), router, session).unwrap();

        assert_eq!(page.engine_leave_prompt(), None);
        assert_eq!(
            page.follow_engine_link(|_| false).as_deref(),
            Some("https://orion.example.com/chat")
        );
    }
}
