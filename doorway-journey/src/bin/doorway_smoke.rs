//! Doorway smoke harness
//!
//! Drives one doorway page end to end against a simulated media element:
//! mount, settle the audio source (walking the fallback chain for sources
//! marked as failing), optionally unlock audio with a user gesture, scroll
//! through every section, then print the rendered page snapshot as JSON.
//!
//! Every journey event is logged through `tracing` while the script runs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use doorway_common::config::DeployConfig;
use doorway_common::events::PlaybackState;
use doorway_common::BuildInfo;
use doorway_journey::config::{session_store_path, JourneyConfig};
use doorway_journey::engine_router::EngineRouter;
use doorway_journey::journey::{
    HostCapabilities, HostEvent, IntersectionEntry, MediaEvent, ScrollMetrics, SimulatedMedia,
};
use doorway_journey::session::{FileStore, KeyValueStore, MemoryStore, UserSession};
use doorway_journey::{DoorwayContext, DoorwayPage};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated viewport height in pixels
const VIEWPORT_HEIGHT: f64 = 800.0;

/// Seconds of playback simulated while each section is on screen
const DWELL_SECONDS: f64 = 1.5;

/// Command-line arguments for doorway-smoke
#[derive(Parser, Debug)]
#[command(name = "doorway-smoke")]
#[command(about = "Scripted smoke run of the doorway journey")]
#[command(version)]
struct Args {
    /// Journey config (sections, audio sources, loop mode, flags)
    #[arg(short, long, env = "DOORWAY_JOURNEY_CONFIG")]
    config: Option<PathBuf>,

    /// Deploy config (engine URLs, build stamp)
    #[arg(short, long, env = "DOORWAY_DEPLOY_CONFIG")]
    deploy_config: Option<PathBuf>,

    /// Preset engine, as if the page was opened with `?engine=<key>`
    #[arg(short, long)]
    engine: Option<String>,

    /// Session store file
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Keep the session in memory only
    #[arg(long)]
    no_store: bool,

    /// Set the session display name
    #[arg(long)]
    name: Option<String>,

    /// Simulate a user gesture before scrolling (unlocks audio)
    #[arg(short, long)]
    gesture: bool,

    /// Mark a source URL (prefix) as failing to load; repeatable
    #[arg(long = "fail-source")]
    fail_sources: Vec<String>,

    /// Simulate a host without intersection observation
    #[arg(long)]
    no_intersection: bool,

    /// Simulated track duration in seconds
    #[arg(long, default_value = "64.0")]
    duration: f64,
}

/// Session store chosen at startup
enum SmokeStore {
    File(FileStore),
    Memory(MemoryStore),
}

impl KeyValueStore for SmokeStore {
    fn get(&self, key: &str) -> doorway_journey::Result<Option<String>> {
        match self {
            SmokeStore::File(store) => store.get(key),
            SmokeStore::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> doorway_journey::Result<()> {
        match self {
            SmokeStore::File(store) => store.set(key, value),
            SmokeStore::Memory(store) => store.set(key, value),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doorway_journey=debug,doorway_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let deploy = DeployConfig::load(args.deploy_config.as_deref())
        .context("Failed to load deploy config")?;
    let journey = JourneyConfig::load(args.config.as_deref())
        .context("Failed to load journey config")?;

    let build = BuildInfo::compiled().with_stamp_override(deploy.build_stamp.as_deref());
    info!("Starting doorway smoke run ({})", build.describe());

    let ctx = DoorwayContext::new(build);
    let logger = spawn_event_logger(&ctx);

    let store = if args.no_store {
        SmokeStore::Memory(MemoryStore::new())
    } else {
        match session_store_path(args.store.as_deref()) {
            Some(path) => {
                info!("Session store: {}", path.display());
                SmokeStore::File(FileStore::new(path))
            }
            None => SmokeStore::Memory(MemoryStore::new()),
        }
    };

    let query = args.engine.as_ref().map(|key| format!("engine={}", key));
    let router = EngineRouter::new(ctx.clone(), deploy.engines.clone(), query.as_deref());
    let session = UserSession::new(ctx.clone(), store);

    let mut media = SimulatedMedia::new(args.duration);
    for prefix in &args.fail_sources {
        media.fail_source(prefix);
    }

    let mut page = DoorwayPage::new(ctx.clone(), &journey, media, router, session)
        .context("Failed to build doorway page")?;

    run_script(&mut page, &args);

    let snapshot = page.snapshot();
    info!("Status: {}", snapshot.status_line());
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?
    );

    page.unmount();
    drop(page);
    drop(ctx);

    let events = logger.await.context("Event logger task failed")?;
    info!("Smoke run complete, {} events observed", events);
    Ok(())
}

/// Log every journey event until the bus closes; returns how many were seen
fn spawn_event_logger(ctx: &DoorwayContext) -> tokio::task::JoinHandle<usize> {
    let mut rx = ctx.events.subscribe();
    tokio::spawn(async move {
        let mut seen = 0;
        loop {
            match rx.recv().await {
                Ok(event) => {
                    seen += 1;
                    match serde_json::to_string(&event) {
                        Ok(json) => debug!(event = event.event_type(), "{}", json),
                        Err(e) => warn!(event = event.event_type(), "Unserializable event: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event logger lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    })
}

fn run_script<S: KeyValueStore>(page: &mut DoorwayPage<SimulatedMedia, S>, args: &Args) {
    let section_ids: Vec<String> = page.sections().ids().map(str::to_string).collect();
    let page_height = VIEWPORT_HEIGHT * section_ids.len() as f64;

    page.mount(
        HostCapabilities {
            intersection_observer: !args.no_intersection,
            root_mount: true,
        },
        ScrollMetrics::new(0.0, page_height, VIEWPORT_HEIGHT),
    );

    settle_source(page);

    if let Some(name) = &args.name {
        page.session_mut().set_name(name);
    }

    if args.gesture {
        page.simulated_host().grant_gesture();
        page.dispatch(HostEvent::Interaction);
    }

    for (index, id) in section_ids.iter().enumerate() {
        let scroll_top = VIEWPORT_HEIGHT * index as f64;
        page.dispatch(HostEvent::Scroll(ScrollMetrics::new(
            scroll_top,
            page_height,
            VIEWPORT_HEIGHT,
        )));
        page.dispatch(HostEvent::Intersection(vec![IntersectionEntry::visible(id)]));

        page.simulated_host().advance(DWELL_SECONDS);
        page.dispatch(HostEvent::Media(MediaEvent::TimeUpdate));

        let snapshot = page.snapshot();
        info!(
            section = %id,
            active = %snapshot.active_section,
            progress = snapshot.progress_percent,
            "{}",
            snapshot.status_line()
        );
    }
}

/// Deliver load errors until a working source is selected or the chain is
/// exhausted, then the metadata/canplay pair for the winner
fn settle_source<S: KeyValueStore>(page: &mut DoorwayPage<SimulatedMedia, S>) {
    while page.controller().media().source_is_broken() {
        page.dispatch(HostEvent::Media(MediaEvent::Error));
        if page.controller().state() == PlaybackState::Error {
            warn!("Every audio source failed");
            return;
        }
    }

    page.dispatch(HostEvent::Media(MediaEvent::LoadedMetadata));
    page.dispatch(HostEvent::Media(MediaEvent::CanPlay));
}
