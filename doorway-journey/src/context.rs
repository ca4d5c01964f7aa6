//! Page context
//!
//! Created once at page load and handed to each component that needs it at
//! construction time. Dropped with the page.

use doorway_common::events::{EventBus, JourneyEvent};
use doorway_common::BuildInfo;

/// Default event buffer for a single page
const EVENT_CAPACITY: usize = 256;

/// Build stamp plus event bus shared by the page's components
#[derive(Debug, Clone)]
pub struct DoorwayContext {
    pub build: BuildInfo,
    pub events: EventBus,
}

impl DoorwayContext {
    pub fn new(build: BuildInfo) -> Self {
        Self {
            build,
            events: EventBus::new(EVENT_CAPACITY),
        }
    }

    /// Broadcast an event; no listeners is fine
    pub fn emit(&self, event: JourneyEvent) {
        self.events.emit_lossy(event);
    }
}

impl Default for DoorwayContext {
    fn default() -> Self {
        Self::new(BuildInfo::compiled())
    }
}
