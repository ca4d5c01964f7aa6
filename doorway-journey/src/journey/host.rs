//! Host event plumbing
//!
//! Host notifications (scroll, intersection, media element events, user
//! interaction) arrive as `HostEvent`s. A component only receives a kind of
//! event while it holds a live `Subscription` for it. Registration is
//! idempotent: binding an already-bound kind hands back the existing
//! subscription, so re-initialising never double-binds. Deregistration is
//! idempotent too, and events for unbound kinds are dropped.

use super::observer::IntersectionEntry;
use super::progress::ScrollMetrics;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Kinds of host listener a page can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerKind {
    Scroll,
    Intersection,
    Media,
    Interaction,
}

/// Media element notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    TimeUpdate,
    LoadedMetadata,
    CanPlay,
    Play,
    Pause,
    Ended,
    Error,
}

/// One notification from the host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Scroll(ScrollMetrics),
    Intersection(Vec<IntersectionEntry>),
    Media(MediaEvent),
    /// Pointer or key interaction anywhere on the page
    Interaction,
}

impl HostEvent {
    pub fn kind(&self) -> ListenerKind {
        match self {
            HostEvent::Scroll(_) => ListenerKind::Scroll,
            HostEvent::Intersection(_) => ListenerKind::Intersection,
            HostEvent::Media(_) => ListenerKind::Media,
            HostEvent::Interaction => ListenerKind::Interaction,
        }
    }
}

/// What the host platform can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Viewport intersection notifications are available
    pub intersection_observer: bool,
    /// The page's root mount point exists
    pub root_mount: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            root_mount: true,
        }
    }
}

/// Handle returned by `ListenerRegistry::register`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: ListenerKind,
    id: u64,
}

impl Subscription {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

/// At most one live subscription per listener kind
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    bound: HashMap<ListenerKind, Subscription>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `kind`, or return the existing binding
    pub fn register(&mut self, kind: ListenerKind) -> Subscription {
        if let Some(existing) = self.bound.get(&kind) {
            trace!(?kind, "Listener already bound");
            return *existing;
        }

        self.next_id += 1;
        let subscription = Subscription {
            kind,
            id: self.next_id,
        };
        self.bound.insert(kind, subscription);
        debug!(?kind, id = subscription.id, "Listener registered");
        subscription
    }

    /// Release a subscription; stale or repeated handles are ignored
    ///
    /// Returns true if the subscription was live.
    pub fn deregister(&mut self, subscription: Subscription) -> bool {
        match self.bound.get(&subscription.kind) {
            Some(live) if *live == subscription => {
                self.bound.remove(&subscription.kind);
                debug!(kind = ?subscription.kind, id = subscription.id, "Listener deregistered");
                true
            }
            _ => false,
        }
    }

    pub fn is_bound(&self, kind: ListenerKind) -> bool {
        self.bound.contains_key(&kind)
    }

    pub fn subscription(&self, kind: ListenerKind) -> Option<Subscription> {
        self.bound.get(&kind).copied()
    }

    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    /// Drop every live subscription; returns how many were released
    pub fn clear(&mut self) -> usize {
        let released = self.bound.len();
        self.bound.clear();
        if released > 0 {
            debug!(released, "All listeners deregistered");
        }
        released
    }
}
