//! Section observer
//!
//! Decides which narrative section dominates the viewport from intersection
//! notifications delivered by the host. A section counts as active once at
//! least `threshold` of it is visible while intersecting. When several
//! entries cross in one batch the last one reported wins.
//!
//! Revealing is tracked separately: any intersecting entry reveals its
//! section, and a revealed section stays revealed.
//!
//! If the host has no intersection primitive the observer simply never
//! receives entries: the active section stays at the first section and
//! nothing is revealed.

use super::sections::SectionTable;
use tracing::{debug, trace};

/// Visible fraction required for a section to become active
pub const DEFAULT_ACTIVE_THRESHOLD: f64 = 0.6;

/// One intersection notification for one section region
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub section_id: String,
    pub is_intersecting: bool,
    /// Visible fraction of the region, 0.0-1.0
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    pub fn new(section_id: &str, is_intersecting: bool, intersection_ratio: f64) -> Self {
        Self {
            section_id: section_id.to_string(),
            is_intersecting,
            intersection_ratio,
        }
    }

    /// Entry for a section scrolled fully into view
    pub fn visible(section_id: &str) -> Self {
        Self::new(section_id, true, 1.0)
    }
}

/// Result of processing one batch of entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverUpdate {
    /// New active section, if it changed
    pub activated: Option<String>,
    /// Sections revealed for the first time by this batch
    pub newly_revealed: Vec<String>,
}

/// Tracks the active section and the revealed set
#[derive(Debug, Clone)]
pub struct SectionObserver {
    threshold: f64,
    known: Vec<String>,
    active: String,
    revealed: Vec<String>,
}

impl SectionObserver {
    /// Out-of-range thresholds fall back to the default
    pub fn new(table: &SectionTable, threshold: f64) -> Self {
        let threshold = if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
            threshold
        } else {
            DEFAULT_ACTIVE_THRESHOLD
        };

        Self {
            threshold,
            known: table.ids().map(str::to_string).collect(),
            active: table.first().id.clone(),
            revealed: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Currently active section id
    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn is_revealed(&self, section_id: &str) -> bool {
        self.revealed.iter().any(|id| id == section_id)
    }

    /// Revealed section ids in reveal order
    pub fn revealed(&self) -> &[String] {
        &self.revealed
    }

    /// Mark a section revealed; returns true only the first time
    pub fn reveal(&mut self, section_id: &str) -> bool {
        if self.is_revealed(section_id) {
            return false;
        }
        self.revealed.push(section_id.to_string());
        true
    }

    /// Process one batch of intersection entries in arrival order
    pub fn handle_entries(&mut self, entries: &[IntersectionEntry]) -> ObserverUpdate {
        let mut update = ObserverUpdate::default();
        let mut candidate: Option<&str> = None;

        for entry in entries {
            if !self.known.iter().any(|id| *id == entry.section_id) {
                debug!(section = %entry.section_id, "Ignoring intersection for unknown section");
                continue;
            }
            if !entry.is_intersecting {
                continue;
            }

            if self.reveal(&entry.section_id) {
                trace!(section = %entry.section_id, "Section revealed");
                update.newly_revealed.push(entry.section_id.clone());
            }

            if entry.intersection_ratio >= self.threshold {
                candidate = Some(entry.section_id.as_str());
            }
        }

        if let Some(id) = candidate {
            if id != self.active {
                debug!(from = %self.active, to = %id, "Active section changed");
                self.active = id.to_string();
                update.activated = Some(self.active.clone());
            }
        }

        update
    }
}
