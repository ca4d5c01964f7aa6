//! Narrative sections and the cue table derived from them
//!
//! Section order defines both the visual stacking order and the set of
//! direct-navigation targets. The first section is the resting position of
//! the experience; the last one starts playback when reached.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One narrative section of the doorway page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub note: String,
    /// Track position for this section; non-finite means "no cue"
    pub cue_seconds: f64,
    #[serde(default)]
    pub has_glyph: bool,
}

impl NarrativeSection {
    pub fn new(id: &str, title: &str, note: &str, cue_seconds: f64, has_glyph: bool) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            note: note.to_string(),
            cue_seconds,
            has_glyph,
        }
    }
}

/// The doorway's built-in journey
pub fn default_sections() -> Vec<NarrativeSection> {
    vec![
        NarrativeSection::new(
            "threshold",
            "The Threshold",
            "Stand still. The doorway is already open.",
            0.0,
            false,
        ),
        NarrativeSection::new(
            "breath",
            "Breath",
            "Let the first tone settle before moving on.",
            7.5,
            false,
        ),
        NarrativeSection::new(
            "glyph",
            "The Glyph",
            "A mark that only resolves when you stop looking for it.",
            18.2,
            true,
        ),
        NarrativeSection::new(
            "passage",
            "Passage",
            "Step through. The architect is waiting.",
            32.0,
            false,
        ),
    ]
}

/// Validated, ordered section sequence
#[derive(Debug, Clone)]
pub struct SectionTable {
    sections: Vec<NarrativeSection>,
}

impl SectionTable {
    /// Validate ids: non-empty table, no blank ids, no duplicates
    pub fn new(sections: Vec<NarrativeSection>) -> Result<Self> {
        if sections.is_empty() {
            return Err(Error::InvalidSections("at least one section is required".to_string()));
        }

        let mut seen = HashSet::new();
        for section in &sections {
            if section.id.trim().is_empty() {
                return Err(Error::InvalidSections("section id must not be blank".to_string()));
            }
            if !seen.insert(section.id.as_str()) {
                return Err(Error::InvalidSections(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
        }

        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[NarrativeSection] {
        &self.sections
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&NarrativeSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Resting section (initial active section)
    pub fn first(&self) -> &NarrativeSection {
        &self.sections[0]
    }

    /// Section that starts playback when entered
    pub fn last(&self) -> &NarrativeSection {
        &self.sections[self.sections.len() - 1]
    }

    /// Derive the cue table
    pub fn cue_table(&self) -> CueTable {
        CueTable::from_sections(&self.sections)
    }
}

/// Immutable `section id → cue seconds` mapping
///
/// A cue of `0.0` is a real cue. Absence (unknown id or non-finite value)
/// is reported as `None`, never as zero.
#[derive(Debug, Clone, Default)]
pub struct CueTable {
    cues: HashMap<String, f64>,
}

impl CueTable {
    pub fn from_sections(sections: &[NarrativeSection]) -> Self {
        let cues = sections
            .iter()
            .filter(|s| s.cue_seconds.is_finite())
            .map(|s| (s.id.clone(), s.cue_seconds))
            .collect();
        Self { cues }
    }

    /// Cue point for `section_id`, if configured and finite
    pub fn cue(&self, section_id: &str) -> Option<f64> {
        self.cues.get(section_id).copied()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
