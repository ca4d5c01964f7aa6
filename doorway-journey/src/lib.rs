//! # Doorway Journey Library (doorway-journey)
//!
//! Scroll-driven narrative journey with a synchronized background track.
//!
//! **Purpose:** Observe which narrative section dominates the viewport, seek the
//! track to that section's cue point, manage play/pause/loop state across
//! native and soft (segment) looping, and fall back across audio sources when
//! one fails to load.
//!
//! **Architecture:** Host primitives (media element, scroll/intersection
//! notifications, key-value storage) sit behind traits so the journey logic
//! runs single-threaded against either a real host binding or the in-memory
//! simulation used by the smoke harness and tests.
//!
//! Peripheral components (engine link router, user session) are independent of
//! the audio core and share only the page context.

pub mod config;
pub mod context;
pub mod engine_router;
pub mod error;
pub mod journey;
pub mod page;
pub mod session;
pub mod view;

pub use context::DoorwayContext;
pub use error::{Error, Result};
pub use page::DoorwayPage;
