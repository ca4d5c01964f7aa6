//! Test helper modules for doorway-journey integration tests
//!
//! Provides reusable test infrastructure components:
//! - PageBuilder: wire a DoorwayPage against SimulatedMedia
//! - Event collection from the page's EventBus

#![allow(dead_code)]

pub mod page_builder;

pub use page_builder::{drain_events, enter_section, tall_viewport, PageBuilder, TEST_SOURCES};
