//! Journey scenario tests
//!
//! End-to-end runs of the page against SimulatedMedia: cue seeking while
//! scrolling, final-section autoplay, source fallback, soft looping and the
//! ended failsafe.

mod helpers;

use doorway_common::events::{JourneyEvent, LoopMode, PlaybackState};
use doorway_journey::journey::{HostEvent, IntersectionEntry, MediaElement, MediaEvent};
use helpers::{drain_events, enter_section, PageBuilder, TEST_SOURCES};

#[test]
fn test_scrolling_seeks_each_cue_and_autoplays_at_passage() {
    let (mut page, _rx) = PageBuilder::new().with_gesture().mount();

    enter_section(&mut page, "breath");
    assert_eq!(page.controller().media().current_time(), 7.5);
    assert_eq!(page.controller().state(), PlaybackState::Idle);

    enter_section(&mut page, "glyph");
    assert_eq!(page.controller().media().current_time(), 18.2);
    assert_eq!(page.controller().state(), PlaybackState::Idle);
    assert_eq!(page.controller().media().play_requests, 0);

    enter_section(&mut page, "passage");
    assert_eq!(page.controller().media().current_time(), 32.0);
    assert_eq!(page.controller().state(), PlaybackState::Playing);
    assert_eq!(page.controller().media().play_requests, 1);

    assert_eq!(page.controller().media().seeks, vec![7.5, 18.2, 32.0]);
}

#[test]
fn test_blocked_autoplay_at_passage_is_silent() {
    let (mut page, _rx) = PageBuilder::new().mount();

    enter_section(&mut page, "passage");
    assert_eq!(page.controller().state(), PlaybackState::Idle);
    assert_eq!(page.controller().error_message(), None);
}

#[test]
fn test_returning_to_threshold_parks_playback() {
    let (mut page, _rx) = PageBuilder::new().with_gesture().mount();
    enter_section(&mut page, "passage");
    page.simulated_host().advance(3.0);

    enter_section(&mut page, "threshold");
    assert_eq!(page.controller().state(), PlaybackState::Paused);
    assert!(page.controller().media().is_paused());
    assert_eq!(page.controller().media().current_time(), 0.0);
}

#[test]
fn test_activation_events_carry_cues() {
    let (mut page, mut rx) = PageBuilder::new().mount();
    enter_section(&mut page, "glyph");

    let activated: Vec<(String, Option<f64>)> = drain_events(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            JourneyEvent::SectionActivated {
                section_id,
                cue_seconds,
                ..
            } => Some((section_id, cue_seconds)),
            _ => None,
        })
        .collect();
    assert_eq!(activated, vec![("glyph".to_string(), Some(18.2))]);
}

#[test]
fn test_below_threshold_reveals_without_activating() {
    let (mut page, _rx) = PageBuilder::new().mount();
    page.dispatch(HostEvent::Intersection(vec![IntersectionEntry::new(
        "breath", true, 0.3,
    )]));

    assert!(page.observer().is_revealed("breath"));
    assert_eq!(page.observer().active(), "threshold");
    assert!(page.controller().media().seeks.is_empty());
}

#[test]
fn test_source_fallback_ends_in_error_on_tertiary() {
    let (mut page, mut rx) = PageBuilder::new()
        .failing_source(TEST_SOURCES[0])
        .failing_source(TEST_SOURCES[1])
        .failing_source(TEST_SOURCES[2])
        .mount();

    assert!(page.controller().media().source().starts_with(TEST_SOURCES[0]));

    page.dispatch(HostEvent::Media(MediaEvent::Error));
    assert_eq!(page.controller().media().source(), TEST_SOURCES[1]);
    assert_eq!(page.controller().state(), PlaybackState::Loading);

    page.dispatch(HostEvent::Media(MediaEvent::Error));
    assert_eq!(page.controller().media().source(), TEST_SOURCES[2]);

    page.dispatch(HostEvent::Media(MediaEvent::Error));
    assert_eq!(page.controller().media().source(), TEST_SOURCES[2]);
    assert_eq!(page.controller().state(), PlaybackState::Error);

    let message = page.controller().error_message().unwrap();
    for source in TEST_SOURCES {
        assert!(message.contains(source), "{} missing from {}", source, message);
    }

    // Already on the last resort: nothing moves
    page.dispatch(HostEvent::Media(MediaEvent::Error));
    assert_eq!(page.controller().sources().index(), 2);

    let exhausted = drain_events(&mut rx)
        .iter()
        .filter(|e| e.event_type() == "SourcesExhausted")
        .count();
    assert_eq!(exhausted, 2);
}

#[test]
fn test_reload_after_exhaustion_recovers() {
    let (mut page, _rx) = PageBuilder::new().with_gesture().mount();
    for _ in 0..3 {
        page.dispatch(HostEvent::Media(MediaEvent::Error));
    }
    assert_eq!(page.controller().state(), PlaybackState::Error);

    let url = page.controller_mut().reload();
    assert!(url.starts_with(&format!("{}?v=", TEST_SOURCES[0])));

    page.dispatch(HostEvent::Media(MediaEvent::CanPlay));
    assert_eq!(page.controller().state(), PlaybackState::Idle);
    assert!(page.controller_mut().play().is_started());
}

#[test]
fn test_soft_loop_wraps_before_segment_end() {
    let (mut page, _rx) = PageBuilder::new()
        .with_gesture()
        .loop_mode(LoopMode::soft(5.0, 10.0))
        .mount();
    assert!(!page.controller().media().is_loop());
    assert!(page.controller_mut().play().is_started());
    let plays_before = page.controller().media().play_requests;

    page.simulated_host().set_playhead(9.5);
    page.dispatch(HostEvent::Media(MediaEvent::TimeUpdate));
    assert_eq!(page.controller().media().current_time(), 9.5);

    page.simulated_host().set_playhead(9.99);
    page.dispatch(HostEvent::Media(MediaEvent::TimeUpdate));
    assert_eq!(page.controller().media().current_time(), 5.0);
    assert_eq!(page.controller().telemetry().current_seconds, 5.0);
    assert_eq!(page.controller().media().play_requests, plays_before + 1);
}

#[test]
fn test_native_loop_disables_soft_wrap() {
    let (mut page, _rx) = PageBuilder::new()
        .with_gesture()
        .loop_mode(LoopMode::soft(5.0, 10.0))
        .mount();
    page.controller_mut().set_loop_mode(LoopMode::Native);
    assert!(page.controller().media().is_loop());

    page.simulated_host().set_playhead(9.99);
    page.dispatch(HostEvent::Media(MediaEvent::TimeUpdate));
    assert_eq!(page.controller().media().current_time(), 9.99);
}

#[test]
fn test_ended_without_loop_restarts_from_zero() {
    let (mut page, _rx) = PageBuilder::new()
        .with_gesture()
        .loop_mode(LoopMode::Off)
        .mount();
    enter_section(&mut page, "passage");
    page.simulated_host().finish();

    page.dispatch(HostEvent::Media(MediaEvent::Ended));
    assert_eq!(page.controller().state(), PlaybackState::Playing);
    assert_eq!(page.controller().media().current_time(), 0.0);
}

#[test]
fn test_native_controls_sync_state() {
    let (mut page, _rx) = PageBuilder::new().mount();
    page.dispatch(HostEvent::Media(MediaEvent::Play));
    assert_eq!(page.controller().state(), PlaybackState::Playing);

    page.dispatch(HostEvent::Media(MediaEvent::Pause));
    assert_eq!(page.controller().state(), PlaybackState::Paused);
}
