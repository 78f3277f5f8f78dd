// ABOUTME: Tests for transition events and the provided sinks.
// ABOUTME: Covers recording, broadcasting, fan-out, and serialization.

use std::sync::Arc;

use super::*;

#[test]
fn test_recording_sink_keeps_order() {
    let sink = RecordingSink::new();
    assert!(sink.is_empty());

    sink.record(&TransitionEvent::now(0, Phase::Idle, Phase::Hungry));
    sink.record(&TransitionEvent::now(1, Phase::Idle, Phase::Hungry));
    sink.record(&TransitionEvent::now(0, Phase::Hungry, Phase::Holding));

    assert_eq!(sink.len(), 3);
    let for_zero = sink.events_for(0);
    assert_eq!(for_zero.len(), 2);
    assert_eq!(for_zero[0].to, Phase::Hungry);
    assert_eq!(for_zero[1].to, Phase::Holding);
}

#[tokio::test]
async fn test_channel_sink_delivers_to_subscriber() {
    let sink = ChannelSink::new(16);
    let mut rx = sink.subscribe();

    sink.record(&TransitionEvent::now(3, Phase::Holding, Phase::Idle));

    let event = rx.recv().await.unwrap();
    assert_eq!(event.agent, 3);
    assert_eq!(event.from, Phase::Holding);
    assert_eq!(event.to, Phase::Idle);
}

#[test]
fn test_channel_sink_without_subscribers_is_silent() {
    let sink = ChannelSink::new(4);
    // Should not panic
    sink.record(&TransitionEvent::now(0, Phase::Idle, Phase::Hungry));
}

#[test]
fn test_fan_out_reaches_every_sink() {
    let first = Arc::new(RecordingSink::new());
    let second = Arc::new(RecordingSink::new());
    let fan = FanOut::new().with(first.clone()).with(second.clone());

    fan.record(&TransitionEvent::now(1, Phase::Idle, Phase::Hungry));

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}

#[test]
fn test_event_serializes_lowercase_phases() {
    let event = TransitionEvent::now(2, Phase::Hungry, Phase::Holding);
    let json = serde_json::to_value(&event).unwrap();

    assert_eq!(json["agent"], 2);
    assert_eq!(json["from"], "hungry");
    assert_eq!(json["to"], "holding");
    assert!(json["timestamp"].is_string());
}

#[test]
fn test_adjacency_probe_counts_violations() {
    let probe = AdjacencyProbe::new(5);

    probe.record(&TransitionEvent::now(0, Phase::Hungry, Phase::Holding));
    probe.record(&TransitionEvent::now(2, Phase::Hungry, Phase::Holding));
    assert_eq!(probe.violations(), 0);
    assert_eq!(probe.max_holding(), 2);

    probe.record(&TransitionEvent::now(1, Phase::Hungry, Phase::Holding));
    assert_eq!(probe.violations(), 1);
    assert_eq!(probe.transitions(), 3);
}

#[test]
fn test_adjacency_check_flags_seat_outside_table() {
    let checker = AdjacencyProbe::new(3);

    checker.record(&TransitionEvent::now(4, Phase::Hungry, Phase::Holding));

    assert_eq!(checker.transitions(), 1);
    assert_eq!(checker.violations(), 1);
    assert_eq!(checker.max_holding(), 0);
}

#[test]
fn test_undersized_checker_behind_coordinator_does_not_panic() {
    let checker = Arc::new(AdjacencyProbe::new(2));
    let coordinator = crate::table::Coordinator::with_sink(5, checker.clone()).unwrap();

    let mut request = tokio_test::task::spawn(coordinator.request(4));
    tokio_test::assert_ready_ok!(request.poll());
    drop(request);
    coordinator.release(4).unwrap();

    assert_eq!(checker.transitions(), 3);
    assert_eq!(checker.violations(), 3);
}
