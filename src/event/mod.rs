// ABOUTME: Phase transition events and the sinks that receive them.
// ABOUTME: Sinks run under the coordinator's mutex, so they must never block.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::table::{AgentId, Phase, PhaseTable};

/// A single phase change of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub timestamp: DateTime<Utc>,
    pub agent: AgentId,
    pub from: Phase,
    pub to: Phase,
}

impl TransitionEvent {
    /// Create an event stamped with the current time.
    pub fn now(agent: AgentId, from: Phase, to: Phase) -> Self {
        Self {
            timestamp: Utc::now(),
            agent,
            from,
            to,
        }
    }
}

/// Receiver of transition events.
///
/// `record` is called while the coordinator's mutex is held, once per
/// transition, in mutation order. Implementations must return promptly.
pub trait TransitionSink: Send + Sync {
    fn record(&self, event: &TransitionEvent);
}

/// Emits each transition as a structured tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TransitionSink for TracingSink {
    fn record(&self, event: &TransitionEvent) {
        tracing::info!(
            timestamp = %event.timestamp.to_rfc3339(),
            agent = event.agent,
            from = %event.from,
            to = %event.to,
            "phase transition"
        );
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TransitionEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, oldest first.
    pub fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().clone()
    }

    /// Events for a single agent, oldest first.
    pub fn events_for(&self, agent: AgentId) -> Vec<TransitionEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.agent == agent)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl TransitionSink for RecordingSink {
    fn record(&self, event: &TransitionEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Publishes events on a broadcast channel for live subscribers.
///
/// Slow subscribers lag and lose the oldest events rather than blocking the
/// coordinator.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: broadcast::Sender<TransitionEvent>,
}

impl ChannelSink {
    /// Create a sink whose channel buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.sender.subscribe()
    }
}

impl TransitionSink for ChannelSink {
    fn record(&self, event: &TransitionEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event.clone());
    }
}

/// Rebuilds the phase table from events and checks adjacency after each one.
///
/// Because events arrive under the coordinator's mutex, the mirror sees every
/// intermediate state the real table passes through.
#[derive(Debug)]
pub struct AdjacencyProbe {
    state: Mutex<ProbeState>,
}

#[derive(Debug)]
struct ProbeState {
    mirror: PhaseTable,
    transitions: u64,
    violations: u64,
    max_holding: usize,
}

impl AdjacencyProbe {
    /// Create a probe for a table of `agents` seats.
    pub fn new(agents: usize) -> Self {
        Self {
            state: Mutex::new(ProbeState {
                mirror: PhaseTable::new(agents),
                transitions: 0,
                violations: 0,
                max_holding: 0,
            }),
        }
    }

    /// Number of events observed.
    pub fn transitions(&self) -> u64 {
        self.state.lock().transitions
    }

    /// Number of events after which two adjacent seats were both holding, plus
    /// events for seats outside the mirrored table.
    pub fn violations(&self) -> u64 {
        self.state.lock().violations
    }

    /// Most seats ever holding at once.
    pub fn max_holding(&self) -> usize {
        self.state.lock().max_holding
    }
}

impl TransitionSink for AdjacencyProbe {
    fn record(&self, event: &TransitionEvent) {
        let mut state = self.state.lock();
        state.transitions += 1;
        if event.agent >= state.mirror.len() {
            state.violations += 1;
            tracing::error!(
                agent = event.agent,
                seats = state.mirror.len(),
                "transition for a seat outside the mirrored table"
            );
            return;
        }
        state.mirror.set(event.agent, event.to);
        if !state.mirror.is_consistent() {
            state.violations += 1;
            tracing::error!(agent = event.agent, "adjacent agents holding at once");
        }
        let holding = state
            .mirror
            .as_slice()
            .iter()
            .filter(|p| **p == Phase::Holding)
            .count();
        state.max_holding = state.max_holding.max(holding);
    }
}

/// Delivers each event to several sinks in order.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Arc<dyn TransitionSink>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn with(mut self, sink: Arc<dyn TransitionSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl TransitionSink for FanOut {
    fn record(&self, event: &TransitionEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

#[cfg(test)]
mod event_test;
