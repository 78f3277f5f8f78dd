// ABOUTME: Delay sources for the think and hold phases of an agent.
// ABOUTME: RandomPacer draws uniform delays; FixedPacer is deterministic for tests.

use std::time::Duration;

use rand::Rng;

use crate::config::DelayRange;
use crate::table::AgentId;

/// Decides how long an agent thinks and how long it holds resources.
pub trait Pacer: Send + Sync {
    /// Delay before the next request.
    fn think(&self, agent: AgentId) -> Duration;

    /// Delay between admission and release.
    fn hold(&self, agent: AgentId) -> Duration;
}

/// Uniformly random delays within configured ranges.
#[derive(Debug, Clone, Copy)]
pub struct RandomPacer {
    think: DelayRange,
    hold: DelayRange,
}

impl RandomPacer {
    pub fn new(think: DelayRange, hold: DelayRange) -> Self {
        Self { think, hold }
    }

    fn draw(range: &DelayRange) -> Duration {
        if range.min_ms >= range.max_ms {
            return range.min();
        }
        Duration::from_millis(rand::thread_rng().gen_range(range.min_ms..range.max_ms))
    }
}

impl Pacer for RandomPacer {
    fn think(&self, _agent: AgentId) -> Duration {
        Self::draw(&self.think)
    }

    fn hold(&self, _agent: AgentId) -> Duration {
        Self::draw(&self.hold)
    }
}

/// The same delays every cycle.
///
/// A zero delay makes the agent yield to the scheduler instead of sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPacer {
    think: Duration,
    hold: Duration,
}

impl FixedPacer {
    pub fn new(think: Duration, hold: Duration) -> Self {
        Self { think, hold }
    }

    /// No delays at all; every suspension is a bare yield.
    pub fn immediate() -> Self {
        Self::default()
    }
}

impl Pacer for FixedPacer {
    fn think(&self, _agent: AgentId) -> Duration {
        self.think
    }

    fn hold(&self, _agent: AgentId) -> Duration {
        self.hold
    }
}
