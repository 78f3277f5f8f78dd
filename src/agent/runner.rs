// ABOUTME: The agent loop - think, request, hold, release - until done or cancelled.
// ABOUTME: Cancellation is observed at every suspension point and always leaves the table clean.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::pacer::Pacer;
use crate::error::DinnerError;
use crate::table::{AgentId, Coordinator};

/// How an agent's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentOutcome {
    /// Ate the configured number of meals.
    Completed,
    /// Stopped by cancellation.
    Cancelled,
}

impl std::fmt::Display for AgentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentOutcome::Completed => write!(f, "completed"),
            AgentOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What one agent did during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReport {
    pub agent: AgentId,
    /// Completed hold phases. A hold cut short by cancellation is not counted.
    pub meals: u64,
    pub outcome: AgentOutcome,
}

/// One agent seated at the table.
pub struct Agent {
    id: AgentId,
    coordinator: Arc<Coordinator>,
    pacer: Arc<dyn Pacer>,
    cycles: Option<u64>,
}

impl Agent {
    /// Create an agent that runs until cancelled.
    pub fn new(id: AgentId, coordinator: Arc<Coordinator>, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            id,
            coordinator,
            pacer,
            cycles: None,
        }
    }

    /// Stop after `cycles` meals.
    pub fn cycles(mut self, cycles: u64) -> Self {
        self.cycles = Some(cycles);
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Run the loop until the meal budget is spent or `cancel` fires.
    ///
    /// Cancellation while holding releases the resources before returning.
    /// Coordinator errors other than cancellation are returned as-is.
    pub async fn run(self, cancel: CancellationToken) -> Result<AgentReport, DinnerError> {
        tracing::debug!(agent = self.id, cycles = ?self.cycles, "agent seated");

        let mut meals = 0;
        let outcome = loop {
            if self.cycles.is_some_and(|max| meals >= max) {
                break AgentOutcome::Completed;
            }

            if !pause(self.pacer.think(self.id), &cancel).await {
                break AgentOutcome::Cancelled;
            }

            match self
                .coordinator
                .request_with_cancel(self.id, cancel.cancelled())
                .await
            {
                Ok(()) => {}
                Err(DinnerError::Cancelled) => break AgentOutcome::Cancelled,
                Err(e) => return Err(e),
            }

            let finished = pause(self.pacer.hold(self.id), &cancel).await;
            self.coordinator.release(self.id)?;
            if !finished {
                break AgentOutcome::Cancelled;
            }
            meals += 1;
        };

        tracing::debug!(agent = self.id, meals, %outcome, "agent left the table");

        Ok(AgentReport {
            agent: self.id,
            meals,
            outcome,
        })
    }
}

/// Wait for `delay` unless cancelled first. Returns false on cancellation.
async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = sleep_or_yield(delay) => true,
    }
}

async fn sleep_or_yield(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
