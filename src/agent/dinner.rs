// ABOUTME: Runs a full table - one tokio task per agent sharing one Coordinator.
// ABOUTME: A single cancellation token stops every agent; join collects their reports.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::pacer::{Pacer, RandomPacer};
use super::runner::{Agent, AgentOutcome, AgentReport};
use crate::config::DinnerConfig;
use crate::error::DinnerError;
use crate::event::{TracingSink, TransitionSink};
use crate::table::Coordinator;

/// Results of a finished dinner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinnerSummary {
    /// One report per agent, ordered by seat.
    pub reports: Vec<AgentReport>,
    pub total_meals: u64,
}

impl DinnerSummary {
    fn from_reports(reports: Vec<AgentReport>) -> Self {
        let total_meals = reports.iter().map(|r| r.meals).sum();
        Self {
            reports,
            total_meals,
        }
    }

    /// True if every agent ate its full meal budget.
    pub fn all_completed(&self) -> bool {
        self.reports
            .iter()
            .all(|r| r.outcome == AgentOutcome::Completed)
    }
}

/// A running table of agents.
///
/// Must be started from within a tokio runtime.
pub struct Dinner {
    coordinator: Arc<Coordinator>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<Result<AgentReport, DinnerError>>>,
}

impl Dinner {
    /// Start a dinner with random delays and tracing output.
    pub fn start(config: &DinnerConfig) -> Result<Self, DinnerError> {
        let pacer = Arc::new(RandomPacer::new(config.think, config.hold));
        Self::start_with(config, Arc::new(TracingSink), pacer)
    }

    /// Start a dinner with a custom event sink and pacer.
    pub fn start_with(
        config: &DinnerConfig,
        sink: Arc<dyn TransitionSink>,
        pacer: Arc<dyn Pacer>,
    ) -> Result<Self, DinnerError> {
        config.validate()?;

        let coordinator = Arc::new(Coordinator::with_sink(config.agents, sink)?);
        let cancel = CancellationToken::new();

        let tasks = (0..config.agents)
            .map(|id| {
                let mut agent = Agent::new(id, coordinator.clone(), pacer.clone());
                if let Some(cycles) = config.cycles {
                    agent = agent.cycles(cycles);
                }
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    let result = agent.run(cancel.clone()).await;
                    if let Err(e) = &result {
                        // One broken agent stops the whole table.
                        tracing::error!(agent = id, error = %e, "agent failed");
                        cancel.cancel();
                    }
                    result
                })
            })
            .collect();

        tracing::info!(
            agents = config.agents,
            cycles = ?config.cycles,
            "dinner started"
        );

        Ok(Self {
            coordinator,
            cancel,
            tasks,
        })
    }

    /// The coordinator shared by every agent.
    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// A token that cancels this dinner when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Ask every agent to leave. Agents holding resources release them first.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for every agent to finish.
    ///
    /// Returns the first agent error, if any.
    pub async fn join(self) -> Result<DinnerSummary, DinnerError> {
        let results = futures::future::join_all(self.tasks).await;

        let mut reports = Vec::with_capacity(results.len());
        for result in results {
            reports.push(result??);
        }

        let summary = DinnerSummary::from_reports(reports);
        tracing::info!(total_meals = summary.total_meals, "dinner finished");
        Ok(summary)
    }
}
