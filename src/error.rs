// ABOUTME: Defines the error type for the dinner library using thiserror.
// ABOUTME: Covers bad agent ids, protocol misuse, cancellation, and config errors.

use crate::table::{AgentId, Phase};

/// Top-level error type for the dinner library.
#[derive(Debug, thiserror::Error)]
pub enum DinnerError {
    /// The agent id does not name a seat at the table.
    #[error("agent {agent} is outside the table of {agents} agents")]
    InvalidAgentId { agent: AgentId, agents: usize },

    /// The caller broke the request/release protocol.
    #[error("agent {agent} cannot {operation} while {phase}")]
    ProtocolViolation {
        agent: AgentId,
        operation: &'static str,
        phase: Phase,
    },

    /// A blocked operation was cancelled. This is a normal exit path.
    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An agent task panicked or was aborted.
    #[error("agent task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl DinnerError {
    /// Returns true if this error is the cancellation exit path.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DinnerError::Cancelled)
    }
}
