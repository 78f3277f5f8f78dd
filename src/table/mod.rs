// ABOUTME: Table module - the shared phase table and its admission coordinator.
// ABOUTME: Contains phases, per-agent wake signals, and the Coordinator.

mod coordinator;
mod phase;
mod signal;

pub use coordinator::Coordinator;
pub use phase::{AgentId, Phase, PhaseTable};
pub(crate) use signal::WakeSignal;
