// ABOUTME: Agent module - the think/request/hold/release driver and a full-table runner.
// ABOUTME: Provides Agent, Dinner, and the Pacer delay sources.

mod dinner;
mod pacer;
mod runner;

pub use dinner::{Dinner, DinnerSummary};
pub use pacer::{FixedPacer, Pacer, RandomPacer};
pub use runner::{Agent, AgentOutcome, AgentReport};
