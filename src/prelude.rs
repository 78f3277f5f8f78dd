// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use dinner::prelude::*;` to get started quickly.

pub use crate::agent::{
    Agent, AgentOutcome, AgentReport, Dinner, DinnerSummary, FixedPacer, Pacer, RandomPacer,
};
pub use crate::config::{DelayRange, DinnerConfig};
pub use crate::error::DinnerError;
pub use crate::event::{
    AdjacencyProbe, ChannelSink, FanOut, RecordingSink, TracingSink, TransitionEvent,
    TransitionSink,
};
pub use crate::table::{AgentId, Coordinator, Phase, PhaseTable};
