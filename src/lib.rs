// ABOUTME: Root module for dinner - deadlock-free sharing between ring-adjacent agents.
// ABOUTME: Re-exports the coordinator, agent driver, events, and configuration.

pub mod agent;
pub mod config;
pub mod error;
pub mod event;
pub mod prelude;
pub mod table;

pub use error::DinnerError;
