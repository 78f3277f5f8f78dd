// ABOUTME: Dinner configuration - table size, think/hold delays, and run length.
// ABOUTME: Loadable from JSON, adjustable with builder-style setters, validated before use.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DinnerError;

/// Inclusive-exclusive range of delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields the same delay.
    pub fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn is_fixed(&self) -> bool {
        self.min_ms == self.max_ms
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(0, 1000)
    }
}

impl std::str::FromStr for DelayRange {
    type Err = DinnerError;

    /// Parses `"250"` as a fixed delay or `"100..900"` as a range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|e| DinnerError::Config(format!("bad delay '{}': {}", part, e)))
        };

        match s.split_once("..") {
            Some((min, max)) => Ok(Self::new(parse(min)?, parse(max)?)),
            None => Ok(Self::fixed(parse(s)?)),
        }
    }
}

/// Configuration for a dinner run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DinnerConfig {
    /// Number of agents around the table. Must be at least 2.
    pub agents: usize,

    /// How long an agent idles between meals.
    pub think: DelayRange,

    /// How long an agent holds its resources.
    pub hold: DelayRange,

    /// Meals per agent before it stops. `None` runs until cancelled.
    pub cycles: Option<u64>,
}

impl Default for DinnerConfig {
    fn default() -> Self {
        Self {
            agents: 5,
            think: DelayRange::default(),
            hold: DelayRange::default(),
            cycles: None,
        }
    }
}

impl DinnerConfig {
    /// Create the default configuration for `agents` agents.
    pub fn new(agents: usize) -> Self {
        Self {
            agents,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DinnerError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the think delay range.
    pub fn think(mut self, think: DelayRange) -> Self {
        self.think = think;
        self
    }

    /// Set the hold delay range.
    pub fn hold(mut self, hold: DelayRange) -> Self {
        self.hold = hold;
        self
    }

    /// Stop each agent after `cycles` meals.
    pub fn cycles(mut self, cycles: u64) -> Self {
        self.cycles = Some(cycles);
        self
    }

    /// Check that the configuration describes a runnable table.
    pub fn validate(&self) -> Result<(), DinnerError> {
        if self.agents < 2 {
            return Err(DinnerError::Config(format!(
                "a table needs at least 2 agents, got {}",
                self.agents
            )));
        }
        for (name, range) in [("think", &self.think), ("hold", &self.hold)] {
            if range.min_ms > range.max_ms {
                return Err(DinnerError::Config(format!(
                    "{} range {}..{} is inverted",
                    name, range.min_ms, range.max_ms
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_matches_classic_table() {
        let config = DinnerConfig::default();
        assert_eq!(config.agents, 5);
        assert_eq!(config.think, DelayRange::new(0, 1000));
        assert_eq!(config.hold, DelayRange::new(0, 1000));
        assert!(config.cycles.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = DinnerConfig::new(3)
            .think(DelayRange::fixed(5))
            .hold(DelayRange::new(1, 2))
            .cycles(10);

        assert_eq!(config.agents, 3);
        assert!(config.think.is_fixed());
        assert_eq!(config.hold.max(), Duration::from_millis(2));
        assert_eq!(config.cycles, Some(10));
    }

    #[test]
    fn test_validate_rejects_single_agent() {
        let err = DinnerConfig::new(1).validate().unwrap_err();
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = DinnerConfig::default().hold(DelayRange::new(10, 5));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hold"));
    }

    #[test]
    fn test_delay_range_parsing() {
        assert_eq!("250".parse::<DelayRange>().unwrap(), DelayRange::fixed(250));
        assert_eq!(
            "100..900".parse::<DelayRange>().unwrap(),
            DelayRange::new(100, 900)
        );
        assert!("abc".parse::<DelayRange>().is_err());
        assert!("1..x".parse::<DelayRange>().is_err());
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"agents": 7, "cycles": 3}}"#).unwrap();

        let config = DinnerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.agents, 7);
        assert_eq!(config.cycles, Some(3));
        assert_eq!(config.think, DelayRange::default());
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"agents": 1}}"#).unwrap();

        assert!(matches!(
            DinnerConfig::from_file(file.path()),
            Err(DinnerError::Config(_))
        ));
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            DinnerConfig::from_file(file.path()),
            Err(DinnerError::Json(_))
        ));
    }
}
