//! Construction-time configuration for the engine.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Default race timeout for the first-success strategy.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Base trait for configuration types.
pub trait Config: Send + Sync {
    /// Returns the configuration name/identifier.
    fn name(&self) -> &str {
        "default"
    }

    /// Returns the timeout duration, if configured.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Validates the configuration.
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

/// Which resolution policy the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Sequential; first provider that knows the flag wins
    #[default]
    FirstMatch,
    /// Parallel race; first success wins, bounded by a timeout
    FirstSuccess,
    /// Parallel fan-out; all answers must agree, else fallback
    Comparison,
}

impl StrategyKind {
    /// Canonical name, as stamped into `strategy-used` metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::FirstMatch => "first-match",
            StrategyKind::FirstSuccess => "first-success",
            StrategyKind::Comparison => "comparison",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-match" => Ok(StrategyKind::FirstMatch),
            "first-success" => Ok(StrategyKind::FirstSuccess),
            "comparison" => Ok(StrategyKind::Comparison),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Strategy to run
    pub strategy: StrategyKind,
    /// Overall race timeout (first-success only)
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the timeout duration.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Set the timeout in milliseconds.
    pub fn with_timeout_ms(self, ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(ms))
    }
}

impl Config for EngineConfig {
    fn name(&self) -> &str {
        self.strategy.as_str()
    }

    fn timeout(&self) -> Option<Duration> {
        match self.strategy {
            StrategyKind::FirstSuccess => Some(self.timeout),
            _ => None,
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.strategy == StrategyKind::FirstSuccess && self.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "first-success timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
