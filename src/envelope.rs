//! Typed resolution results and provenance metadata.

use std::collections::HashMap;
use std::fmt;

use crate::error::ResolutionError;

/// Metadata key naming the strategy that produced a result.
pub const STRATEGY_USED: &str = "strategy-used";

/// Metadata key naming the single provider whose value was returned.
pub const SUCCESSFUL_PROVIDER_NAME: &str = "successful-provider-name";

/// Metadata key listing every provider that agreed on the returned value.
pub const SUCCESSFUL_PROVIDER_NAMES: &str = "successful-provider-names";

/// Metadata key recording whether the fallback provider answered.
pub const FALLBACK_USED: &str = "fallback-used";

/// `successful-provider-name` value when no provider succeeded.
pub const NO_PROVIDER: &str = "none";

/// `successful-provider-name` value when the fallback provider answered.
pub const FALLBACK_PROVIDER: &str = "fallback";

/// Why a value was returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    /// The value is static and involves no rules
    Static,
    /// The caller's default was returned
    Default,
    /// A targeting rule matched the context
    TargetingMatch,
    /// The value came from a percentage rollout
    Split,
    /// The flag is disabled
    Disabled,
    /// The value was served from a cache
    Cached,
    /// The provider gave no reason
    Unknown,
    /// Resolution failed; the value is the default
    Error,
    /// Combined from several providers
    Aggregated,
    /// Combined from several providers, answered by the fallback
    AggregatedFallback,
    /// Provider-specific reason carried through verbatim
    Other(String),
}

impl Reason {
    /// Wire name of the reason, e.g. `TARGETING_MATCH`.
    pub fn as_str(&self) -> &str {
        match self {
            Reason::Static => "STATIC",
            Reason::Default => "DEFAULT",
            Reason::TargetingMatch => "TARGETING_MATCH",
            Reason::Split => "SPLIT",
            Reason::Disabled => "DISABLED",
            Reason::Cached => "CACHED",
            Reason::Unknown => "UNKNOWN",
            Reason::Error => "ERROR",
            Reason::Aggregated => "AGGREGATED",
            Reason::AggregatedFallback => "AGGREGATED_FALLBACK",
            Reason::Other(reason) => reason,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// Boolean entry
    Bool(bool),
    /// Integer entry
    Int(i64),
    /// Floating-point entry
    Float(f64),
    /// String entry
    String(String),
}

impl MetadataValue {
    /// The string payload, if this is a string entry.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean entry.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

/// Free-form metadata attached to a result.
pub type FlagMetadata = HashMap<String, MetadataValue>;

/// One resolution outcome for a single value domain.
///
/// `error` being set implies the reason is `Error` (or `Default` for
/// results the engine refuses to compute); `value` is then the caller's
/// default.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope<T> {
    pub value: T,
    pub variant: Option<String>,
    pub reason: Reason,
    pub error: Option<ResolutionError>,
    pub metadata: FlagMetadata,
}

impl<T> ResultEnvelope<T> {
    /// A successful resolution with the given reason.
    pub fn resolved(value: T, reason: Reason) -> Self {
        Self {
            value,
            variant: None,
            reason,
            error: None,
            metadata: FlagMetadata::new(),
        }
    }

    /// A failed resolution carrying `default` as its value.
    pub fn failed(default: T, error: ResolutionError) -> Self {
        Self {
            value: default,
            variant: None,
            reason: Reason::Error,
            error: Some(error),
            metadata: FlagMetadata::new(),
        }
    }

    /// Set the variant identifier.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Add one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether an error is attached.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Look up a string metadata entry.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetadataValue::as_str)
    }

    /// Look up a boolean metadata entry.
    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(MetadataValue::as_bool)
    }

    /// Stamp the strategy name and the single winning provider.
    pub(crate) fn tag_winner(&mut self, strategy: &str, provider_name: &str) {
        self.metadata
            .insert(STRATEGY_USED.to_string(), strategy.into());
        self.metadata
            .insert(SUCCESSFUL_PROVIDER_NAME.to_string(), provider_name.into());
    }
}
