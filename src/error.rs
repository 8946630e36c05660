//! Error types for the multi-provider engine.

use std::fmt;

use thiserror::Error;

/// Root error type for multi-provider construction.
///
/// Evaluation itself never fails with this type: every evaluation path
/// produces a result envelope carrying the caller's default value.
#[derive(Error, Debug)]
pub enum MultiProviderError {
    /// Registry-related errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Classification of a resolution failure.
///
/// `FlagNotFound` is the only soft kind. Codes a provider reports that are
/// not known here are carried through verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The flag does not exist at this provider
    FlagNotFound,
    /// The flag definition could not be parsed
    ParseError,
    /// The flag value does not match the requested type
    TypeMismatch,
    /// A targeting key was required but missing
    TargetingKeyMissing,
    /// The evaluation context was rejected
    InvalidContext,
    /// The provider has not finished initializing
    ProviderNotReady,
    /// The provider is in an unrecoverable state
    ProviderFatal,
    /// Unspecified failure
    General,
    /// Several providers failed; produced by the engine itself
    Aggregate,
    /// Passthrough of an unrecognized provider code
    Other(String),
}

impl ErrorKind {
    /// Returns the canonical code string for this kind.
    pub fn code(&self) -> &str {
        match self {
            ErrorKind::FlagNotFound => "FLAG_NOT_FOUND",
            ErrorKind::ParseError => "PARSE_ERROR",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::TargetingKeyMissing => "TARGETING_KEY_MISSING",
            ErrorKind::InvalidContext => "INVALID_CONTEXT",
            ErrorKind::ProviderNotReady => "PROVIDER_NOT_READY",
            ErrorKind::ProviderFatal => "PROVIDER_FATAL",
            ErrorKind::General => "GENERAL",
            ErrorKind::Aggregate => "AGGREGATE",
            ErrorKind::Other(code) => code,
        }
    }

    /// Parses a code string, keeping unknown codes as `Other`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "FLAG_NOT_FOUND" => ErrorKind::FlagNotFound,
            "PARSE_ERROR" => ErrorKind::ParseError,
            "TYPE_MISMATCH" => ErrorKind::TypeMismatch,
            "TARGETING_KEY_MISSING" => ErrorKind::TargetingKeyMissing,
            "INVALID_CONTEXT" => ErrorKind::InvalidContext,
            "PROVIDER_NOT_READY" => ErrorKind::ProviderNotReady,
            "PROVIDER_FATAL" => ErrorKind::ProviderFatal,
            "GENERAL" => ErrorKind::General,
            "AGGREGATE" => ErrorKind::Aggregate,
            other => ErrorKind::Other(other.to_string()),
        }
    }

    /// Whether other providers may still be consulted after this error.
    pub fn is_soft(&self) -> bool {
        matches!(self, ErrorKind::FlagNotFound)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single failed resolution, as reported by a provider or by the engine.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ResolutionError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl ResolutionError {
    /// Create a new resolution error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a `FlagNotFound` error.
    pub fn flag_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FlagNotFound, message)
    }

    /// Shorthand for a `General` error.
    pub fn general(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::General, message)
    }

    /// Whether this error allows other providers to be tried.
    pub fn is_soft(&self) -> bool {
        self.kind.is_soft()
    }
}

/// Hard errors from several providers, in the order they arrived.
#[derive(Error, Debug, Clone, Default, PartialEq)]
pub struct AggregateError {
    entries: Vec<(String, ResolutionError)>,
}

impl AggregateError {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for the named provider.
    pub fn push(&mut self, provider_name: impl Into<String>, error: ResolutionError) {
        self.entries.push((provider_name.into(), error));
    }

    /// Recorded `(provider name, error)` pairs.
    pub fn entries(&self) -> &[(String, ResolutionError)] {
        &self.entries
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, error)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", name, error)?;
        }
        Ok(())
    }
}

impl From<AggregateError> for ResolutionError {
    fn from(err: AggregateError) -> Self {
        ResolutionError::new(ErrorKind::Aggregate, err.to_string())
    }
}

/// Errors that can occur while assembling a provider set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Provider already registered with this name
    #[error("Provider already registered: {0}")]
    AlreadyRegistered(String),

    /// Invalid provider name
    #[error("Invalid provider name: {0:?}")]
    InvalidName(String),
}

/// Errors raised by configuration validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Unknown strategy name
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for general multi-provider operations.
pub type MultiProviderResult<T> = Result<T, MultiProviderError>;
