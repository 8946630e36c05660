//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use multi_provider::prelude::*;
//! ```

// Configuration
pub use crate::config::{Config, EngineConfig, StrategyKind};

// Providers
pub use crate::context::EvaluationContext;
pub use crate::provider::{FeatureProvider, NamedProvider, ProviderMetadata};
pub use crate::registry::{NamedProviderSet, NamedProviderSetBuilder};
pub use crate::value::{FlagType, StructuredValue};

// Results
pub use crate::envelope::{
    FlagMetadata, MetadataValue, Reason, ResultEnvelope, FALLBACK_USED, STRATEGY_USED,
    SUCCESSFUL_PROVIDER_NAME, SUCCESSFUL_PROVIDER_NAMES,
};

// Engine
pub use crate::engine::{EvaluationDetails, MultiProvider};
pub use crate::strategy::Strategy;

// Errors
pub use crate::error::{
    ErrorKind, MultiProviderError, MultiProviderResult, RegistryError, ResolutionError,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
