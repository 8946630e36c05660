//! # Multi-Provider
//!
//! **multi-provider** coordinates feature-flag evaluation across several
//! independent, possibly unreliable flag providers and reduces their answers
//! to one result under a selectable resolution strategy.
//!
//! ## Overview
//!
//! - **Providers** implement [`FeatureProvider`]: one async method per value
//!   domain (boolean, string, integer, float, structured).
//! - A [`NamedProviderSet`] gives each provider a unique name and a fixed
//!   order.
//! - A [`Strategy`] decides how providers are consulted:
//!   - `first-match`: sequential; the first provider that knows the flag wins
//!   - `first-success`: concurrent race bounded by a timeout
//!   - `comparison`: concurrent fan-out; answers must agree, otherwise an
//!     optional fallback provider decides
//! - [`MultiProvider`] is the façade with one entry point per value domain.
//!   It is itself a `FeatureProvider`, so engines nest.
//!
//! Every evaluation returns a value. When nothing works the caller's default
//! is returned with an error and provenance metadata (`strategy-used`,
//! `successful-provider-name` or `successful-provider-names`,
//! `fallback-used`).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use multi_provider::prelude::*;
//!
//! let providers = NamedProviderSet::builder()
//!     .with_named("primary", primary)?
//!     .with_named("secondary", secondary)?
//!     .build();
//!
//! let engine = MultiProvider::builder()
//!     .config(EngineConfig::new().with_strategy(StrategyKind::FirstMatch))
//!     .providers(providers)
//!     .build()?;
//!
//! let details = engine
//!     .boolean_evaluation("new-checkout", false, &EvaluationContext::new())
//!     .await;
//! println!("{} via {:?}", details.value, details.metadata_str(SUCCESSFUL_PROVIDER_NAME));
//! ```
//!
//! ## Logging
//!
//! Provider outcomes and strategy decisions are emitted through `tracing`;
//! install a subscriber to see them.

mod classify;
mod config;
mod context;
mod defaults;
mod engine;
mod envelope;
mod error;
mod outcome;
mod provider;
mod registry;
pub mod strategy;
mod value;

pub mod prelude;

// Re-export core types
pub use classify::{not_found_error, Classification, NOT_FOUND_IN_ANY_PROVIDER};
pub use config::{Config, EngineConfig, StrategyKind, DEFAULT_TIMEOUT};
pub use context::EvaluationContext;
pub use defaults::{default_result, not_found_result};
pub use engine::{EvaluationDetails, MultiProvider, MultiProviderBuilder, MULTI_PROVIDER_NAME};
pub use envelope::{
    FlagMetadata, MetadataValue, Reason, ResultEnvelope, FALLBACK_PROVIDER, FALLBACK_USED,
    NO_PROVIDER, STRATEGY_USED, SUCCESSFUL_PROVIDER_NAME, SUCCESSFUL_PROVIDER_NAMES,
};
pub use error::{
    AggregateError, ConfigError, ConfigResult, ErrorKind, MultiProviderError,
    MultiProviderResult, RegistryError, RegistryResult, ResolutionError,
};
pub use provider::{FeatureProvider, NamedProvider, ProviderMetadata};
pub use registry::{NamedProviderSet, NamedProviderSetBuilder};
pub use strategy::{
    ComparisonStrategy, FirstMatchStrategy, FirstSuccessStrategy, Strategy,
    NO_FALLBACK_CONFIGURED, OBJECT_NOT_COMPARABLE,
};
pub use value::{FlagType, ResolveFuture, StructuredValue, ValueKind};

// Re-export async-trait for convenience
pub use async_trait::async_trait;
