//! The evaluation façade.
//!
//! `MultiProvider` exposes one entry point per value domain and hands each
//! call to its configured `Strategy`. It holds no per-call state.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::{Config, EngineConfig, StrategyKind};
use crate::context::EvaluationContext;
use crate::envelope::{FlagMetadata, ResultEnvelope};
use crate::error::{ConfigError, MultiProviderResult, ResolutionError};
use crate::provider::{FeatureProvider, ProviderMetadata};
use crate::registry::NamedProviderSet;
use crate::strategy::Strategy;
use crate::value::{FlagType, StructuredValue};

/// Name reported by `MultiProvider` when used as a provider itself.
pub const MULTI_PROVIDER_NAME: &str = "multi-provider";

/// Public result of a flag evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDetails<T> {
    pub flag_key: String,
    pub value: T,
    pub variant: Option<String>,
    pub reason: String,
    pub error: Option<ResolutionError>,
    pub metadata: FlagMetadata,
}

impl<T> EvaluationDetails<T> {
    pub fn from_envelope(flag_key: impl Into<String>, envelope: ResultEnvelope<T>) -> Self {
        Self {
            flag_key: flag_key.into(),
            value: envelope.value,
            variant: envelope.variant,
            reason: envelope.reason.as_str().to_string(),
            error: envelope.error,
            metadata: envelope.metadata,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Look up a string metadata entry.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Look up a boolean metadata entry.
    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(|v| v.as_bool())
    }
}

/// Evaluates flags across several providers under one strategy.
///
/// # Example
///
/// ```rust,ignore
/// use multi_provider::prelude::*;
///
/// let engine = MultiProvider::builder()
///     .config(EngineConfig::new().with_strategy(StrategyKind::Comparison))
///     .providers(providers)
///     .fallback(authoritative)
///     .build()?;
///
/// let details = engine
///     .boolean_evaluation("new-checkout", false, &EvaluationContext::new())
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct MultiProvider {
    strategy: Strategy,
}

impl MultiProvider {
    /// Create an engine around an already constructed strategy.
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn builder() -> MultiProviderBuilder {
        MultiProviderBuilder::new()
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn providers(&self) -> &NamedProviderSet {
        self.strategy.providers()
    }

    /// Evaluate a flag of any supported type.
    pub async fn evaluate<T: FlagType>(
        &self,
        flag_key: &str,
        default_value: T,
        context: &EvaluationContext,
    ) -> EvaluationDetails<T> {
        let envelope = self.strategy.evaluate(flag_key, default_value, context).await;
        EvaluationDetails::from_envelope(flag_key, envelope)
    }

    pub async fn boolean_evaluation(
        &self,
        flag_key: &str,
        default_value: bool,
        context: &EvaluationContext,
    ) -> EvaluationDetails<bool> {
        self.evaluate(flag_key, default_value, context).await
    }

    pub async fn string_evaluation(
        &self,
        flag_key: &str,
        default_value: impl Into<String>,
        context: &EvaluationContext,
    ) -> EvaluationDetails<String> {
        self.evaluate(flag_key, default_value.into(), context).await
    }

    pub async fn int_evaluation(
        &self,
        flag_key: &str,
        default_value: i64,
        context: &EvaluationContext,
    ) -> EvaluationDetails<i64> {
        self.evaluate(flag_key, default_value, context).await
    }

    pub async fn float_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: &EvaluationContext,
    ) -> EvaluationDetails<f64> {
        self.evaluate(flag_key, default_value, context).await
    }

    pub async fn object_evaluation(
        &self,
        flag_key: &str,
        default_value: StructuredValue,
        context: &EvaluationContext,
    ) -> EvaluationDetails<StructuredValue> {
        self.evaluate(flag_key, default_value, context).await
    }
}

#[async_trait]
impl FeatureProvider for MultiProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata::new(MULTI_PROVIDER_NAME)
    }

    async fn resolve_bool_value(
        &self,
        flag_key: &str,
        default_value: bool,
        context: &EvaluationContext,
    ) -> ResultEnvelope<bool> {
        self.strategy.evaluate(flag_key, default_value, context).await
    }

    async fn resolve_string_value(
        &self,
        flag_key: &str,
        default_value: String,
        context: &EvaluationContext,
    ) -> ResultEnvelope<String> {
        self.strategy.evaluate(flag_key, default_value, context).await
    }

    async fn resolve_int_value(
        &self,
        flag_key: &str,
        default_value: i64,
        context: &EvaluationContext,
    ) -> ResultEnvelope<i64> {
        self.strategy.evaluate(flag_key, default_value, context).await
    }

    async fn resolve_float_value(
        &self,
        flag_key: &str,
        default_value: f64,
        context: &EvaluationContext,
    ) -> ResultEnvelope<f64> {
        self.strategy.evaluate(flag_key, default_value, context).await
    }

    async fn resolve_struct_value(
        &self,
        flag_key: &str,
        default_value: StructuredValue,
        context: &EvaluationContext,
    ) -> ResultEnvelope<StructuredValue> {
        self.strategy.evaluate(flag_key, default_value, context).await
    }
}

/// Builder for `MultiProvider` from configuration.
#[derive(Debug, Default)]
pub struct MultiProviderBuilder {
    config: EngineConfig,
    providers: NamedProviderSet,
    fallback: Option<Arc<dyn FeatureProvider>>,
}

impl MultiProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn providers(mut self, providers: NamedProviderSet) -> Self {
        self.providers = providers;
        self
    }

    /// Set the fallback provider (comparison strategy only).
    pub fn fallback(mut self, fallback: Arc<dyn FeatureProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> MultiProviderResult<MultiProvider> {
        self.config.validate()?;

        if self.providers.is_empty() {
            warn!(strategy = self.config.name(), "engine built without providers");
        }

        let strategy = match self.config.strategy {
            StrategyKind::FirstMatch | StrategyKind::FirstSuccess if self.fallback.is_some() => {
                return Err(ConfigError::Invalid(format!(
                    "a fallback provider is only used by the comparison strategy, not {}",
                    self.config.strategy
                ))
                .into());
            }
            StrategyKind::FirstMatch => Strategy::first_match(self.providers),
            StrategyKind::FirstSuccess => {
                Strategy::first_success(self.providers, self.config.timeout)
            }
            StrategyKind::Comparison => Strategy::comparison(self.providers, self.fallback),
        };

        Ok(MultiProvider::new(strategy))
    }
}
