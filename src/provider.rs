//! Provider trait consumed by the evaluation strategies.
//!
//! A `FeatureProvider` is an extension point that can attempt to resolve a
//! single flag to a typed value. Providers are collected into a
//! `NamedProviderSet` and driven by a `Strategy`.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::EvaluationContext;
use crate::envelope::ResultEnvelope;
use crate::value::StructuredValue;

/// Descriptive information about a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    /// Provider name, used for automatic naming in a provider set
    pub name: String,
}

impl ProviderMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Base trait for all flag providers.
///
/// Each method resolves one flag in one value domain. Failures are reported
/// inside the returned envelope, never by panicking. A provider should
/// return promptly; when the engine abandons a call the future is dropped at
/// its next suspension point.
///
/// # Example
///
/// ```rust
/// use multi_provider::prelude::*;
///
/// #[derive(Debug)]
/// struct AlwaysOn;
///
/// #[async_trait]
/// impl FeatureProvider for AlwaysOn {
///     fn metadata(&self) -> ProviderMetadata {
///         ProviderMetadata::new("always-on")
///     }
///
///     async fn resolve_bool_value(&self, _: &str, _: bool, _: &EvaluationContext) -> ResultEnvelope<bool> {
///         ResultEnvelope::resolved(true, Reason::Static)
///     }
///
///     async fn resolve_string_value(&self, _: &str, default: String, _: &EvaluationContext) -> ResultEnvelope<String> {
///         ResultEnvelope::failed(default, ResolutionError::flag_not_found("boolean flags only"))
///     }
///
///     async fn resolve_int_value(&self, _: &str, default: i64, _: &EvaluationContext) -> ResultEnvelope<i64> {
///         ResultEnvelope::failed(default, ResolutionError::flag_not_found("boolean flags only"))
///     }
///
///     async fn resolve_float_value(&self, _: &str, default: f64, _: &EvaluationContext) -> ResultEnvelope<f64> {
///         ResultEnvelope::failed(default, ResolutionError::flag_not_found("boolean flags only"))
///     }
///
///     async fn resolve_struct_value(&self, _: &str, default: StructuredValue, _: &EvaluationContext) -> ResultEnvelope<StructuredValue> {
///         ResultEnvelope::failed(default, ResolutionError::flag_not_found("boolean flags only"))
///     }
/// }
/// ```
#[async_trait]
pub trait FeatureProvider: Send + Sync + Debug {
    /// Returns descriptive information about this provider.
    fn metadata(&self) -> ProviderMetadata;

    async fn resolve_bool_value(
        &self,
        flag_key: &str,
        default_value: bool,
        context: &EvaluationContext,
    ) -> ResultEnvelope<bool>;

    async fn resolve_string_value(
        &self,
        flag_key: &str,
        default_value: String,
        context: &EvaluationContext,
    ) -> ResultEnvelope<String>;

    async fn resolve_int_value(
        &self,
        flag_key: &str,
        default_value: i64,
        context: &EvaluationContext,
    ) -> ResultEnvelope<i64>;

    async fn resolve_float_value(
        &self,
        flag_key: &str,
        default_value: f64,
        context: &EvaluationContext,
    ) -> ResultEnvelope<f64>;

    async fn resolve_struct_value(
        &self,
        flag_key: &str,
        default_value: StructuredValue,
        context: &EvaluationContext,
    ) -> ResultEnvelope<StructuredValue>;
}

/// A provider paired with the unique name it is known by inside a set.
#[derive(Debug, Clone)]
pub struct NamedProvider {
    name: String,
    provider: Arc<dyn FeatureProvider>,
}

impl NamedProvider {
    pub fn new(name: impl Into<String>, provider: Arc<dyn FeatureProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &Arc<dyn FeatureProvider> {
        &self.provider
    }
}
