//! Per-domain adapters that let one reduction algorithm serve every flag type.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::context::EvaluationContext;
use crate::envelope::ResultEnvelope;
use crate::provider::FeatureProvider;

/// Structured (object) flag values.
pub type StructuredValue = serde_json::Value;

/// Boxed future returned by a provider resolution.
pub type ResolveFuture<'a, T> = Pin<Box<dyn Future<Output = ResultEnvelope<T>> + Send + 'a>>;

/// The five value domains a flag can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `bool` flags
    Boolean,
    /// `String` flags
    String,
    /// `i64` flags
    Integer,
    /// `f64` flags
    Float,
    /// JSON object flags
    Structured,
}

impl ValueKind {
    /// Lowercase name of the domain, e.g. `boolean`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Structured => "structured",
        }
    }
}

/// A flag value type the strategies can reduce over.
///
/// Implemented for `bool`, `String`, `i64`, `f64` and [`StructuredValue`].
pub trait FlagType: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Domain this type belongs to.
    const KIND: ValueKind;

    /// Whether the comparison strategy may test values of this type for
    /// agreement.
    const COMPARABLE: bool = true;

    /// Call the provider method matching this domain.
    fn resolve<'a>(
        provider: &'a dyn FeatureProvider,
        flag_key: &'a str,
        default_value: Self,
        context: &'a EvaluationContext,
    ) -> ResolveFuture<'a, Self>;
}

impl FlagType for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn resolve<'a>(
        provider: &'a dyn FeatureProvider,
        flag_key: &'a str,
        default_value: Self,
        context: &'a EvaluationContext,
    ) -> ResolveFuture<'a, Self> {
        Box::pin(provider.resolve_bool_value(flag_key, default_value, context))
    }
}

impl FlagType for String {
    const KIND: ValueKind = ValueKind::String;

    fn resolve<'a>(
        provider: &'a dyn FeatureProvider,
        flag_key: &'a str,
        default_value: Self,
        context: &'a EvaluationContext,
    ) -> ResolveFuture<'a, Self> {
        Box::pin(provider.resolve_string_value(flag_key, default_value, context))
    }
}

impl FlagType for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn resolve<'a>(
        provider: &'a dyn FeatureProvider,
        flag_key: &'a str,
        default_value: Self,
        context: &'a EvaluationContext,
    ) -> ResolveFuture<'a, Self> {
        Box::pin(provider.resolve_int_value(flag_key, default_value, context))
    }
}

impl FlagType for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn resolve<'a>(
        provider: &'a dyn FeatureProvider,
        flag_key: &'a str,
        default_value: Self,
        context: &'a EvaluationContext,
    ) -> ResolveFuture<'a, Self> {
        Box::pin(provider.resolve_float_value(flag_key, default_value, context))
    }
}

impl FlagType for StructuredValue {
    const KIND: ValueKind = ValueKind::Structured;
    const COMPARABLE: bool = false;

    fn resolve<'a>(
        provider: &'a dyn FeatureProvider,
        flag_key: &'a str,
        default_value: Self,
        context: &'a EvaluationContext,
    ) -> ResolveFuture<'a, Self> {
        Box::pin(provider.resolve_struct_value(flag_key, default_value, context))
    }
}
