//! Scripted providers shared by the strategy unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::context::EvaluationContext;
use crate::envelope::{Reason, ResultEnvelope};
use crate::error::{ErrorKind, ResolutionError};
use crate::provider::{FeatureProvider, ProviderMetadata};
use crate::registry::NamedProviderSet;
use crate::value::StructuredValue;

#[derive(Debug, Clone)]
pub(crate) enum Answer {
    Bool(bool),
    Str(&'static str),
    Int(i64),
    Float(f64),
    Object(StructuredValue),
    NotFound,
    Fail(ErrorKind, &'static str),
    Panic,
}

#[derive(Debug)]
pub(crate) struct ScriptedProvider {
    answer: Answer,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(answer: Answer) -> Arc<Self> {
        Self::delayed(answer, Duration::ZERO)
    }

    pub fn delayed(answer: Answer, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond<T>(&self, default_value: T, pick: fn(&Answer) -> Option<T>) -> ResultEnvelope<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.answer {
            Answer::NotFound => {
                ResultEnvelope::failed(default_value, ResolutionError::flag_not_found("unknown flag"))
            }
            Answer::Fail(kind, message) => {
                ResultEnvelope::failed(default_value, ResolutionError::new(kind.clone(), *message))
            }
            Answer::Panic => panic!("scripted provider panic"),
            answer => match pick(answer) {
                Some(value) => ResultEnvelope::resolved(value, Reason::Static)
                    .with_variant("scripted")
                    .with_metadata("source", "script"),
                None => ResultEnvelope::failed(
                    default_value,
                    ResolutionError::new(ErrorKind::TypeMismatch, "wrong type"),
                ),
            },
        }
    }
}

#[async_trait]
impl FeatureProvider for ScriptedProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata::new("scripted")
    }

    async fn resolve_bool_value(
        &self,
        _flag_key: &str,
        default_value: bool,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<bool> {
        self.respond(default_value, |a| match a {
            Answer::Bool(v) => Some(*v),
            _ => None,
        })
        .await
    }

    async fn resolve_string_value(
        &self,
        _flag_key: &str,
        default_value: String,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<String> {
        self.respond(default_value, |a| match a {
            Answer::Str(v) => Some(v.to_string()),
            _ => None,
        })
        .await
    }

    async fn resolve_int_value(
        &self,
        _flag_key: &str,
        default_value: i64,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<i64> {
        self.respond(default_value, |a| match a {
            Answer::Int(v) => Some(*v),
            _ => None,
        })
        .await
    }

    async fn resolve_float_value(
        &self,
        _flag_key: &str,
        default_value: f64,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<f64> {
        self.respond(default_value, |a| match a {
            Answer::Float(v) => Some(*v),
            _ => None,
        })
        .await
    }

    async fn resolve_struct_value(
        &self,
        _flag_key: &str,
        default_value: StructuredValue,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<StructuredValue> {
        self.respond(default_value, |a| match a {
            Answer::Object(v) => Some(v.clone()),
            _ => None,
        })
        .await
    }
}

pub(crate) fn provider_set(providers: &[(&str, &Arc<ScriptedProvider>)]) -> NamedProviderSet {
    let mut builder = NamedProviderSet::builder();
    for (name, provider) in providers {
        let provider: Arc<dyn FeatureProvider> = Arc::clone(*provider) as Arc<dyn FeatureProvider>;
        builder
            .register(*name, provider)
            .expect("unique test provider names");
    }
    builder.build()
}
