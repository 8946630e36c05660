//! Parallel fan-out that requires every answering provider to agree.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::classify::Classification;
use crate::config::StrategyKind;
use crate::context::EvaluationContext;
use crate::defaults::{default_result, no_fallback_result, not_found_result};
use crate::envelope::{
    FlagMetadata, Reason, ResultEnvelope, FALLBACK_PROVIDER, FALLBACK_USED, STRATEGY_USED,
    SUCCESSFUL_PROVIDER_NAME, SUCCESSFUL_PROVIDER_NAMES,
};
use crate::error::ResolutionError;
use crate::outcome::ProviderOutcome;
use crate::provider::FeatureProvider;
use crate::registry::NamedProviderSet;
use crate::value::FlagType;

/// Error message for structured evaluations under this strategy.
pub const OBJECT_NOT_COMPARABLE: &str =
    "object evaluation not allowed for non-comparable types";

/// Error message when providers disagree and there is nothing to fall back to.
pub const NO_FALLBACK_CONFIGURED: &str = "no fallback provider configured";

/// Asks every provider at once and returns their value only if they agree.
///
/// `FlagNotFound` answers are ignored. The first hard error cancels the
/// remaining calls. On a hard error or a disagreement the fallback
/// provider, if any, is consulted and its answer returned as is.
///
/// Agreeing providers are listed in `successful-provider-names` in the
/// order their answers arrived, which depends on timing.
///
/// Structured values are never compared: object evaluation returns the
/// default without calling any provider.
///
/// Must be called from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct ComparisonStrategy {
    providers: NamedProviderSet,
    fallback: Option<Arc<dyn FeatureProvider>>,
}

impl ComparisonStrategy {
    pub fn new(providers: NamedProviderSet) -> Self {
        Self {
            providers,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FeatureProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn providers(&self) -> &NamedProviderSet {
        &self.providers
    }

    pub fn fallback(&self) -> Option<&Arc<dyn FeatureProvider>> {
        self.fallback.as_ref()
    }

    pub async fn evaluate<T: FlagType>(
        &self,
        flag_key: &str,
        default_value: T,
        context: &EvaluationContext,
    ) -> ResultEnvelope<T> {
        let strategy = StrategyKind::Comparison.as_str();

        if !T::COMPARABLE {
            debug!(strategy, flag_key, kind = T::KIND.as_str(), "refusing to compare values");
            let mut envelope = default_result(
                strategy,
                default_value,
                Some(ResolutionError::general(OBJECT_NOT_COMPARABLE)),
            );
            envelope.reason = Reason::Default;
            return envelope;
        }

        if self.providers.is_empty() {
            return not_found_result(strategy, default_value);
        }

        let shared_key: Arc<str> = Arc::from(flag_key);
        let shared_context = Arc::new(context.clone());

        let mut tasks = JoinSet::new();
        for named in &self.providers {
            let named = named.clone();
            let flag_key = Arc::clone(&shared_key);
            let context = Arc::clone(&shared_context);
            let default_value = default_value.clone();
            tasks.spawn(async move {
                let envelope =
                    T::resolve(named.provider().as_ref(), &flag_key, default_value, &context).await;
                ProviderOutcome {
                    provider_name: named.name().to_string(),
                    envelope,
                }
            });
        }

        let mut collected: Vec<ProviderOutcome<T>> = Vec::with_capacity(self.providers.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    tasks.abort_all();
                    warn!(strategy, flag_key, error = %join_error, "provider task failed");
                    let error =
                        ResolutionError::general(format!("provider task failed: {}", join_error));
                    return self.fall_back(flag_key, default_value, context, Some(error)).await;
                }
            };

            match Classification::of(&outcome.envelope) {
                Classification::Success => collected.push(outcome),
                Classification::NotFound => {
                    debug!(strategy, flag_key, provider = %outcome.provider_name, "flag not found");
                }
                Classification::Failed(error) => {
                    tasks.abort_all();
                    warn!(strategy, flag_key, provider = %outcome.provider_name, %error, "provider failed, aborting comparison");
                    return self.fall_back(flag_key, default_value, context, Some(error)).await;
                }
            }
        }

        if collected.is_empty() {
            debug!(strategy, flag_key, "flag not found in any provider");
            return not_found_result(strategy, default_value);
        }

        let agreed = {
            let first = &collected[0].envelope.value;
            collected.iter().all(|outcome| &outcome.envelope.value == first)
        };
        if !agreed {
            warn!(strategy, flag_key, answers = collected.len(), "providers disagree");
            return self.fall_back(flag_key, default_value, context, None).await;
        }

        let names = collected
            .iter()
            .map(|outcome| outcome.provider_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        debug!(strategy, flag_key, providers = %names, "providers agree");

        let mut envelope = collected.swap_remove(0).envelope;
        envelope.metadata.remove(SUCCESSFUL_PROVIDER_NAME);
        envelope
            .metadata
            .insert(STRATEGY_USED.to_string(), strategy.into());
        envelope
            .metadata
            .insert(SUCCESSFUL_PROVIDER_NAMES.to_string(), names.into());
        envelope
            .metadata
            .insert(FALLBACK_USED.to_string(), false.into());
        envelope
    }

    /// Answer from the fallback provider, or a default when there is none.
    ///
    /// `cause` is the hard error that aborted the comparison, if any; it is
    /// reported when no fallback exists. A plain disagreement reports
    /// [`NO_FALLBACK_CONFIGURED`].
    async fn fall_back<T: FlagType>(
        &self,
        flag_key: &str,
        default_value: T,
        context: &EvaluationContext,
        cause: Option<ResolutionError>,
    ) -> ResultEnvelope<T> {
        let strategy = StrategyKind::Comparison.as_str();

        let Some(fallback) = &self.fallback else {
            let error = cause.unwrap_or_else(|| ResolutionError::general(NO_FALLBACK_CONFIGURED));
            return no_fallback_result(strategy, default_value, error);
        };

        warn!(strategy, flag_key, "using fallback provider");
        let mut envelope = T::resolve(fallback.as_ref(), flag_key, default_value, context).await;
        let mut metadata = FlagMetadata::new();
        metadata.insert(STRATEGY_USED.to_string(), strategy.into());
        metadata.insert(SUCCESSFUL_PROVIDER_NAME.to_string(), FALLBACK_PROVIDER.into());
        metadata.insert(FALLBACK_USED.to_string(), true.into());
        envelope.metadata = metadata;
        envelope
    }
}
