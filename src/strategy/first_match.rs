//! Sequential evaluation: the first provider that knows the flag wins.

use tracing::{debug, warn};

use crate::classify::Classification;
use crate::config::StrategyKind;
use crate::context::EvaluationContext;
use crate::defaults::{default_result, not_found_result};
use crate::envelope::ResultEnvelope;
use crate::registry::NamedProviderSet;
use crate::value::FlagType;

/// Walks providers in registration order and stops at the first one that
/// does not report `FlagNotFound`.
///
/// Providers after the one that answered (or failed hard) are never
/// called.
#[derive(Debug, Clone)]
pub struct FirstMatchStrategy {
    providers: NamedProviderSet,
}

impl FirstMatchStrategy {
    pub fn new(providers: NamedProviderSet) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &NamedProviderSet {
        &self.providers
    }

    pub async fn evaluate<T: FlagType>(
        &self,
        flag_key: &str,
        default_value: T,
        context: &EvaluationContext,
    ) -> ResultEnvelope<T> {
        let strategy = StrategyKind::FirstMatch.as_str();

        for named in &self.providers {
            let mut envelope =
                T::resolve(named.provider().as_ref(), flag_key, default_value.clone(), context)
                    .await;

            match Classification::of(&envelope) {
                Classification::Success => {
                    debug!(strategy, flag_key, provider = named.name(), "flag resolved");
                    envelope.tag_winner(strategy, named.name());
                    return envelope;
                }
                Classification::NotFound => {
                    debug!(strategy, flag_key, provider = named.name(), "flag not found, trying next provider");
                }
                Classification::Failed(error) => {
                    warn!(strategy, flag_key, provider = named.name(), %error, "provider failed, stopping");
                    return default_result(strategy, default_value, Some(error));
                }
            }
        }

        debug!(strategy, flag_key, "flag not found in any provider");
        not_found_result(strategy, default_value)
    }
}
