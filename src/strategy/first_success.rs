//! Parallel race: the first provider to succeed wins.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::classify::Classification;
use crate::config::{StrategyKind, DEFAULT_TIMEOUT};
use crate::context::EvaluationContext;
use crate::defaults::{default_result, not_found_result};
use crate::envelope::ResultEnvelope;
use crate::error::{AggregateError, ResolutionError};
use crate::outcome::{outcome_channel, ProviderOutcome};
use crate::registry::NamedProviderSet;
use crate::value::FlagType;

/// Deadline used when the configured timeout does not fit in an `Instant`.
const UNBOUNDED_WAIT: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Races every provider concurrently and returns the first success.
///
/// The call resolves to exactly one of:
/// - the first successful result, tagged with the winner's name
/// - the not-found default, when every provider reported `FlagNotFound`
/// - an aggregate-error default, when every provider has reported and at
///   least one failed hard
/// - a timeout default, when the race outlives the configured timeout
///
/// Which provider wins a tie is decided by wall-clock completion order, not
/// registration order. Losing tasks are aborted; a provider that never
/// reaches another suspension point may still finish, but its result is
/// discarded.
///
/// Must be called from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct FirstSuccessStrategy {
    providers: NamedProviderSet,
    timeout: Duration,
}

impl FirstSuccessStrategy {
    pub fn new(providers: NamedProviderSet, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Create a strategy with the default five second timeout.
    pub fn with_default_timeout(providers: NamedProviderSet) -> Self {
        Self::new(providers, DEFAULT_TIMEOUT)
    }

    pub fn providers(&self) -> &NamedProviderSet {
        &self.providers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn evaluate<T: FlagType>(
        &self,
        flag_key: &str,
        default_value: T,
        context: &EvaluationContext,
    ) -> ResultEnvelope<T> {
        let strategy = StrategyKind::FirstSuccess.as_str();
        let total = self.providers.len();
        if total == 0 {
            return not_found_result(strategy, default_value);
        }

        let deadline = deadline_after(self.timeout);
        let (sender, mut outcomes) = outcome_channel::<T>(total);
        let shared_key: Arc<str> = Arc::from(flag_key);
        let shared_context = Arc::new(context.clone());

        let mut tasks = JoinSet::new();
        for named in &self.providers {
            let named = named.clone();
            let sender = sender.clone();
            let flag_key = Arc::clone(&shared_key);
            let context = Arc::clone(&shared_context);
            let default_value = default_value.clone();
            tasks.spawn(async move {
                let envelope =
                    T::resolve(named.provider().as_ref(), &flag_key, default_value, &context).await;
                sender.report(ProviderOutcome {
                    provider_name: named.name().to_string(),
                    envelope,
                });
            });
        }
        // Once every task has reported or died, the stream ends.
        drop(sender);

        let mut reported: HashSet<String> = HashSet::with_capacity(total);
        let mut not_found = 0;
        let mut errors = AggregateError::new();

        while reported.len() < total {
            let outcome = match timeout_at(deadline, outcomes.next()).await {
                Ok(Some(outcome)) => outcome,
                Ok(None) => break,
                Err(_) => {
                    tasks.abort_all();
                    warn!(
                        strategy,
                        flag_key,
                        timeout_ms = self.timeout.as_millis() as u64,
                        failures = errors.len(),
                        "race timed out"
                    );
                    let error = if errors.is_empty() {
                        ResolutionError::general(format!(
                            "evaluation timed out after {}ms",
                            self.timeout.as_millis()
                        ))
                    } else {
                        errors.into()
                    };
                    return default_result(strategy, default_value, Some(error));
                }
            };

            reported.insert(outcome.provider_name.clone());
            match Classification::of(&outcome.envelope) {
                Classification::Success => {
                    tasks.abort_all();
                    debug!(strategy, flag_key, provider = %outcome.provider_name, "race won");
                    let mut envelope = outcome.envelope;
                    envelope.tag_winner(strategy, &outcome.provider_name);
                    return envelope;
                }
                Classification::NotFound => {
                    debug!(strategy, flag_key, provider = %outcome.provider_name, "flag not found");
                    not_found += 1;
                }
                Classification::Failed(error) => {
                    warn!(strategy, flag_key, provider = %outcome.provider_name, %error, "provider failed");
                    errors.push(outcome.provider_name, error);
                }
            }
        }

        for named in &self.providers {
            if !reported.contains(named.name()) {
                errors.push(
                    named.name(),
                    ResolutionError::general("provider task ended without reporting a result"),
                );
            }
        }

        if errors.is_empty() {
            debug!(strategy, flag_key, not_found, "flag not found in any provider");
            not_found_result(strategy, default_value)
        } else {
            warn!(strategy, flag_key, failures = errors.len(), not_found, "no provider succeeded");
            default_result(strategy, default_value, Some(errors.into()))
        }
    }
}

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + UNBOUNDED_WAIT)
}
