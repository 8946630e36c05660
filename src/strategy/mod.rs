//! Resolution policies.
//!
//! A `Strategy` decides how the providers of a `NamedProviderSet` are
//! consulted and how their answers reduce to a single result. One generic
//! reduction per policy serves all five value domains through [`FlagType`].
//!
//! | Strategy | Invocation | Winner |
//! |---|---|---|
//! | `first-match` | sequential, registration order | first provider without `FlagNotFound` |
//! | `first-success` | concurrent race, with timeout | first provider to succeed |
//! | `comparison` | concurrent fan-out | all answers agree, else fallback |

mod comparison;
mod first_match;
mod first_success;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

pub use comparison::{ComparisonStrategy, NO_FALLBACK_CONFIGURED, OBJECT_NOT_COMPARABLE};
pub use first_match::FirstMatchStrategy;
pub use first_success::FirstSuccessStrategy;

use crate::config::StrategyKind;
use crate::context::EvaluationContext;
use crate::envelope::ResultEnvelope;
use crate::provider::FeatureProvider;
use crate::registry::NamedProviderSet;
use crate::value::FlagType;

/// The active resolution policy.
#[derive(Debug, Clone)]
pub enum Strategy {
    FirstMatch(FirstMatchStrategy),
    FirstSuccess(FirstSuccessStrategy),
    Comparison(ComparisonStrategy),
}

impl Strategy {
    pub fn first_match(providers: NamedProviderSet) -> Self {
        Strategy::FirstMatch(FirstMatchStrategy::new(providers))
    }

    pub fn first_success(providers: NamedProviderSet, timeout: Duration) -> Self {
        Strategy::FirstSuccess(FirstSuccessStrategy::new(providers, timeout))
    }

    pub fn comparison(
        providers: NamedProviderSet,
        fallback: Option<Arc<dyn FeatureProvider>>,
    ) -> Self {
        let strategy = ComparisonStrategy::new(providers);
        Strategy::Comparison(match fallback {
            Some(fallback) => strategy.with_fallback(fallback),
            None => strategy,
        })
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::FirstMatch(_) => StrategyKind::FirstMatch,
            Strategy::FirstSuccess(_) => StrategyKind::FirstSuccess,
            Strategy::Comparison(_) => StrategyKind::Comparison,
        }
    }

    /// Canonical strategy name.
    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn providers(&self) -> &NamedProviderSet {
        match self {
            Strategy::FirstMatch(s) => s.providers(),
            Strategy::FirstSuccess(s) => s.providers(),
            Strategy::Comparison(s) => s.providers(),
        }
    }

    /// Resolve one flag under this policy.
    pub async fn evaluate<T: FlagType>(
        &self,
        flag_key: &str,
        default_value: T,
        context: &EvaluationContext,
    ) -> ResultEnvelope<T> {
        match self {
            Strategy::FirstMatch(s) => s.evaluate(flag_key, default_value, context).await,
            Strategy::FirstSuccess(s) => s.evaluate(flag_key, default_value, context).await,
            Strategy::Comparison(s) => s.evaluate(flag_key, default_value, context).await,
        }
    }
}
