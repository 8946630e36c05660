//! Integration tests for multi-provider
//!
//! These tests drive the public façade the way an application would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use multi_provider::prelude::*;
use multi_provider::{
    ConfigError, NamedProviderSet, FALLBACK_USED, NO_FALLBACK_CONFIGURED, OBJECT_NOT_COMPARABLE,
};
use serde_json::{json, Value};

// =============================================================================
// Test Providers
// =============================================================================

/// An in-memory flag store that answers from a fixed table.
#[derive(Debug)]
struct TableProvider {
    name: String,
    flags: HashMap<String, Value>,
    failure: Option<(ErrorKind, String)>,
    delay: Duration,
    calls: AtomicUsize,
}

impl TableProvider {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: HashMap::new(),
            failure: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_flag(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.flags.insert(key.to_string(), value.into());
        self
    }

    fn failing(mut self, kind: ErrorKind, message: &str) -> Self {
        self.failure = Some((kind, message.to_string()));
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn lookup<T>(
        &self,
        flag_key: &str,
        default_value: T,
        convert: fn(&Value) -> Option<T>,
    ) -> ResultEnvelope<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some((kind, message)) = &self.failure {
            return ResultEnvelope::failed(
                default_value,
                ResolutionError::new(kind.clone(), message.clone()),
            );
        }
        match self.flags.get(flag_key) {
            None => ResultEnvelope::failed(
                default_value,
                ResolutionError::flag_not_found(format!("{} is not defined", flag_key)),
            ),
            Some(raw) => match convert(raw) {
                Some(value) => ResultEnvelope::resolved(value, Reason::TargetingMatch)
                    .with_variant(format!("{}-variant", self.name)),
                None => ResultEnvelope::failed(
                    default_value,
                    ResolutionError::new(ErrorKind::TypeMismatch, "unexpected type"),
                ),
            },
        }
    }
}

#[async_trait]
impl FeatureProvider for TableProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata::new(self.name.clone())
    }

    async fn resolve_bool_value(
        &self,
        flag_key: &str,
        default_value: bool,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<bool> {
        self.lookup(flag_key, default_value, Value::as_bool).await
    }

    async fn resolve_string_value(
        &self,
        flag_key: &str,
        default_value: String,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<String> {
        self.lookup(flag_key, default_value, |v| v.as_str().map(str::to_string))
            .await
    }

    async fn resolve_int_value(
        &self,
        flag_key: &str,
        default_value: i64,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<i64> {
        self.lookup(flag_key, default_value, Value::as_i64).await
    }

    async fn resolve_float_value(
        &self,
        flag_key: &str,
        default_value: f64,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<f64> {
        self.lookup(flag_key, default_value, Value::as_f64).await
    }

    async fn resolve_struct_value(
        &self,
        flag_key: &str,
        default_value: StructuredValue,
        _context: &EvaluationContext,
    ) -> ResultEnvelope<StructuredValue> {
        self.lookup(flag_key, default_value, |v| Some(v.clone()))
            .await
    }
}

fn named(providers: &[&Arc<TableProvider>]) -> NamedProviderSet {
    let mut builder = NamedProviderSet::builder();
    for provider in providers {
        let name = provider.name.clone();
        builder.register(name, Arc::clone(*provider) as Arc<dyn FeatureProvider>).unwrap();
    }
    builder.build()
}

fn engine(
    strategy: StrategyKind,
    providers: NamedProviderSet,
    fallback: Option<Arc<dyn FeatureProvider>>,
) -> MultiProvider {
    let mut builder = MultiProvider::builder()
        .config(
            EngineConfig::new()
                .with_strategy(strategy)
                .with_timeout(Duration::from_secs(1)),
        )
        .providers(providers);
    if let Some(fallback) = fallback {
        builder = builder.fallback(fallback);
    }
    builder.build().unwrap()
}

// =============================================================================
// First Match
// =============================================================================

#[tokio::test]
async fn test_first_match_skips_missing_flags() {
    let local = Arc::new(TableProvider::new("local").with_flag("other", true));
    let remote = Arc::new(TableProvider::new("remote").with_flag("checkout", "v2"));
    let unused = Arc::new(TableProvider::new("unused").with_flag("checkout", "v3"));
    let engine = engine(
        StrategyKind::FirstMatch,
        named(&[&local, &remote, &unused]),
        None,
    );

    let details = engine
        .string_evaluation("checkout", "v1", &EvaluationContext::new())
        .await;

    assert_eq!(details.flag_key, "checkout");
    assert_eq!(details.value, "v2");
    assert_eq!(details.reason, "TARGETING_MATCH");
    assert_eq!(details.variant.as_deref(), Some("remote-variant"));
    assert_eq!(details.metadata_str(SUCCESSFUL_PROVIDER_NAME), Some("remote"));
    assert_eq!(details.metadata_str(STRATEGY_USED), Some("first-match"));
    assert_eq!(unused.calls(), 0);
}

#[tokio::test]
async fn test_first_match_type_mismatch_is_hard() {
    let wrong = Arc::new(TableProvider::new("wrong").with_flag("limit", "ten"));
    let right = Arc::new(TableProvider::new("right").with_flag("limit", 10));
    let engine = engine(StrategyKind::FirstMatch, named(&[&wrong, &right]), None);

    let details = engine
        .int_evaluation("limit", 1, &EvaluationContext::new())
        .await;

    assert_eq!(details.value, 1);
    assert_eq!(details.reason, "ERROR");
    assert_eq!(details.error.unwrap().kind, ErrorKind::TypeMismatch);
    assert_eq!(right.calls(), 0);
}

// =============================================================================
// First Success
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_success_prefers_success_over_fast_failure() {
    let slow = Arc::new(
        TableProvider::new("slow")
            .with_flag("ratio", 0.25)
            .with_delay(Duration::from_millis(500)),
    );
    let flaky = Arc::new(
        TableProvider::new("flaky")
            .failing(ErrorKind::General, "connection reset")
            .with_delay(Duration::from_millis(5)),
    );
    let engine = engine(StrategyKind::FirstSuccess, named(&[&slow, &flaky]), None);

    let details = engine
        .float_evaluation("ratio", 0.0, &EvaluationContext::new())
        .await;

    assert_eq!(details.value, 0.25);
    assert!(!details.is_error());
    assert_eq!(details.metadata_str(SUCCESSFUL_PROVIDER_NAME), Some("slow"));
}

#[tokio::test]
async fn test_first_success_names_every_failed_provider() {
    let a = Arc::new(TableProvider::new("east").failing(ErrorKind::ProviderNotReady, "warming up"));
    let b = Arc::new(TableProvider::new("west").failing(ErrorKind::from_code("QUOTA"), "quota"));
    let c = Arc::new(TableProvider::new("north").failing(ErrorKind::General, "boom"));
    let engine = engine(StrategyKind::FirstSuccess, named(&[&a, &b, &c]), None);

    let details = engine
        .boolean_evaluation("dark-mode", true, &EvaluationContext::new())
        .await;

    assert!(details.value);
    let error = details.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Aggregate);
    for name in ["east", "west", "north"] {
        assert!(error.message.contains(name), "missing {} in {}", name, error.message);
    }
    assert!(error.message.contains("QUOTA"));
}

#[tokio::test]
async fn test_first_success_object_evaluation() {
    let store = Arc::new(TableProvider::new("store").with_flag("layout", json!({"cols": 3})));
    let engine = engine(StrategyKind::FirstSuccess, named(&[&store]), None);

    let details = engine
        .object_evaluation("layout", json!({}), &EvaluationContext::new())
        .await;

    assert_eq!(details.value, json!({"cols": 3}));
    assert_eq!(details.metadata_str(SUCCESSFUL_PROVIDER_NAME), Some("store"));
}

// =============================================================================
// Comparison
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_comparison_agreement_of_three() {
    let a = Arc::new(
        TableProvider::new("a")
            .with_flag("tier", 2)
            .with_delay(Duration::from_millis(20)),
    );
    let b = Arc::new(
        TableProvider::new("b")
            .with_flag("tier", 2)
            .with_delay(Duration::from_millis(5)),
    );
    let c = Arc::new(
        TableProvider::new("c")
            .with_flag("tier", 2)
            .with_delay(Duration::from_millis(40)),
    );
    let engine = engine(StrategyKind::Comparison, named(&[&a, &b, &c]), None);

    let details = engine
        .int_evaluation("tier", 0, &EvaluationContext::new())
        .await;

    assert_eq!(details.value, 2);
    let names = details.metadata_str(SUCCESSFUL_PROVIDER_NAMES).unwrap();
    assert_eq!(names, "b, a, c");
    assert_eq!(details.metadata_bool(FALLBACK_USED), Some(false));
}

#[tokio::test]
async fn test_comparison_agreement_names_are_a_permutation() {
    // Completion order of concurrent providers is not deterministic; only
    // the set of names is.
    let a = Arc::new(TableProvider::new("a").with_flag("on", true));
    let b = Arc::new(TableProvider::new("b").with_flag("on", true));
    let c = Arc::new(TableProvider::new("c").with_flag("on", true));
    let engine = engine(StrategyKind::Comparison, named(&[&a, &b, &c]), None);

    let details = engine
        .boolean_evaluation("on", false, &EvaluationContext::new())
        .await;

    let mut names: Vec<&str> = details
        .metadata_str(SUCCESSFUL_PROVIDER_NAMES)
        .unwrap()
        .split(", ")
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_comparison_disagreement_with_fallback() {
    let a = Arc::new(TableProvider::new("a").with_flag("banner", "spring"));
    let b = Arc::new(TableProvider::new("b").with_flag("banner", "summer"));
    let authority = Arc::new(TableProvider::new("authority").with_flag("banner", "autumn"));
    let engine = engine(
        StrategyKind::Comparison,
        named(&[&a, &b]),
        Some(authority.clone() as Arc<dyn FeatureProvider>),
    );

    let details = engine
        .string_evaluation("banner", "none", &EvaluationContext::new())
        .await;

    assert_eq!(details.value, "autumn");
    assert_eq!(details.variant.as_deref(), Some("authority-variant"));
    assert_eq!(details.metadata_str(SUCCESSFUL_PROVIDER_NAME), Some("fallback"));
    assert_eq!(details.metadata_bool(FALLBACK_USED), Some(true));
    assert_eq!(authority.calls(), 1);
}

#[tokio::test]
async fn test_comparison_disagreement_without_fallback() {
    let a = Arc::new(TableProvider::new("a").with_flag("banner", "spring"));
    let b = Arc::new(TableProvider::new("b").with_flag("banner", "summer"));
    let engine = engine(StrategyKind::Comparison, named(&[&a, &b]), None);

    let details = engine
        .string_evaluation("banner", "none", &EvaluationContext::new())
        .await;

    assert_eq!(details.value, "none");
    assert_eq!(details.error.unwrap().message, NO_FALLBACK_CONFIGURED);
}

#[tokio::test]
async fn test_comparison_object_evaluation_is_refused() {
    let a = Arc::new(TableProvider::new("a").with_flag("layout", json!({"cols": 2})));
    let b = Arc::new(TableProvider::new("b").with_flag("layout", json!({"cols": 2})));
    let engine = engine(StrategyKind::Comparison, named(&[&a, &b]), None);

    let details = engine
        .object_evaluation("layout", json!({"cols": 1}), &EvaluationContext::new())
        .await;

    assert_eq!(details.value, json!({"cols": 1}));
    assert_eq!(details.reason, "DEFAULT");
    assert_eq!(details.error.unwrap().message, OBJECT_NOT_COMPARABLE);
    assert_eq!(a.calls() + b.calls(), 0);
}

// =============================================================================
// Construction and composition
// =============================================================================

#[test]
fn test_fallback_rejected_outside_comparison() {
    let a = Arc::new(TableProvider::new("a"));
    let result = MultiProvider::builder()
        .config(EngineConfig::new().with_strategy(StrategyKind::FirstMatch))
        .providers(named(&[&a]))
        .fallback(Arc::new(TableProvider::new("fb")))
        .build();

    assert!(matches!(
        result,
        Err(MultiProviderError::Config(ConfigError::Invalid(_)))
    ));
}

#[test]
fn test_zero_timeout_rejected() {
    let result = MultiProvider::builder()
        .config(
            EngineConfig::new()
                .with_strategy(StrategyKind::FirstSuccess)
                .with_timeout(Duration::ZERO),
        )
        .build();

    assert!(result.is_err());
}

#[tokio::test]
async fn test_engines_nest_as_providers() {
    let inner_a = Arc::new(TableProvider::new("inner-a"));
    let inner_b = Arc::new(TableProvider::new("inner-b").with_flag("beta", true));
    let inner = engine(StrategyKind::FirstMatch, named(&[&inner_a, &inner_b]), None);
    let outer_other = Arc::new(TableProvider::new("other").with_flag("beta", true));

    let providers = NamedProviderSet::from_providers(vec![
        Arc::new(inner) as Arc<dyn FeatureProvider>,
        outer_other as Arc<dyn FeatureProvider>,
    ]);
    assert_eq!(providers.names(), vec!["multi-provider", "other"]);

    let outer = engine(StrategyKind::Comparison, providers, None);
    let details = outer
        .boolean_evaluation("beta", false, &EvaluationContext::new())
        .await;

    assert!(details.value);
    let mut names: Vec<&str> = details
        .metadata_str(SUCCESSFUL_PROVIDER_NAMES)
        .unwrap()
        .split(", ")
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["multi-provider", "other"]);
    assert!(details.metadata_str(SUCCESSFUL_PROVIDER_NAME).is_none());
}

#[tokio::test]
async fn test_repeated_evaluations_are_stable() {
    let a = Arc::new(TableProvider::new("a").with_flag("limit", 5));
    let b = Arc::new(TableProvider::new("b").with_flag("limit", 5));
    let context = EvaluationContext::new()
        .with_targeting_key("user-42")
        .with_attribute("plan", "pro");

    for strategy in [
        StrategyKind::FirstMatch,
        StrategyKind::FirstSuccess,
        StrategyKind::Comparison,
    ] {
        // A single provider keeps provenance free of race ordering.
        let engine = engine(strategy, named(&[&a]), None);
        let first = engine.int_evaluation("limit", 0, &context).await;
        let second = engine.int_evaluation("limit", 0, &context).await;
        assert_eq!(first, second, "{} is not stable", strategy);
    }

    let engine = engine(StrategyKind::FirstMatch, named(&[&a, &b]), None);
    let results = futures::future::join_all(
        (0..8).map(|_| engine.int_evaluation("limit", 0, &context)),
    )
    .await;
    assert!(results.iter().all(|d| d.value == 5));
    assert_eq!(b.calls(), 0);
}
