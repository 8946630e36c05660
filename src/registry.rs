//! Ordered set of uniquely named providers.
//!
//! A `NamedProviderSet` is the input every strategy works from. Registration
//! order is preserved; it is the iteration order of the first-match strategy.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};
use crate::provider::{FeatureProvider, NamedProvider};

/// An immutable, ordered list of `(unique name, provider)` pairs.
///
/// # Example
///
/// ```rust,ignore
/// use multi_provider::NamedProviderSet;
///
/// let providers = NamedProviderSet::builder()
///     .with_named("primary", primary)?
///     .with_named("secondary", secondary)?
///     .build();
///
/// assert_eq!(providers.names(), vec!["primary", "secondary"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NamedProviderSet {
    providers: Vec<NamedProvider>,
}

impl NamedProviderSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a set with explicit names.
    pub fn builder() -> NamedProviderSetBuilder {
        NamedProviderSetBuilder::new()
    }

    /// Build a set naming each provider after its metadata name.
    ///
    /// Names shared by several providers are made unique by suffixing every
    /// holder of that name with `-1`, `-2`, ... in registration order. A
    /// suffix already taken by another provider's own name is skipped.
    pub fn from_providers(providers: Vec<Arc<dyn FeatureProvider>>) -> Self {
        let base_names: Vec<String> = providers.iter().map(|p| p.metadata().name).collect();

        let mut totals: HashMap<&str, usize> = HashMap::new();
        for name in &base_names {
            *totals.entry(name.as_str()).or_default() += 1;
        }

        let mut taken: HashSet<String> = base_names
            .iter()
            .filter(|name| totals[name.as_str()] == 1)
            .cloned()
            .collect();
        let mut counters: HashMap<&str, usize> = HashMap::new();
        let named = base_names
            .iter()
            .zip(providers.iter())
            .map(|(name, provider)| {
                let unique = if totals[name.as_str()] > 1 {
                    let index = counters.entry(name.as_str()).or_default();
                    loop {
                        *index += 1;
                        let candidate = format!("{}-{}", name, index);
                        if taken.insert(candidate.clone()) {
                            break candidate;
                        }
                    }
                } else {
                    name.clone()
                };
                NamedProvider::new(unique, Arc::clone(provider))
            })
            .collect();

        Self { providers: named }
    }

    /// Get a provider by name.
    pub fn get(&self, name: &str) -> Option<&NamedProvider> {
        self.providers.iter().find(|p| p.name() == name)
    }

    /// Check if a provider with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get the names of all providers in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Get the number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Iterate over providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedProvider> {
        self.providers.iter()
    }
}

impl<'a> IntoIterator for &'a NamedProviderSet {
    type Item = &'a NamedProvider;
    type IntoIter = std::slice::Iter<'a, NamedProvider>;

    fn into_iter(self) -> Self::IntoIter {
        self.providers.iter()
    }
}

/// Builder for provider sets with explicit, validated names.
#[derive(Debug, Default)]
pub struct NamedProviderSetBuilder {
    providers: Vec<NamedProvider>,
    names: HashSet<String>,
}

impl NamedProviderSetBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider under the given name.
    ///
    /// Fails if the name is empty or already taken.
    pub fn with_named(
        mut self,
        name: impl Into<String>,
        provider: Arc<dyn FeatureProvider>,
    ) -> RegistryResult<Self> {
        self.register(name, provider)?;
        Ok(self)
    }

    /// Add a provider under the given name, in place.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        provider: Arc<dyn FeatureProvider>,
    ) -> RegistryResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidName(name));
        }
        if !self.names.insert(name.clone()) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.providers.push(NamedProvider::new(name, provider));
        Ok(())
    }

    /// Build the set.
    pub fn build(self) -> NamedProviderSet {
        NamedProviderSet {
            providers: self.providers,
        }
    }
}
