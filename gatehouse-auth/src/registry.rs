// Strategy registry

use crate::provider::Provider;
use crate::providers::{AppleStrategy, FacebookStrategy, GoogleStrategy, LinkedInStrategy};
use crate::strategy::AuthStrategy;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

static BUILTIN: Lazy<StrategyRegistry> = Lazy::new(StrategyRegistry::builtin);

/// Immutable mapping from provider to strategy.
///
/// Built once and only read afterwards. Cloning shares the strategies.
#[derive(Clone)]
pub struct StrategyRegistry {
    // BTreeMap keyed by Provider iterates in compiled-in order
    strategies: BTreeMap<Provider, Arc<dyn AuthStrategy>>,
}

impl StrategyRegistry {
    /// One built-in strategy per provider.
    pub fn builtin() -> Self {
        Self::builder()
            .with_strategy(GoogleStrategy::new())
            .with_strategy(FacebookStrategy::new())
            .with_strategy(LinkedInStrategy::new())
            .with_strategy(AppleStrategy::new())
            .build()
    }

    /// Process-wide registry of the built-in strategies.
    pub fn global() -> &'static StrategyRegistry {
        &BUILTIN
    }

    /// Start from an empty registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Start from the built-ins, to replace or remove individual strategies.
    pub fn builtin_builder() -> RegistryBuilder {
        RegistryBuilder {
            strategies: Self::global().strategies.clone(),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, provider: &str) -> Option<Arc<dyn AuthStrategy>> {
        Provider::parse(provider).and_then(|provider| self.get_provider(provider))
    }

    pub fn get_provider(&self, provider: Provider) -> Option<Arc<dyn AuthStrategy>> {
        self.strategies.get(&provider).cloned()
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.get(provider).is_some()
    }

    /// Every registered strategy, configured or not, in compiled-in order.
    pub fn all(&self) -> Vec<Arc<dyn AuthStrategy>> {
        self.strategies.values().cloned().collect()
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.strategies.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::global().clone()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}

/// Assembles a [`StrategyRegistry`]. A strategy replaces any previous one for
/// the same provider.
#[derive(Default)]
pub struct RegistryBuilder {
    strategies: BTreeMap<Provider, Arc<dyn AuthStrategy>>,
}

impl RegistryBuilder {
    pub fn with_strategy(self, strategy: impl AuthStrategy + 'static) -> Self {
        self.with_shared(Arc::new(strategy))
    }

    pub fn with_shared(mut self, strategy: Arc<dyn AuthStrategy>) -> Self {
        self.strategies.insert(strategy.provider(), strategy);
        self
    }

    pub fn without(mut self, provider: Provider) -> Self {
        self.strategies.remove(&provider);
        self
    }

    pub fn build(self) -> StrategyRegistry {
        StrategyRegistry {
            strategies: self.strategies,
        }
    }
}
