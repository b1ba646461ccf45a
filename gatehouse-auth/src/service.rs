// OAuth service facade

use crate::config::{ConfigResolver, ProviderConfig};
use crate::error::Result;
use crate::finalize::{AuthResult, finalize};
use crate::guard::DispatchGuard;
use crate::provider::Provider;
use crate::registry::StrategyRegistry;
use crate::strategy::{CallbackRequest, RedirectInstruction};
use gatehouse_config::ConfigSource;
use tokio_util::sync::CancellationToken;

/// Entry point for applications: dispatch, exchange and finalization in one
/// place.
#[derive(Debug, Clone, Default)]
pub struct OAuthService {
    guard: DispatchGuard,
}

impl OAuthService {
    pub fn new(registry: StrategyRegistry, resolver: ConfigResolver) -> Self {
        Self {
            guard: DispatchGuard::new(registry, resolver),
        }
    }

    /// Built-in strategies with configuration read from `source`.
    pub fn with_source(source: impl ConfigSource + 'static) -> Self {
        Self::new(
            StrategyRegistry::global().clone(),
            ConfigResolver::new(source),
        )
    }

    pub fn from_env() -> Self {
        Self {
            guard: DispatchGuard::from_env(),
        }
    }

    pub fn guard(&self) -> &DispatchGuard {
        &self.guard
    }

    /// Providers usable right now: a strategy exists and the configuration
    /// resolves. Compiled-in order.
    pub fn supported_providers(&self) -> Vec<Provider> {
        self.guard
            .resolver()
            .configured_providers()
            .into_iter()
            .filter(|provider| self.guard.registry().get_provider(*provider).is_some())
            .collect()
    }

    /// Every provider with a strategy, configured or not.
    pub fn all_providers(&self) -> Vec<Provider> {
        self.guard.registry().providers()
    }

    pub fn is_provider_supported(&self, provider: &str) -> bool {
        self.guard.is_supported(provider)
    }

    pub fn is_provider_configured(&self, provider: &str) -> bool {
        self.guard.resolver().is_configured(provider)
    }

    pub fn provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.guard.resolver().resolve(provider)
    }

    /// Redirect that starts the sign-in with `provider`.
    pub async fn authorize(&self, provider: &str) -> Result<RedirectInstruction> {
        self.guard.initiate(Some(provider)).await
    }

    /// Handle the provider's callback and build the [`AuthResult`].
    pub async fn authenticate(
        &self,
        provider: &str,
        callback: &CallbackRequest,
    ) -> Result<AuthResult> {
        let completed = self.guard.callback(Some(provider), callback).await?;
        finalize(completed.provider, completed.output)
    }

    pub async fn authenticate_with_cancellation(
        &self,
        provider: &str,
        callback: &CallbackRequest,
        cancel: &CancellationToken,
    ) -> Result<AuthResult> {
        let completed = self
            .guard
            .callback_with_cancellation(Some(provider), callback, cancel)
            .await?;
        finalize(completed.provider, completed.output)
    }
}
