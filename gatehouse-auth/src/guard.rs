// Request-time provider dispatch

use crate::config::{ConfigResolver, ProviderConfig};
use crate::error::{AuthError, Result, UpstreamError};
use crate::provider::Provider;
use crate::registry::StrategyRegistry;
use crate::strategy::{AuthStrategy, CallbackRequest, RedirectInstruction, StrategyOutput};
use async_trait::async_trait;
use gatehouse_core::{Guard, GuardContext};
use gatehouse_log::{Level, event};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const TARGET: &str = "gatehouse::guard";

/// Path parameter carrying the provider name.
pub const PROVIDER_PARAM: &str = "provider";

/// A validated request: the provider has a strategy and a complete configuration.
#[derive(Clone)]
pub struct Dispatch {
    pub provider: Provider,
    pub strategy: Arc<dyn AuthStrategy>,
    pub config: ProviderConfig,
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("provider", &self.provider)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Output of a callback, tagged with the provider it was dispatched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedExchange {
    pub provider: Provider,
    pub output: StrategyOutput,
}

/// Validates the requested provider and forwards to its strategy.
///
/// "No strategy" and "not configured" both surface as
/// [`AuthError::UnsupportedProvider`]; callers cannot tell which keys are
/// missing.
#[derive(Debug, Clone)]
pub struct DispatchGuard {
    registry: StrategyRegistry,
    resolver: ConfigResolver,
}

impl DispatchGuard {
    pub fn new(registry: StrategyRegistry, resolver: ConfigResolver) -> Self {
        Self { registry, resolver }
    }

    /// Built-in strategies, configuration from the process environment.
    pub fn from_env() -> Self {
        Self::new(StrategyRegistry::global().clone(), ConfigResolver::from_env())
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// The shared validation path of both entry points.
    pub fn validate(&self, provider: Option<&str>) -> Result<Dispatch> {
        let requested = match provider {
            Some(name) if !name.is_empty() => name.to_ascii_lowercase(),
            _ => {
                event!(target: TARGET, Level::Warn, "rejected request without provider");
                return Err(AuthError::MissingProvider);
            }
        };

        let Some(strategy) = self.registry.get(&requested) else {
            return Err(self.reject(requested));
        };
        let provider = strategy.provider();

        let Some(config) = self.resolver.resolve_provider(provider) else {
            return Err(self.reject(requested));
        };

        Ok(Dispatch {
            provider,
            strategy,
            config,
        })
    }

    fn reject(&self, requested: String) -> AuthError {
        event!(
            target: TARGET,
            Level::Warn,
            "rejected unsupported provider",
            provider = requested
        );
        AuthError::UnsupportedProvider(requested)
    }

    /// Supported means a strategy exists and the configuration resolves.
    pub fn is_supported(&self, provider: &str) -> bool {
        self.registry.contains(provider) && self.resolver.is_configured(provider)
    }

    /// Entry endpoint: build the redirect to the provider.
    pub async fn initiate(&self, provider: Option<&str>) -> Result<RedirectInstruction> {
        self.initiate_inner(provider, None).await
    }

    pub async fn initiate_with_cancellation(
        &self,
        provider: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<RedirectInstruction> {
        self.initiate_inner(provider, Some(cancel)).await
    }

    /// Callback endpoint: run the strategy's exchange.
    pub async fn callback(
        &self,
        provider: Option<&str>,
        request: &CallbackRequest,
    ) -> Result<CompletedExchange> {
        self.callback_inner(provider, request, None).await
    }

    /// Like [`callback`](Self::callback), but gives up with
    /// [`UpstreamError::Cancelled`] as soon as `cancel` fires. The in-flight
    /// provider call is dropped.
    pub async fn callback_with_cancellation(
        &self,
        provider: Option<&str>,
        request: &CallbackRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletedExchange> {
        self.callback_inner(provider, request, Some(cancel)).await
    }

    async fn initiate_inner(
        &self,
        provider: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> Result<RedirectInstruction> {
        let dispatch = self.validate(provider)?;
        event!(target: TARGET, Level::Debug, "forwarding to initiate", provider = dispatch.provider);

        let result = cancellable(dispatch.strategy.initiate(&dispatch.config), cancel).await;
        self.upstream(dispatch.provider, result)
            .map_err(AuthError::from)
    }

    async fn callback_inner(
        &self,
        provider: Option<&str>,
        request: &CallbackRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<CompletedExchange> {
        let dispatch = self.validate(provider)?;
        event!(target: TARGET, Level::Debug, "forwarding to exchange", provider = dispatch.provider);

        let result = cancellable(
            dispatch.strategy.complete_exchange(request, &dispatch.config),
            cancel,
        )
        .await;

        Ok(CompletedExchange {
            provider: dispatch.provider,
            output: self.upstream(dispatch.provider, result)?,
        })
    }

    fn upstream<T>(
        &self,
        provider: Provider,
        result: std::result::Result<T, UpstreamError>,
    ) -> std::result::Result<T, UpstreamError> {
        if let Err(err) = &result {
            event!(
                target: TARGET,
                Level::Error,
                "upstream exchange failed",
                provider = provider,
                error = err
            );
        }
        result
    }
}

impl Default for DispatchGuard {
    fn default() -> Self {
        Self::from_env()
    }
}

async fn cancellable<F, T>(
    future: F,
    cancel: Option<&CancellationToken>,
) -> std::result::Result<T, UpstreamError>
where
    F: Future<Output = std::result::Result<T, UpstreamError>>,
{
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(UpstreamError::Cancelled),
                result = future => result,
            }
        }
        None => future.await,
    }
}

#[async_trait]
impl Guard for DispatchGuard {
    async fn can_activate(&self, context: &GuardContext<'_>) -> gatehouse_core::Result<bool> {
        let provider = context.get_param(PROVIDER_PARAM).map(String::as_str);
        self.validate(provider).map(|_| true).map_err(Into::into)
    }
}
