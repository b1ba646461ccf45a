// Authentication strategies

use crate::config::ProviderConfig;
use crate::error::UpstreamError;
use crate::profile::RawProfile;
use crate::provider::Provider;
use async_trait::async_trait;
use gatehouse_core::HttpRequest;
use serde::Deserialize;
use url::Url;

/// One provider's OAuth2 / OIDC handshake.
///
/// Strategies are stateless: configuration is resolved per request and passed
/// in, so one instance serves every request.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn provider(&self) -> Provider;

    /// Build the redirect that sends the user to the provider.
    async fn initiate(&self, config: &ProviderConfig) -> Result<RedirectInstruction, UpstreamError>;

    /// Turn the provider's callback into a profile and tokens.
    async fn complete_exchange(
        &self,
        request: &CallbackRequest,
        config: &ProviderConfig,
    ) -> Result<StrategyOutput, UpstreamError>;
}

/// Where to send the user, plus the CSRF state embedded in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectInstruction {
    pub url: Url,
    pub state: String,
}

impl RedirectInstruction {
    pub fn new(url: Url, state: impl Into<String>) -> Self {
        Self {
            url,
            state: state.into(),
        }
    }
}

/// Authorization data posted or redirected back by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CallbackRequest {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    /// Apple's first-authorization `user` JSON.
    pub user: Option<String>,
    /// State issued by `initiate`, when the caller tracks it.
    #[serde(skip)]
    pub expected_state: Option<String>,
}

impl CallbackRequest {
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Read callback parameters from the query string and, for
    /// `form_post` callbacks, the urlencoded body. Body values win.
    pub fn from_http(request: &HttpRequest) -> gatehouse_core::Result<Self> {
        let query = |name: &str| request.query(name).cloned();
        let mut callback = Self {
            code: query("code"),
            state: query("state"),
            error: query("error"),
            error_description: query("error_description"),
            user: query("user"),
            expected_state: None,
        };

        if request.is_form() && !request.body.is_empty() {
            let form: CallbackRequest = request.form()?;
            callback.code = form.code.or(callback.code);
            callback.state = form.state.or(callback.state);
            callback.error = form.error.or(callback.error);
            callback.error_description = form.error_description.or(callback.error_description);
            callback.user = form.user.or(callback.user);
        }

        Ok(callback)
    }

    pub fn expecting_state(mut self, state: impl Into<String>) -> Self {
        self.expected_state = Some(state.into());
        self
    }

    /// The provider reported an error instead of a code (e.g. consent denied).
    pub fn was_denied(&self) -> bool {
        self.error.is_some()
    }

    /// Compare against `expected_state` when one was supplied. An empty
    /// expectation never matches.
    pub fn verify_state(&self) -> Result<(), UpstreamError> {
        match &self.expected_state {
            Some(expected)
                if expected.is_empty() || self.state.as_deref() != Some(expected.as_str()) =>
            {
                Err(UpstreamError::StateMismatch)
            }
            _ => Ok(()),
        }
    }

    pub fn require_code(&self) -> Result<&str, UpstreamError> {
        self.code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or(UpstreamError::MissingAuthorizationCode)
    }
}

/// What a strategy yields after the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutput {
    /// `None` when the provider did not authenticate anyone.
    pub principal: Option<RawProfile>,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl StrategyOutput {
    pub fn authenticated(
        profile: impl Into<RawProfile>,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            principal: Some(profile.into()),
            access_token: access_token.into(),
            // Providers sometimes send an empty string
            refresh_token: refresh_token.filter(|token| !token.is_empty()),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            principal: None,
            access_token: String::new(),
            refresh_token: None,
        }
    }

    pub fn has_principal(&self) -> bool {
        self.principal.is_some()
    }
}
