// LinkedIn OpenID Connect strategy

use super::{StandardFlow, profile_from_oidc_userinfo};
use crate::config::ProviderConfig;
use crate::error::UpstreamError;
use crate::oauth2::{OAuth2Endpoints, http_client};
use crate::provider::Provider;
use crate::strategy::{AuthStrategy, CallbackRequest, RedirectInstruction, StrategyOutput};
use async_trait::async_trait;

pub const AUTH_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
pub const TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
pub const USER_INFO_URL: &str = "https://api.linkedin.com/v2/userinfo";

// The legacy r_liteprofile / r_emailaddress scopes are retired
const SCOPES: &[&str] = &["openid", "profile", "email"];

/// Sign In with LinkedIn using OpenID Connect.
pub struct LinkedInStrategy {
    endpoints: OAuth2Endpoints,
    http: reqwest::Client,
}

impl LinkedInStrategy {
    pub fn new() -> Self {
        Self::with_endpoints(OAuth2Endpoints::new(AUTH_URL, TOKEN_URL, USER_INFO_URL))
    }

    pub fn with_endpoints(endpoints: OAuth2Endpoints) -> Self {
        Self {
            endpoints,
            http: http_client(),
        }
    }

    fn flow(&self) -> StandardFlow<'_> {
        StandardFlow {
            provider: Provider::LinkedIn,
            endpoints: &self.endpoints,
            scopes: SCOPES,
            http: &self.http,
            map_profile: profile_from_oidc_userinfo,
        }
    }
}

impl Default for LinkedInStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthStrategy for LinkedInStrategy {
    fn provider(&self) -> Provider {
        Provider::LinkedIn
    }

    async fn initiate(&self, config: &ProviderConfig) -> Result<RedirectInstruction, UpstreamError> {
        self.flow().initiate(config).await
    }

    async fn complete_exchange(
        &self,
        request: &CallbackRequest,
        config: &ProviderConfig,
    ) -> Result<StrategyOutput, UpstreamError> {
        self.flow().complete(request, config).await
    }
}
