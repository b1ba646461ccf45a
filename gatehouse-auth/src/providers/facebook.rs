// Facebook OAuth2 strategy

use super::{StandardFlow, string_field};
use crate::config::ProviderConfig;
use crate::error::UpstreamError;
use crate::oauth2::{OAuth2Endpoints, http_client};
use crate::profile::{PersonName, ProfileValue, StandardProfile};
use crate::provider::Provider;
use crate::strategy::{AuthStrategy, CallbackRequest, RedirectInstruction, StrategyOutput};
use async_trait::async_trait;
use serde_json::Value;

pub const AUTH_URL: &str = "https://www.facebook.com/v24.0/dialog/oauth";
pub const TOKEN_URL: &str = "https://graph.facebook.com/v24.0/oauth/access_token";
pub const USER_INFO_URL: &str =
    "https://graph.facebook.com/me?fields=id,name,first_name,middle_name,last_name,email,picture";

const SCOPES: &[&str] = &["email", "public_profile"];

/// Facebook Login through the authorization-code flow.
pub struct FacebookStrategy {
    endpoints: OAuth2Endpoints,
    http: reqwest::Client,
}

impl FacebookStrategy {
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
            provider: Provider::Facebook,
            endpoints: &self.endpoints,
            scopes: SCOPES,
            http: &self.http,
            map_profile: profile_from_graph,
        }
    }
}

impl Default for FacebookStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// Graph API `/me` document. The picture lives at `picture.data.url`.
fn profile_from_graph(info: &Value) -> StandardProfile {
    let first_name = string_field(info, "first_name");
    let last_name = string_field(info, "last_name");
    let middle_name = string_field(info, "middle_name");
    let name = (first_name.is_some() || last_name.is_some()).then(|| PersonName {
        given_name: first_name,
        family_name: last_name,
        middle_name,
    });

    let picture = info
        .pointer("/picture/data/url")
        .and_then(Value::as_str)
        .map(|url| vec![ProfileValue::new(url)]);

    StandardProfile {
        id: string_field(info, "id"),
        display_name: string_field(info, "name"),
        name,
        emails: string_field(info, "email").map(|email| vec![ProfileValue::new(email)]),
        photos: picture,
    }
}

#[async_trait]
impl AuthStrategy for FacebookStrategy {
    fn provider(&self) -> Provider {
        Provider::Facebook
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
