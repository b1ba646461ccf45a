// Built-in provider strategies

pub mod apple;
pub mod facebook;
pub mod google;
pub mod linkedin;

pub use apple::AppleStrategy;
pub use facebook::FacebookStrategy;
pub use google::GoogleStrategy;
pub use linkedin::LinkedInStrategy;

use crate::config::{ProviderConfig, StandardProviderConfig};
use crate::error::UpstreamError;
use crate::oauth2::{OAuth2Client, OAuth2Endpoints, fetch_user_info};
use crate::profile::{PersonName, ProfileValue, StandardProfile};
use crate::provider::Provider;
use crate::strategy::{CallbackRequest, RedirectInstruction, StrategyOutput};
use gatehouse_log::{debug, warn};
use serde_json::Value;

/// Endpoints, scopes and profile mapping of a standard-family provider.
pub(crate) struct StandardFlow<'a> {
    pub provider: Provider,
    pub endpoints: &'a OAuth2Endpoints,
    pub scopes: &'a [&'a str],
    pub http: &'a reqwest::Client,
    pub map_profile: fn(&Value) -> StandardProfile,
}

impl StandardFlow<'_> {
    fn client(&self, config: &ProviderConfig) -> Result<OAuth2Client, UpstreamError> {
        let config = standard_config(self.provider, config)?;
        OAuth2Client::new(config, self.endpoints, self.scopes, self.http.clone())
    }

    pub async fn initiate(
        &self,
        config: &ProviderConfig,
    ) -> Result<RedirectInstruction, UpstreamError> {
        Ok(self.client(config)?.authorization_url(&[]))
    }

    pub async fn complete(
        &self,
        request: &CallbackRequest,
        config: &ProviderConfig,
    ) -> Result<StrategyOutput, UpstreamError> {
        request.verify_state()?;

        if let Some(error) = &request.error {
            warn!(target: "gatehouse::strategy", "{} callback carried error: {}", self.provider, error);
            return Ok(StrategyOutput::unauthenticated());
        }

        let code = request.require_code()?;
        let client = self.client(config)?;
        let token = client.exchange_code(code).await?;
        debug!(target: "gatehouse::strategy", "{} code exchanged", self.provider);

        let info = fetch_user_info(self.http, &self.endpoints.user_info_url, &token.access_token).await?;
        let profile = (self.map_profile)(&info);

        Ok(StrategyOutput::authenticated(
            profile,
            token.access_token,
            token.refresh_token,
        ))
    }
}

fn standard_config(
    provider: Provider,
    config: &ProviderConfig,
) -> Result<&StandardProviderConfig, UpstreamError> {
    config.as_standard().ok_or_else(|| {
        UpstreamError::InvalidConfiguration(format!(
            "{} expects a client id / client secret configuration",
            provider.display_name()
        ))
    })
}

/// String field, accepting numbers too.
pub(crate) fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn single(value: Option<String>) -> Option<Vec<ProfileValue>> {
    value.map(|v| vec![ProfileValue::new(v)])
}

/// OpenID Connect userinfo (`sub`, `given_name`, `family_name`, `email`,
/// `picture`), as served by Google and LinkedIn.
pub(crate) fn profile_from_oidc_userinfo(info: &Value) -> StandardProfile {
    let given_name = string_field(info, "given_name");
    let family_name = string_field(info, "family_name");
    let name = (given_name.is_some() || family_name.is_some()).then(|| PersonName {
        given_name,
        family_name,
        middle_name: None,
    });

    StandardProfile {
        id: string_field(info, "sub").or_else(|| string_field(info, "id")),
        display_name: string_field(info, "name"),
        name,
        emails: single(string_field(info, "email")),
        photos: single(string_field(info, "picture")),
    }
}
