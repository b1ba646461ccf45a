// Google OAuth2 strategy

use super::{StandardFlow, profile_from_oidc_userinfo};
use crate::config::ProviderConfig;
use crate::error::UpstreamError;
use crate::oauth2::{OAuth2Endpoints, http_client};
use crate::provider::Provider;
use crate::strategy::{AuthStrategy, CallbackRequest, RedirectInstruction, StrategyOutput};
use async_trait::async_trait;

pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const USER_INFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const SCOPES: &[&str] = &["email", "profile"];

/// Google sign-in through the authorization-code flow.
pub struct GoogleStrategy {
    endpoints: OAuth2Endpoints,
    http: reqwest::Client,
}

impl GoogleStrategy {
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
            provider: Provider::Google,
            endpoints: &self.endpoints,
            scopes: SCOPES,
            http: &self.http,
            map_profile: profile_from_oidc_userinfo,
        }
    }
}

impl Default for GoogleStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthStrategy for GoogleStrategy {
    fn provider(&self) -> Provider {
        Provider::Google
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StandardProviderConfig;
    use crate::profile::RawProfile;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> ProviderConfig {
        ProviderConfig::Standard(StandardProviderConfig::new(
            "google-id",
            "google-secret",
            "http://localhost:3000/oauth/google/callback",
        ))
    }

    #[tokio::test]
    async fn test_initiate_uses_google_endpoint_and_scopes() {
        let redirect = GoogleStrategy::new().initiate(&config()).await.unwrap();

        assert_eq!(redirect.url.host_str(), Some("accounts.google.com"));
        let query: std::collections::HashMap<_, _> = redirect.url.query_pairs().into_owned().collect();
        assert_eq!(query["scope"], "email profile");
        assert_eq!(query["client_id"], "google-id");
        assert_eq!(query["state"], redirect.state);
    }

    #[tokio::test]
    async fn test_complete_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=google-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer ya29.token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sub": "1157",
                "given_name": "Grace",
                "family_name": "Hopper",
                "email": "grace@example.com",
                "picture": "https://lh3.example.com/grace"
            })))
            .mount(&server)
            .await;

        let strategy = GoogleStrategy::with_endpoints(OAuth2Endpoints::new(
            format!("{}/auth", server.uri()),
            format!("{}/token", server.uri()),
            format!("{}/userinfo", server.uri()),
        ));
        let output = strategy
            .complete_exchange(&CallbackRequest::with_code("google-code"), &config())
            .await
            .unwrap();

        assert_eq!(output.access_token, "ya29.token");
        assert_eq!(output.refresh_token, None);
        let Some(RawProfile::Standard(profile)) = output.principal else {
            panic!("expected a standard profile");
        };
        assert_eq!(profile.id.as_deref(), Some("1157"));
        assert_eq!(
            profile.name.unwrap().family_name.as_deref(),
            Some("Hopper")
        );
    }

    #[tokio::test]
    async fn test_denied_consent_yields_no_principal() {
        let mut request = CallbackRequest::default();
        request.error = Some("access_denied".into());

        let output = GoogleStrategy::new()
            .complete_exchange(&request, &config())
            .await
            .unwrap();
        assert!(!output.has_principal());
    }

    #[tokio::test]
    async fn test_missing_code() {
        let result = GoogleStrategy::new()
            .complete_exchange(&CallbackRequest::default(), &config())
            .await;
        assert_eq!(result, Err(UpstreamError::MissingAuthorizationCode));
    }
}
