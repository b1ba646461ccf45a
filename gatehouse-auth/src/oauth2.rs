// OAuth2 authorization-code client shared by the standard strategies

use crate::config::StandardProviderConfig;
use crate::error::UpstreamError;
use crate::strategy::RedirectInstruction;
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicErrorResponseType, BasicTokenResponse};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Endpoints of one provider. Overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2Endpoints {
    pub auth_url: String,
    pub token_url: String,
    pub user_info_url: String,
}

impl OAuth2Endpoints {
    pub fn new(
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
        user_info_url: impl Into<String>,
    ) -> Self {
        Self {
            auth_url: auth_url.into(),
            token_url: token_url.into(),
            user_info_url: user_info_url.into(),
        }
    }
}

/// OAuth2 token response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

impl From<BasicTokenResponse> for OAuth2Token {
    fn from(token: BasicTokenResponse) -> Self {
        Self {
            access_token: token.access_token().secret().clone(),
            token_type: token.token_type().as_ref().to_string(),
            expires_in: token.expires_in().map(|d| d.as_secs()),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            scope: token.scopes().map(|s| {
                s.iter()
                    .map(|scope| scope.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            }),
        }
    }
}

/// Authorization-code client for one request.
pub struct OAuth2Client {
    client: ConfiguredClient,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl OAuth2Client {
    pub fn new(
        config: &StandardProviderConfig,
        endpoints: &OAuth2Endpoints,
        scopes: &[&str],
        http: reqwest::Client,
    ) -> Result<Self, UpstreamError> {
        let invalid = |what: &str, e: url::ParseError| {
            UpstreamError::InvalidConfiguration(format!("invalid {}: {}", what, e))
        };

        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(endpoints.auth_url.clone())
                    .map_err(|e| invalid("authorization URL", e))?,
            )
            .set_token_uri(
                TokenUrl::new(endpoints.token_url.clone()).map_err(|e| invalid("token URL", e))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(config.redirect_uri.clone())
                    .map_err(|e| invalid("callback URL", e))?,
            )
            // Facebook and LinkedIn only read credentials from the body
            .set_auth_type(AuthType::RequestBody);

        Ok(Self {
            client,
            scopes: scopes.iter().map(|scope| scope.to_string()).collect(),
            http,
        })
    }

    /// Authorization URL with a fresh random state and the configured scopes.
    pub fn authorization_url(&self, extra_params: &[(&str, &str)]) -> RedirectInstruction {
        let mut request = self.client.authorize_url(CsrfToken::new_random);

        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }
        for (name, value) in extra_params {
            request = request.add_extra_param(*name, *value);
        }

        let (url, state) = request.url();
        RedirectInstruction::new(url, state.secret().clone())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<OAuth2Token, UpstreamError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(map_token_error)?;

        Ok(token.into())
    }
}

/// GET a JSON user-info document with a bearer token.
pub async fn fetch_user_info(
    http: &reqwest::Client,
    url: &str,
    access_token: &str,
) -> Result<Value, UpstreamError> {
    let response = http
        .get(url)
        .bearer_auth(access_token)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| UpstreamError::Network(format!("User info request failed: {}", e)))?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(UpstreamError::InvalidGrant(
            "Access token rejected by user info endpoint".to_string(),
        ));
    }
    if !status.is_success() {
        return Err(UpstreamError::InvalidResponse(format!(
            "User info request failed with status: {}",
            status
        )));
    }

    response
        .json()
        .await
        .map_err(|e| UpstreamError::InvalidResponse(format!("Failed to parse user info: {}", e)))
}

/// HTTP client used for provider calls. Redirects are never followed.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_default()
}

pub(crate) fn map_token_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> UpstreamError
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => {
            let detail = response
                .error_description()
                .cloned()
                .unwrap_or_else(|| response.error().to_string());
            match response.error() {
                BasicErrorResponseType::InvalidGrant
                | BasicErrorResponseType::InvalidClient
                | BasicErrorResponseType::UnauthorizedClient => UpstreamError::InvalidGrant(detail),
                _ => UpstreamError::InvalidResponse(detail),
            }
        }
        RequestTokenError::Request(e) => {
            UpstreamError::Network(format!("Token request failed: {}", e))
        }
        RequestTokenError::Parse(e, _) => {
            UpstreamError::InvalidResponse(format!("Failed to parse token response: {}", e))
        }
        RequestTokenError::Other(message) => UpstreamError::InvalidResponse(message),
    }
}
