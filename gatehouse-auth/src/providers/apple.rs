// Sign in with Apple

use crate::config::{AppleProviderConfig, ProviderConfig};
use crate::error::UpstreamError;
use crate::oauth2::http_client;
use crate::profile::{AppleName, AppleProfile};
use crate::provider::Provider;
use crate::strategy::{AuthStrategy, CallbackRequest, RedirectInstruction, StrategyOutput};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use gatehouse_log::{debug, warn};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use oauth2::CsrfToken;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const AUTH_URL: &str = "https://appleid.apple.com/auth/authorize";
pub const TOKEN_URL: &str = "https://appleid.apple.com/auth/token";
/// Audience of the client assertion.
pub const AUDIENCE: &str = "https://appleid.apple.com";

const SCOPE: &str = "name email";
const ASSERTION_LIFETIME_SECS: i64 = 300;

/// Claims of the client assertion sent as `client_secret`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientAssertionClaims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
    pub sub: String,
}

#[derive(Debug, Deserialize)]
struct AppleTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppleErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// The `user` form field Apple posts on first authorization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FirstAuthorizationUser {
    name: Option<AppleName>,
    email: Option<String>,
}

/// Sign in with Apple. Uses `response_mode=form_post`, so the callback
/// arrives as a POST with a urlencoded body.
pub struct AppleStrategy {
    auth_url: String,
    token_url: String,
    http: reqwest::Client,
}

impl AppleStrategy {
    pub fn new() -> Self {
        Self::with_endpoints(AUTH_URL, TOKEN_URL)
    }

    pub fn with_endpoints(auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            token_url: token_url.into(),
            http: http_client(),
        }
    }

    /// ES256 client assertion, valid for five minutes.
    pub fn client_assertion(config: &AppleProviderConfig) -> Result<String, UpstreamError> {
        let now = chrono::Utc::now().timestamp();
        let claims = ClientAssertionClaims {
            iss: config.team_id.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
            aud: AUDIENCE.to_string(),
            sub: config.client_id.clone(),
        };

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(config.key_id.clone());

        let key = EncodingKey::from_ec_pem(config.private_key_pem().as_bytes()).map_err(|e| {
            UpstreamError::InvalidConfiguration(format!("Invalid Apple private key: {}", e))
        })?;

        encode(&header, &claims, &key).map_err(|e| {
            UpstreamError::InvalidConfiguration(format!("Failed to sign client assertion: {}", e))
        })
    }

    async fn exchange_code(
        &self,
        code: &str,
        config: &AppleProviderConfig,
    ) -> Result<AppleTokenResponse, UpstreamError> {
        let client_secret = Self::client_assertion(config)?;
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Network(format!("Token response read failed: {}", e)))?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<AppleErrorResponse>(&body) {
                Ok(err) if matches!(err.error.as_str(), "invalid_grant" | "invalid_client") => {
                    UpstreamError::InvalidGrant(err.error_description.unwrap_or(err.error))
                }
                Ok(err) => UpstreamError::InvalidResponse(err.error_description.unwrap_or(err.error)),
                Err(_) => UpstreamError::InvalidResponse(format!(
                    "Token endpoint returned {}",
                    status
                )),
            });
        }

        serde_json::from_slice(&body).map_err(|e| {
            UpstreamError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })
    }
}

impl Default for AppleStrategy {
    fn default() -> Self {
        Self::new()
    }
}

fn apple_config(config: &ProviderConfig) -> Result<&AppleProviderConfig, UpstreamError> {
    config.as_apple().ok_or_else(|| {
        UpstreamError::InvalidConfiguration(
            "Apple expects a service id / team id / key configuration".to_string(),
        )
    })
}

/// Claims of an identity token, read without verifying the signature. The
/// token comes straight from Apple's token endpoint over TLS.
fn decode_id_token(token: &str) -> Result<Value, UpstreamError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(UpstreamError::InvalidResponse("Invalid id_token format".to_string())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| UpstreamError::InvalidResponse(format!("id_token decode failed: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| UpstreamError::InvalidResponse(format!("id_token parse failed: {}", e)))
}

/// Build the raw profile from identity token claims and the optional `user`
/// form field.
fn apple_profile(claims: &Value, user: Option<&str>) -> AppleProfile {
    let user: FirstAuthorizationUser = match user {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!(target: "gatehouse::strategy", "ignoring malformed Apple user payload: {}", e);
            FirstAuthorizationUser::default()
        }),
        None => FirstAuthorizationUser::default(),
    };

    let claim = |key: &str| claims.get(key).and_then(Value::as_str).map(str::to_string);

    AppleProfile {
        id: claim("sub"),
        email: claim("email").or(user.email),
        name: user.name,
    }
}

#[async_trait]
impl AuthStrategy for AppleStrategy {
    fn provider(&self) -> Provider {
        Provider::Apple
    }

    async fn initiate(&self, config: &ProviderConfig) -> Result<RedirectInstruction, UpstreamError> {
        let config = apple_config(config)?;
        let state = CsrfToken::new_random().secret().clone();

        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("response_type", "code"),
                ("response_mode", "form_post"),
                ("client_id", config.client_id.as_str()),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("scope", SCOPE),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| {
            UpstreamError::InvalidConfiguration(format!("invalid authorization URL: {}", e))
        })?;

        Ok(RedirectInstruction::new(url, state))
    }

    async fn complete_exchange(
        &self,
        request: &CallbackRequest,
        config: &ProviderConfig,
    ) -> Result<StrategyOutput, UpstreamError> {
        request.verify_state()?;

        if let Some(error) = &request.error {
            warn!(target: "gatehouse::strategy", "apple callback carried error: {}", error);
            return Ok(StrategyOutput::unauthenticated());
        }

        let config = apple_config(config)?;
        let code = request.require_code()?;
        let token = self.exchange_code(code, config).await?;
        debug!(target: "gatehouse::strategy", "apple code exchanged");

        // Claims are read unverified, so only the token endpoint's copy counts
        let id_token = token.id_token.as_deref().ok_or_else(|| {
            UpstreamError::InvalidResponse("Apple token response has no id_token".to_string())
        })?;
        let claims = decode_id_token(id_token)?;
        let profile = apple_profile(&claims, request.user.as_deref());

        Ok(StrategyOutput::authenticated(
            profile,
            token.access_token,
            token.refresh_token,
        ))
    }
}
