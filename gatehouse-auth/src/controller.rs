// HTTP endpoints for the OAuth flow

use crate::guard::PROVIDER_PARAM;
use crate::service::OAuthService;
use crate::strategy::CallbackRequest;
use gatehouse_core::{Error, HttpRequest, HttpResponse};
use gatehouse_log::{Level, event};

pub const DEFAULT_PREFIX: &str = "/oauth";
/// Cookie binding the `state` of an authorization redirect to the browser.
pub const STATE_COOKIE: &str = "gatehouse_oauth_state";

const STATE_COOKIE_MAX_AGE: u32 = 600;

/// Endpoint a request path maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `{prefix}/{provider}`
    Authorize(String),
    /// `{prefix}/{provider}/callback`
    Callback(String),
    /// `{prefix}` or `{prefix}/` without a provider
    MissingProvider,
}

/// Serves `GET {prefix}/{provider}` and `GET|POST {prefix}/{provider}/callback`.
///
/// The redirect sets a [`STATE_COOKIE`] holding the issued `state`; a
/// callback whose `state` does not match it is rejected. Apple answers with
/// `response_mode=form_post`, a cross-site POST, so the cookie is
/// `SameSite=None` and therefore `Secure`.
#[derive(Debug, Clone)]
pub struct OAuthController {
    service: OAuthService,
    prefix: String,
    cookie_secure: bool,
}

impl OAuthController {
    pub fn new(service: OAuthService) -> Self {
        Self {
            service,
            prefix: DEFAULT_PREFIX.to_string(),
            cookie_secure: true,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    /// Drop the `Secure` flag for plain-HTTP development setups. The cookie
    /// is then `SameSite=Lax` and does not reach Apple's POST callback.
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn service(&self) -> &OAuthService {
        &self.service
    }

    pub fn route(&self, path: &str) -> Option<Route> {
        let path = path.split('?').next().unwrap_or(path);
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest == "/" {
            return Some(Route::MissingProvider);
        }

        let rest = rest.strip_prefix('/')?;
        let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        match segments.as_slice() {
            [""] => Some(Route::MissingProvider),
            [provider] => Some(Route::Authorize(provider.to_string())),
            ["", "callback"] => Some(Route::MissingProvider),
            [provider, "callback"] => Some(Route::Callback(provider.to_string())),
            _ => None,
        }
    }

    /// Route and answer a request. Errors are rendered as JSON.
    pub async fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let route = self.route(&request.path);
        let is_callback = matches!(route, Some(Route::Callback(_)));

        let result = match route {
            Some(Route::Authorize(provider)) if request.method.eq_ignore_ascii_case("GET") => {
                self.authorize(&request.clone().with_param(PROVIDER_PARAM, provider))
                    .await
            }
            Some(Route::Callback(provider))
                if request.method.eq_ignore_ascii_case("GET")
                    || request.method.eq_ignore_ascii_case("POST") =>
            {
                self.callback(&request.clone().with_param(PROVIDER_PARAM, provider))
                    .await
            }
            Some(Route::MissingProvider) => self.authorize(request).await,
            Some(_) => Err(Error::MethodNotAllowed(request.method.clone())),
            None => Err(Error::NotFound(request.path.clone())),
        };

        let response = result.unwrap_or_else(|err| {
            event!(
                target: "gatehouse::controller",
                Level::Debug,
                "request failed",
                path = request.path,
                status = err.status_code()
            );
            err.into_response()
        });

        // A state is good for one callback
        if is_callback {
            response.with_header("Set-Cookie".to_string(), self.state_cookie("", 0))
        } else {
            response
        }
    }

    /// `302` to the provider's authorization page.
    pub async fn authorize(&self, request: &HttpRequest) -> gatehouse_core::Result<HttpResponse> {
        let provider = request.param(PROVIDER_PARAM).map(String::as_str);
        let redirect = self.service.guard().initiate(provider).await?;
        Ok(HttpResponse::redirect(redirect.url.to_string()).with_header(
            "Set-Cookie".to_string(),
            self.state_cookie(&redirect.state, STATE_COOKIE_MAX_AGE),
        ))
    }

    /// JSON [`AuthResult`](crate::AuthResult) for the provider's callback.
    pub async fn callback(&self, request: &HttpRequest) -> gatehouse_core::Result<HttpResponse> {
        let provider = request.param(PROVIDER_PARAM).map(String::as_str);
        // No cookie means no state was issued to this browser
        let expected = request.cookie(STATE_COOKIE).unwrap_or_default();
        let callback = CallbackRequest::from_http(request)?.expecting_state(expected);

        // An empty name is rejected as a missing provider
        let result = self
            .service
            .authenticate(provider.unwrap_or_default(), &callback)
            .await?;
        HttpResponse::json(&result)
    }

    fn state_cookie(&self, value: &str, max_age: u32) -> String {
        let path = if self.prefix.is_empty() { "/" } else { self.prefix.as_str() };
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; HttpOnly",
            STATE_COOKIE, value, path, max_age
        );
        if self.cookie_secure {
            cookie.push_str("; Secure; SameSite=None");
        } else {
            cookie.push_str("; SameSite=Lax");
        }
        cookie
    }
}

impl Default for OAuthController {
    fn default() -> Self {
        Self::new(OAuthService::default())
    }
}
