// Callback finalization

use crate::error::{AuthError, Result};
use crate::normalize::normalize;
use crate::profile::CanonicalProfile;
use crate::provider::Provider;
use crate::strategy::StrategyOutput;
use gatehouse_log::{Level, event};
use serde::{Deserialize, Serialize};

/// What a successful callback hands back to the application.
///
/// `refreshToken` is always present on the wire, `null` when the provider
/// did not issue one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub profile: CanonicalProfile,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Package a completed exchange, or fail with
/// [`AuthError::AuthenticationFailed`] when nobody was authenticated.
pub fn finalize(provider: Provider, output: StrategyOutput) -> Result<AuthResult> {
    let Some(principal) = output.principal else {
        event!(
            target: "gatehouse::finalize",
            Level::Warn,
            "callback produced no principal",
            provider = provider
        );
        return Err(AuthError::AuthenticationFailed);
    };

    let profile = normalize(provider, &principal);
    event!(
        target: "gatehouse::finalize",
        Level::Info,
        "authentication completed",
        provider = provider,
        refresh_token = output.refresh_token.is_some()
    );

    Ok(AuthResult {
        profile,
        access_token: output.access_token,
        refresh_token: output.refresh_token,
    })
}
