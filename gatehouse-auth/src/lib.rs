//! Provider dispatch and profile normalization for Gatehouse.
//!
//! A request names an identity provider (`google`, `facebook`, `linkedin`,
//! `apple`). The [`DispatchGuard`] checks that a strategy exists and that the
//! provider is fully configured, then forwards to the strategy. The callback
//! result is normalized into a [`CanonicalProfile`] and packaged as an
//! [`AuthResult`].
//!
//! ```no_run
//! use gatehouse_auth::{CallbackRequest, OAuthService};
//!
//! # async fn run() -> gatehouse_auth::Result<()> {
//! let service = OAuthService::from_env();
//!
//! let redirect = service.authorize("google").await?;
//! println!("send the user to {}", redirect.url);
//!
//! let result = service
//!     .authenticate("google", &CallbackRequest::with_code("4/0Ab..."))
//!     .await?;
//! println!("signed in {}", result.profile.id);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod finalize;
pub mod guard;
pub mod normalize;
pub mod oauth2;
pub mod profile;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod service;
pub mod strategy;

pub use catalog::{ProviderCatalog, ProviderConfigKeys, ProviderSupport, SupportedProviders};
pub use config::{
    AppleProviderConfig, ConfigResolver, HasRedirectUri, ProviderConfig, StandardProviderConfig,
};
pub use controller::{OAuthController, Route, STATE_COOKIE};
pub use error::{AuthError, Result, UpstreamError};
pub use finalize::{AuthResult, finalize};
pub use guard::{CompletedExchange, Dispatch, DispatchGuard};
pub use normalize::{normalize, normalize_value};
pub use oauth2::{OAuth2Client, OAuth2Endpoints, OAuth2Token};
pub use profile::{
    AppleName, AppleProfile, CanonicalProfile, PersonName, ProfileValue, RawProfile,
    StandardProfile,
};
pub use provider::{Provider, ProviderFamily, UnknownProvider};
pub use providers::{AppleStrategy, FacebookStrategy, GoogleStrategy, LinkedInStrategy};
pub use registry::{RegistryBuilder, StrategyRegistry};
pub use service::OAuthService;
pub use strategy::{AuthStrategy, CallbackRequest, RedirectInstruction, StrategyOutput};
pub use tokio_util::sync::CancellationToken;
