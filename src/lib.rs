// Gatehouse - An identity provider gateway for Rust
//
// Dispatches sign-in requests to Google, Facebook, LinkedIn and Apple,
// completes the authorization-code exchange and normalizes the returned
// profiles into one shape.

// Re-export core functionality
pub use gatehouse_core::*;

// Logging is always available
pub use gatehouse_log as log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use gatehouse_config;

#[cfg(feature = "auth")]
pub use gatehouse_auth;

// Prelude for common imports
pub mod prelude {
    pub use crate::{Error, Guard, HttpRequest, HttpResponse, Result};

    #[cfg(feature = "config")]
    pub use gatehouse_config::{ConfigSource, EnvSource, LayeredSource, MapSource};

    #[cfg(feature = "auth")]
    pub use gatehouse_auth::{
        AuthError, AuthResult, AuthStrategy, CallbackRequest, CanonicalProfile, ConfigResolver,
        DispatchGuard, OAuthController, OAuthService, Provider, ProviderCatalog,
        StrategyRegistry,
    };
}
