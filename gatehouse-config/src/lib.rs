//! Flat key-value configuration for Gatehouse.
//!
//! Everything downstream consumes a [`ConfigSource`]: a string lookup by key
//! name such as `GOOGLE_CLIENT_ID`. Sources are read on every lookup and never
//! cache, so configuration changes are picked up by the next request.
//!
//! ```rust
//! use gatehouse_config::{ConfigSource, LayeredSource, MapSource, EnvSource};
//!
//! let overrides = MapSource::from_pairs([("GOOGLE_CLIENT_ID", "local-id")]);
//! let source = LayeredSource::new()
//!     .with_layer(overrides)
//!     .with_layer(EnvSource::new());
//!
//! assert_eq!(source.get("GOOGLE_CLIENT_ID").as_deref(), Some("local-id"));
//! ```

pub mod error;
pub mod loader;
pub mod source;

pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use source::{ConfigSource, EnvSource, LayeredSource, MapSource};
