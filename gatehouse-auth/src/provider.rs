// Identity provider identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The identity providers Gatehouse ships a strategy for.
///
/// Variant order is the compiled-in provider order used everywhere a list of
/// providers is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Facebook,
    LinkedIn,
    Apple,
}

/// Configuration shape shared by a group of providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    /// Client id, client secret and callback URL.
    Standard,
    /// Service id, team id, key id, private key and callback URL.
    Apple,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Google,
        Provider::Facebook,
        Provider::LinkedIn,
        Provider::Apple,
    ];

    /// Case-insensitive lookup. Surrounding whitespace is not trimmed.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(name))
    }

    /// Canonical lowercase key, used for dispatch and in normalized profiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
            Provider::LinkedIn => "linkedin",
            Provider::Apple => "apple",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Facebook => "Facebook",
            Provider::LinkedIn => "LinkedIn",
            Provider::Apple => "Apple",
        }
    }

    pub fn family(&self) -> ProviderFamily {
        match self {
            Provider::Apple => ProviderFamily::Apple,
            _ => ProviderFamily::Standard,
        }
    }

    /// Prefix of the configuration keys, e.g. `GOOGLE` for `GOOGLE_CLIENT_ID`.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Provider::Google => "GOOGLE",
            Provider::Facebook => "FACEBOOK",
            Provider::LinkedIn => "LINKEDIN",
            Provider::Apple => "APPLE",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider: {}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Provider::parse("google"), Some(Provider::Google));
        assert_eq!(Provider::parse("GOOGLE"), Some(Provider::Google));
        assert_eq!(Provider::parse("LinkedIn"), Some(Provider::LinkedIn));
        assert_eq!(Provider::parse("aPPle"), Some(Provider::Apple));
        assert_eq!(Provider::parse("twitter"), None);
        assert_eq!(Provider::parse(""), None);
        assert_eq!(Provider::parse(" google"), None);
    }

    #[test]
    fn test_compiled_order() {
        let names: Vec<&str> = Provider::ALL.iter().map(Provider::as_str).collect();
        assert_eq!(names, vec!["google", "facebook", "linkedin", "apple"]);

        let mut sorted = vec![Provider::Apple, Provider::Google, Provider::LinkedIn];
        sorted.sort();
        assert_eq!(
            sorted,
            vec![Provider::Google, Provider::LinkedIn, Provider::Apple]
        );
    }

    #[test]
    fn test_families_and_prefixes() {
        assert_eq!(Provider::Apple.family(), ProviderFamily::Apple);
        assert_eq!(Provider::Facebook.family(), ProviderFamily::Standard);
        assert_eq!(Provider::LinkedIn.env_prefix(), "LINKEDIN");
    }

    #[test]
    fn test_from_str_and_serde() {
        let provider: Provider = "Facebook".parse().unwrap();
        assert_eq!(provider, Provider::Facebook);
        assert!("myspace".parse::<Provider>().is_err());

        assert_eq!(
            serde_json::to_string(&Provider::LinkedIn).unwrap(),
            "\"linkedin\""
        );
        assert_eq!(Provider::Apple.to_string(), "apple");
    }
}
