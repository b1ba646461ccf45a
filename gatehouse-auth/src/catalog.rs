// Provider catalog for tooling

use crate::config::ConfigResolver;
use crate::provider::{Provider, ProviderFamily};
use crate::registry::StrategyRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SUPPORTED_NOTE: &str =
    "These providers have built-in strategies. Configure via environment variables to enable.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedProviders {
    pub providers: Vec<String>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSupport {
    pub supported: bool,
    pub provider: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigKeys {
    pub provider: String,
    pub supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_env_vars: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Describes which providers the library can handle and how to configure
/// them. Never reads configuration values.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    registry: StrategyRegistry,
}

impl ProviderCatalog {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    fn provider_names(&self) -> Vec<String> {
        self.registry
            .providers()
            .iter()
            .map(|provider| provider.as_str().to_string())
            .collect()
    }

    pub fn supported_providers(&self) -> SupportedProviders {
        SupportedProviders {
            providers: self.provider_names(),
            note: SUPPORTED_NOTE.to_string(),
        }
    }

    pub fn check_provider_support(&self, provider: &str) -> ProviderSupport {
        let supported = self.registry.contains(provider);
        let message = if supported {
            format!(
                "Provider '{}' is supported by this library. Configure environment variables to enable.",
                provider
            )
        } else {
            format!(
                "Provider '{}' is not supported by this library. Supported providers: {}",
                provider,
                self.provider_names().join(", ")
            )
        };

        ProviderSupport {
            supported,
            provider: provider.to_string(),
            message,
        }
    }

    /// Required keys plus placeholder values. The placeholders are not secrets.
    pub fn provider_config_keys(&self, provider: &str) -> ProviderConfigKeys {
        let Some(known) = Provider::parse(provider).filter(|p| self.registry.get_provider(*p).is_some())
        else {
            return ProviderConfigKeys {
                provider: provider.to_string(),
                supported: false,
                required_env_vars: None,
                example: None,
                message: Some(format!(
                    "Provider '{}' is not supported. Supported providers: {}",
                    provider,
                    self.provider_names().join(", ")
                )),
            };
        };

        let required = ConfigResolver::required_keys(known);
        let example = required
            .iter()
            .map(|key| (key.clone(), example_value(known, key)))
            .collect();

        ProviderConfigKeys {
            provider: provider.to_string(),
            supported: true,
            required_env_vars: Some(required),
            example: Some(example),
            message: None,
        }
    }
}

fn example_value(provider: Provider, key: &str) -> String {
    let name = provider.as_str();
    let suffix = key
        .strip_prefix(provider.env_prefix())
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(key);

    match (provider.family(), suffix) {
        (_, "CALLBACK_URL") => format!("http://localhost:3000/oauth/{}/callback", name),
        (ProviderFamily::Apple, "CLIENT_ID") => "your-apple-service-id".to_string(),
        (ProviderFamily::Apple, "PRIVATE_KEY") => "your-apple-private-key-content".to_string(),
        (_, other) => format!("your-{}-{}", name, other.to_ascii_lowercase().replace('_', "-")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supported_providers() {
        let catalog = ProviderCatalog::default();
        assert_eq!(
            serde_json::to_value(catalog.supported_providers()).unwrap(),
            json!({
                "providers": ["google", "facebook", "linkedin", "apple"],
                "note": "These providers have built-in strategies. Configure via environment variables to enable."
            })
        );
    }

    #[test]
    fn test_check_provider_support() {
        let catalog = ProviderCatalog::default();

        assert_eq!(
            catalog.check_provider_support("google"),
            ProviderSupport {
                supported: true,
                provider: "google".into(),
                message: "Provider 'google' is supported by this library. Configure environment variables to enable.".into(),
            }
        );
        assert_eq!(
            catalog.check_provider_support("twitter").message,
            "Provider 'twitter' is not supported by this library. Supported providers: google, facebook, linkedin, apple"
        );
        assert!(catalog.check_provider_support("LinkedIn").supported);
    }

    #[test]
    fn test_standard_config_keys() {
        let keys = ProviderCatalog::default().provider_config_keys("google");

        assert_eq!(
            serde_json::to_value(&keys).unwrap(),
            json!({
                "provider": "google",
                "supported": true,
                "requiredEnvVars": ["GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET", "GOOGLE_CALLBACK_URL"],
                "example": {
                    "GOOGLE_CLIENT_ID": "your-google-client-id",
                    "GOOGLE_CLIENT_SECRET": "your-google-client-secret",
                    "GOOGLE_CALLBACK_URL": "http://localhost:3000/oauth/google/callback"
                }
            })
        );
    }

    #[test]
    fn test_apple_config_keys() {
        let keys = ProviderCatalog::default().provider_config_keys("apple");
        let example = keys.example.unwrap();

        assert_eq!(
            keys.required_env_vars.unwrap(),
            vec![
                "APPLE_CLIENT_ID",
                "APPLE_TEAM_ID",
                "APPLE_KEY_ID",
                "APPLE_PRIVATE_KEY",
                "APPLE_CALLBACK_URL"
            ]
        );
        assert_eq!(example["APPLE_CLIENT_ID"], "your-apple-service-id");
        assert_eq!(example["APPLE_TEAM_ID"], "your-apple-team-id");
        assert_eq!(example["APPLE_KEY_ID"], "your-apple-key-id");
        assert_eq!(example["APPLE_PRIVATE_KEY"], "your-apple-private-key-content");
        assert_eq!(
            example["APPLE_CALLBACK_URL"],
            "http://localhost:3000/oauth/apple/callback"
        );
    }

    #[test]
    fn test_unsupported_config_keys() {
        let keys = ProviderCatalog::default().provider_config_keys("twitter");

        assert_eq!(
            serde_json::to_value(&keys).unwrap(),
            json!({
                "provider": "twitter",
                "supported": false,
                "message": "Provider 'twitter' is not supported. Supported providers: google, facebook, linkedin, apple"
            })
        );
    }

    #[test]
    fn test_catalog_follows_registry() {
        let registry = StrategyRegistry::builtin_builder()
            .without(Provider::Google)
            .build();
        let catalog = ProviderCatalog::new(registry);

        assert!(!catalog.check_provider_support("google").supported);
        assert!(!catalog.provider_config_keys("google").supported);
        assert_eq!(catalog.supported_providers().providers.len(), 3);
    }
}
