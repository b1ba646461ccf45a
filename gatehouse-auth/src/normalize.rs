// Profile normalization

use crate::error::{AuthError, UpstreamError};
use crate::profile::{AppleProfile, CanonicalProfile, RawProfile, StandardProfile};
use crate::provider::Provider;
use serde_json::Value;

/// Map a raw profile onto the canonical shape.
///
/// The mapping follows the shape of `raw`; `provider` is the dispatch key and is
/// copied into the result as is. Never fails.
pub fn normalize(provider: Provider, raw: &RawProfile) -> CanonicalProfile {
    match raw {
        RawProfile::Standard(profile) => normalize_standard(provider, profile),
        RawProfile::Apple(profile) => normalize_apple(provider, profile),
    }
}

/// Normalize an untyped provider payload, looking the provider up by name.
pub fn normalize_value(provider: &str, raw: Value) -> Result<CanonicalProfile, AuthError> {
    let provider = Provider::parse(provider)
        .ok_or_else(|| AuthError::UnsupportedProvider(provider.to_ascii_lowercase()))?;
    let raw = RawProfile::from_json(provider, raw)
        .map_err(|e| UpstreamError::InvalidResponse(format!("Malformed profile: {}", e)))?;

    Ok(normalize(provider, &raw))
}

fn normalize_standard(provider: Provider, profile: &StandardProfile) -> CanonicalProfile {
    let name = profile.name.as_ref();

    CanonicalProfile {
        id: profile.id.clone().unwrap_or_default(),
        email: first_value(profile.emails.as_deref()),
        first_name: name.and_then(|n| n.given_name.clone()),
        last_name: name.and_then(|n| n.family_name.clone()),
        picture: first_value(profile.photos.as_deref()),
        provider,
    }
}

fn normalize_apple(provider: Provider, profile: &AppleProfile) -> CanonicalProfile {
    let name = profile.name.as_ref();

    CanonicalProfile {
        id: profile.id.clone().unwrap_or_default(),
        email: profile.email.clone(),
        first_name: name.and_then(|n| n.first_name.clone()),
        last_name: name.and_then(|n| n.last_name.clone()),
        // Apple never returns a picture
        picture: None,
        provider,
    }
}

fn first_value(values: Option<&[crate::profile::ProfileValue]>) -> Option<String> {
    values?.first()?.value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{AppleName, PersonName, ProfileValue};
    use serde_json::json;

    fn full_standard() -> StandardProfile {
        StandardProfile {
            id: Some("123".into()),
            display_name: Some("Ada Lovelace".into()),
            name: Some(PersonName {
                given_name: Some("Ada".into()),
                family_name: Some("Lovelace".into()),
                middle_name: None,
            }),
            emails: Some(vec![
                ProfileValue::new("ada@example.com"),
                ProfileValue::new("other@example.com"),
            ]),
            photos: Some(vec![ProfileValue::new("https://example.com/ada.png")]),
        }
    }

    #[test]
    fn test_standard_mapping() {
        for provider in [Provider::Google, Provider::Facebook, Provider::LinkedIn] {
            let profile = normalize(provider, &full_standard().into());

            assert_eq!(
                profile,
                CanonicalProfile {
                    id: "123".into(),
                    email: Some("ada@example.com".into()),
                    first_name: Some("Ada".into()),
                    last_name: Some("Lovelace".into()),
                    picture: Some("https://example.com/ada.png".into()),
                    provider,
                }
            );
        }
    }

    #[test]
    fn test_standard_mapping_is_total() {
        let profile = normalize(Provider::LinkedIn, &StandardProfile::default().into());

        assert_eq!(profile.id, "");
        assert_eq!(profile.email, None);
        assert_eq!(profile.first_name, None);
        assert_eq!(profile.last_name, None);
        assert_eq!(profile.picture, None);
        assert_eq!(profile.provider, Provider::LinkedIn);
    }

    #[test]
    fn test_empty_arrays_and_valueless_entries() {
        let raw = StandardProfile {
            emails: Some(vec![]),
            photos: Some(vec![ProfileValue::default()]),
            name: Some(PersonName {
                given_name: Some("Only".into()),
                ..PersonName::default()
            }),
            ..StandardProfile::default()
        };

        let profile = normalize(Provider::Facebook, &raw.into());
        assert_eq!(profile.email, None);
        assert_eq!(profile.picture, None);
        assert_eq!(profile.first_name.as_deref(), Some("Only"));
        assert_eq!(profile.last_name, None);
    }

    #[test]
    fn test_apple_first_authorization() {
        let raw = AppleProfile {
            id: Some("001.abc".into()),
            email: None,
            name: Some(AppleName {
                first_name: Some("John".into()),
                last_name: None,
            }),
        };

        assert_eq!(
            normalize(Provider::Apple, &raw.into()),
            CanonicalProfile {
                id: "001.abc".into(),
                email: None,
                first_name: Some("John".into()),
                last_name: None,
                picture: None,
                provider: Provider::Apple,
            }
        );
    }

    #[test]
    fn test_apple_later_authorization_has_no_name() {
        let raw = AppleProfile {
            id: Some("001.abc".into()),
            email: Some("relay@privaterelay.appleid.com".into()),
            name: None,
        };

        let profile = normalize(Provider::Apple, &raw.into());
        assert_eq!(profile.email.as_deref(), Some("relay@privaterelay.appleid.com"));
        assert_eq!(profile.first_name, None);
        assert_eq!(profile.picture, None);
    }

    #[test]
    fn test_apple_missing_id_becomes_empty_string() {
        let profile = normalize(Provider::Apple, &AppleProfile::default().into());
        assert_eq!(profile.id, "");
    }

    #[test]
    fn test_provider_comes_from_dispatch() {
        // Shape decides the mapping, the dispatch key decides the provider tag
        let profile = normalize(Provider::Google, &full_standard().into());
        assert_eq!(profile.provider, Provider::Google);

        let profile = normalize(Provider::Facebook, &full_standard().into());
        assert_eq!(profile.provider, Provider::Facebook);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw: RawProfile = full_standard().into();
        assert_eq!(
            normalize(Provider::Google, &raw),
            normalize(Provider::Google, &raw)
        );
    }

    #[test]
    fn test_normalize_value() {
        let profile = normalize_value(
            "APPLE",
            json!({"id": "001.abc", "name": {"firstName": "John"}}),
        )
        .unwrap();
        assert_eq!(profile.provider, Provider::Apple);
        assert_eq!(profile.first_name.as_deref(), Some("John"));

        assert_eq!(
            normalize_value("Twitter", json!({})),
            Err(AuthError::UnsupportedProvider("twitter".into()))
        );
        assert!(matches!(
            normalize_value("google", json!({"photos": 5})),
            Err(AuthError::UpstreamExchangeFailure(
                UpstreamError::InvalidResponse(_)
            ))
        ));
    }
}
