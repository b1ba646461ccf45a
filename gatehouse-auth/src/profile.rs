// Raw and canonical user profiles

use crate::provider::{Provider, ProviderFamily};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A `{ "value": ... }` entry of the `emails` / `photos` arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileValue {
    pub value: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ProfileValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            kind: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonName {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}

/// Array-shaped profile produced by the Google, Facebook and LinkedIn strategies.
///
/// Every field is optional; upstream data is frequently partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandardProfile {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub name: Option<PersonName>,
    pub emails: Option<Vec<ProfileValue>>,
    pub photos: Option<Vec<ProfileValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppleName {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Flat profile produced by the Apple strategy. `name` is only sent on the
/// first authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppleProfile {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<AppleName>,
}

/// Profile as handed over by a strategy, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawProfile {
    Standard(StandardProfile),
    Apple(AppleProfile),
}

impl RawProfile {
    /// Decode a provider JSON payload into the shape of the provider's family.
    pub fn from_json(provider: Provider, value: Value) -> Result<Self, serde_json::Error> {
        match provider.family() {
            ProviderFamily::Standard => serde_json::from_value(value).map(RawProfile::Standard),
            ProviderFamily::Apple => serde_json::from_value(value).map(RawProfile::Apple),
        }
    }

    pub fn family(&self) -> ProviderFamily {
        match self {
            RawProfile::Standard(_) => ProviderFamily::Standard,
            RawProfile::Apple(_) => ProviderFamily::Apple,
        }
    }
}

impl From<StandardProfile> for RawProfile {
    fn from(profile: StandardProfile) -> Self {
        RawProfile::Standard(profile)
    }
}

impl From<AppleProfile> for RawProfile {
    fn from(profile: AppleProfile) -> Self {
        RawProfile::Apple(profile)
    }
}

/// Provider-agnostic user record.
///
/// Absent values serialize as `null`, so every field is always present on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProfile {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
    pub provider: Provider,
}

/// Accept ids sent as strings or numbers.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_profile_from_json() {
        let raw = RawProfile::from_json(
            Provider::Google,
            json!({
                "id": "1234",
                "displayName": "Ada Lovelace",
                "name": {"givenName": "Ada", "familyName": "Lovelace"},
                "emails": [{"value": "ada@example.com", "type": "account"}],
                "photos": [{"value": "https://example.com/ada.png"}]
            }),
        )
        .unwrap();

        let RawProfile::Standard(profile) = raw else {
            panic!("expected a standard profile");
        };
        assert_eq!(profile.id.as_deref(), Some("1234"));
        assert_eq!(
            profile.name.unwrap().given_name.as_deref(),
            Some("Ada")
        );
        assert_eq!(profile.emails.unwrap()[0].kind.as_deref(), Some("account"));
    }

    #[test]
    fn test_numeric_and_null_ids() {
        let raw: StandardProfile = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(raw.id.as_deref(), Some("42"));

        let raw: AppleProfile = serde_json::from_value(json!({"id": null})).unwrap();
        assert_eq!(raw.id, None);

        let raw: AppleProfile = serde_json::from_value(json!({})).unwrap();
        assert_eq!(raw, AppleProfile::default());
    }

    #[test]
    fn test_apple_profile_from_json() {
        let raw = RawProfile::from_json(
            Provider::Apple,
            json!({"id": "001.abc", "name": {"firstName": "John"}}),
        )
        .unwrap();

        assert_eq!(raw.family(), ProviderFamily::Apple);
        let RawProfile::Apple(profile) = raw else {
            panic!("expected an apple profile");
        };
        assert_eq!(profile.name.unwrap().first_name.as_deref(), Some("John"));
        assert_eq!(profile.email, None);
    }

    #[test]
    fn test_malformed_profile_is_rejected() {
        let result = RawProfile::from_json(Provider::Facebook, json!({"emails": "not-a-list"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_canonical_profile_serializes_nulls() {
        let profile = CanonicalProfile {
            id: String::new(),
            email: None,
            first_name: Some("John".into()),
            last_name: None,
            picture: None,
            provider: Provider::Apple,
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "",
                "email": null,
                "firstName": "John",
                "lastName": null,
                "picture": null,
                "provider": "apple"
            })
        );
    }
}
