use crate::error::{OnboardingError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use url::Url;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";

/// The payment platform's identifier for a provider's connected account.
///
/// Never empty. Once issued it is never reassigned for the same provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(OnboardingError::ValidationError(
                "Account id must not be empty".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = OnboardingError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An email address that passed syntax validation.
///
/// Only constructible through [`Email::parse`], so holding one means the
/// address has a non-empty local part and a dotted domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validates `input` and returns the user-facing field message on failure.
    pub fn parse(input: &str) -> std::result::Result<Self, &'static str> {
        if input.is_empty() {
            Err(EMAIL_REQUIRED)
        } else if !EMAIL_PATTERN.is_match(input) {
            Err(EMAIL_INVALID)
        } else {
            Ok(Self(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A provider known to the payment platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub account_id: AccountId,
    pub email: Email,
}

/// A single-use, time-limited link into the platform's hosted onboarding.
///
/// Never stored: every redirect asks the service for a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingLink {
    pub url: Url,
}

impl OnboardingLink {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| {
            OnboardingError::InvalidResponse(format!(
                "onboarding link '{}' is not a URL: {}",
                raw, e
            ))
        })?;
        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Account status as reported by the backend.
///
/// Every field is optional; the backend may omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub payouts_enabled: Option<bool>,
    #[serde(default)]
    pub charges_enabled: Option<bool>,
    #[serde(default)]
    pub details_submitted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_standard_addresses() {
        for input in ["doc@example.com", "a.b+c@clinic.co.uk", "x@y.z"] {
            assert!(Email::parse(input).is_ok(), "{input} should be accepted");
        }
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        for input in [
            "doc",
            "doc@",
            "@example.com",
            "doc@example",
            "doc example@x.com",
            "doc@@example.com",
            "doc@example.",
            "doc@.com",
        ] {
            assert_eq!(Email::parse(input), Err(EMAIL_INVALID), "{input}");
        }
    }

    #[test]
    fn test_email_required() {
        assert_eq!(Email::parse(""), Err(EMAIL_REQUIRED));
    }

    #[test]
    fn test_account_id_rejects_blank() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("   ").is_err());
        assert_eq!(AccountId::new("acct_1").unwrap().as_str(), "acct_1");
    }

    #[test]
    fn test_account_id_deserialization_validates() {
        let ok: AccountId = serde_json::from_str("\"acct_9\"").unwrap();
        assert_eq!(ok.as_str(), "acct_9");
        assert!(serde_json::from_str::<AccountId>("\"\"").is_err());
    }

    #[test]
    fn test_onboarding_link_requires_absolute_url() {
        assert!(OnboardingLink::parse("https://pay.example/onboard/xyz").is_ok());
        assert!(matches!(
            OnboardingLink::parse("/onboard/xyz"),
            Err(OnboardingError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_account_status_tolerates_missing_and_unknown_fields() {
        let status: AccountStatus =
            serde_json::from_str(r#"{"payoutsEnabled": true, "country": "US"}"#).unwrap();
        assert_eq!(status.payouts_enabled, Some(true));
        assert_eq!(status.email, None);
        assert_eq!(status.charges_enabled, None);
    }
}
