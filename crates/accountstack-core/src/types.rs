//! Common AWS type definitions shared across crates.

use std::fmt;

use crate::AccountStackError;

/// AWS Account ID (12-digit string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account ID from a string.
    ///
    /// # Errors
    /// Returns an error if the account ID is not a 12-digit numeric string.
    pub fn new(id: impl Into<String>) -> Result<Self, AccountStackError> {
        let id = id.into();
        if id.len() != 12 || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(AccountStackError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// AWS Region identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Environment identifier, e.g. `ROOT`, `DEV`, `PROD`.
///
/// Names are upper-case ASCII letters and digits with a leading letter.
/// Resource names such as `SE_CUSTOM_DEV` embed them verbatim, stack names
/// embed the title-cased form, and DNS labels the lower-cased form, so
/// separators are not allowed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    /// Create a new environment name.
    ///
    /// # Errors
    /// Returns an error if the name is empty, starts with a digit, or holds
    /// anything other than upper-case letters and digits.
    pub fn new(name: impl Into<String>) -> Result<Self, AccountStackError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !valid {
            return Err(AccountStackError::InvalidEnvironmentName(name));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title-cased form used in stack and resource names (`DEV` -> `Dev`).
    #[must_use]
    pub fn title_case(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut chars = self.0.chars();
        if let Some(first) = chars.next() {
            out.push(first);
        }
        out.extend(chars.map(|c| c.to_ascii_lowercase()));
        out
    }

    /// Lower-cased form used in DNS names (`DEV` -> `dev`).
    #[must_use]
    pub fn lower_case(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_valid_account_id() {
        let id = AccountId::new("123456789012").unwrap();
        assert_eq!(id.as_str(), "123456789012");
    }

    #[test]
    fn test_should_reject_invalid_account_id() {
        assert!(AccountId::new("12345").is_err());
        assert!(AccountId::new("abcdefghijkl").is_err());
        assert!(AccountId::new("1234567890123").is_err());
        assert!(AccountId::new("TBD").is_err());
    }

    #[test]
    fn test_should_create_region() {
        let region = AwsRegion::new("us-east-2");
        assert_eq!(region.as_str(), "us-east-2");
        assert_eq!(region.to_string(), "us-east-2");
    }

    #[test]
    fn test_should_accept_upper_case_environment_names() {
        assert!(EnvironmentName::new("ROOT").is_ok());
        assert!(EnvironmentName::new("DEV").is_ok());
        assert!(EnvironmentName::new("QAEU1").is_ok());
    }

    #[test]
    fn test_should_reject_malformed_environment_names() {
        assert!(EnvironmentName::new("").is_err());
        assert!(EnvironmentName::new("dev").is_err());
        assert!(EnvironmentName::new("1DEV").is_err());
        assert!(EnvironmentName::new("DEV-2").is_err());
    }

    #[test]
    fn test_should_reject_underscores_in_environment_names() {
        let err = EnvironmentName::new("QA_EU1").unwrap_err();
        assert!(matches!(err, AccountStackError::InvalidEnvironmentName(ref n) if n == "QA_EU1"));
    }

    #[test]
    fn test_should_derive_title_and_lower_case_forms() {
        let name = EnvironmentName::new("TESTING").unwrap();
        assert_eq!(name.title_case(), "Testing");
        assert_eq!(name.lower_case(), "testing");
    }
}
