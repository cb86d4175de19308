//! # Account Identifier Newtypes
//!
//! Distinct types for the two platforms' account identifiers, so a Google
//! customer ID can never be handed to the TikTok client.
//!
//! Both wrap the platform's string form. Google customer IDs are numeric but
//! are still carried as strings: 64-bit IDs pass through JSON and warehouse
//! layers that would otherwise round them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A Google Ads customer (account) ID, normalized to bare digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    /// Parse a customer ID, accepting the dashed `123-456-7890` display form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = raw.as_ref().trim();
        let digits: String = raw.chars().filter(|c| *c != '-').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidCustomerId(raw.to_string()));
        }
        Ok(Self(digits))
    }

    /// Parse a Google Ads resource name of the form `customers/1234567890`.
    pub fn from_resource_name(name: &str) -> Result<Self, ValidationError> {
        match name.strip_prefix("customers/") {
            Some(id) if !id.contains('/') => Self::new(id),
            _ => Err(ValidationError::InvalidCustomerId(name.to_string())),
        }
    }

    /// The bare-digit form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CustomerId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CustomerId> for String {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

/// A TikTok advertiser ID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdvertiserId(String);

impl AdvertiserId {
    /// Wrap a non-empty advertiser ID.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            return Err(ValidationError::InvalidAdvertiserId);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AdvertiserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AdvertiserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AdvertiserId> for String {
    fn from(id: AdvertiserId) -> Self {
        id.0
    }
}
