//! Vehicle types
//!
//! A vehicle is addressed by its registration number. Registrations compare
//! case-insensitively (`abc123` and `ABC123` are the same vehicle) but keep the
//! spelling they were created with for display and URLs.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Vehicle registration number used as the lookup key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationNumber(String);

impl RegistrationNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for RegistrationNumber {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for RegistrationNumber {}

impl Hash for RegistrationNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_uppercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for RegistrationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegistrationNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RegistrationNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Vehicle record owned by the vehicle service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub vin_number: String,
}
