//! Input-format validation for path identifiers
//!
//! Both services validate their path parameter before touching a repository,
//! so a malformed identifier is a `400`, never a `404`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{PERSON_ID_LENGTH, REGISTRATION_MAX_LENGTH, REGISTRATION_MIN_LENGTH};
use crate::errors::{Result, ThreadPilotError};
use crate::types::RegistrationNumber;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));
static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid regex"));

/// Check a person identifier: exactly 11 ASCII digits
///
/// # Errors
/// Returns `ThreadPilotError::InvalidInput` describing the first rule broken.
pub fn validate_person_id(person_id: &str) -> Result<()> {
    if person_id.is_empty() {
        return Err(invalid("Person ID is required"));
    }
    if person_id.len() != PERSON_ID_LENGTH {
        return Err(invalid("Person ID must be exactly 11 characters"));
    }
    if !DIGITS.is_match(person_id) {
        return Err(invalid("Person ID can only contain numbers"));
    }
    Ok(())
}

/// Check a registration number: 3 to 8 ASCII letters or digits
///
/// # Errors
/// Returns `ThreadPilotError::InvalidInput` describing the first rule broken.
pub fn validate_registration(registration: &str) -> Result<RegistrationNumber> {
    if registration.is_empty() {
        return Err(invalid("Registration number is required"));
    }
    if !(REGISTRATION_MIN_LENGTH..=REGISTRATION_MAX_LENGTH).contains(&registration.len()) {
        return Err(invalid("Registration number must be between 3 and 8 characters"));
    }
    if !ALPHANUMERIC.is_match(registration) {
        return Err(invalid("Registration number can only contain letters and numbers"));
    }
    Ok(RegistrationNumber::from(registration))
}

fn invalid(message: &str) -> ThreadPilotError {
    ThreadPilotError::InvalidInput(message.to_string())
}
