//! Input validation utilities.
//!
//! Functions here check user inputs before they reach the store.

use shs_types::{NonEmptyText, PhoneNumber};

use crate::error::{ShsError, ShsResult};

/// Validates a login name.
///
/// Usernames are compared byte for byte, so they are restricted to a conservative ASCII
/// set that survives copy/paste and case-insensitive keyboards unchanged.
pub fn validate_username(username: &str) -> ShsResult<String> {
    const MAX_USERNAME_LEN: usize = 64;

    let username = NonEmptyText::new(username)?.into_inner();
    if username.len() > MAX_USERNAME_LEN {
        return Err(ShsError::validation(format!(
            "username exceeds maximum length of {MAX_USERNAME_LEN} characters"
        )));
    }

    let ok = username
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));
    if !ok {
        return Err(ShsError::validation(
            "username contains invalid characters (only alphanumeric, '.', '-', '_' allowed)",
        ));
    }

    Ok(username)
}

/// Initial password of a patient account.
///
/// The national id when present, otherwise the phone number without the country
/// calling code.
pub fn initial_patient_password(
    national_id: &str,
    phone_number: &str,
    calling_code: &str,
) -> ShsResult<String> {
    if let Ok(national_id) = NonEmptyText::new(national_id) {
        return Ok(national_id.into_inner());
    }
    let phone = PhoneNumber::new(phone_number).map_err(|_| {
        ShsError::validation("a national id or phone number is required for the patient account")
    })?;
    Ok(phone.without_calling_code(calling_code))
}

/// Display name shown for a patient account.
pub fn patient_display_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_owned()
}
