//! # SHS Types
//!
//! Small validated value types shared by every SHS crate.

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input is not a 32 character lowercase hex identifier
    #[error("invalid public id: {0}")]
    InvalidPublicId(String),
    /// The input contains characters that cannot appear in a phone number
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, returning `TextError::Empty` when the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Opaque external identifier of a patient.
///
/// Independent of the store's numeric primary key. It doubles as the username of the
/// patient's own account, so it is kept lowercase and free of separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicId(String);

impl PublicId {
    const LEN: usize = 32;

    /// Generates a fresh random public id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Parses an existing public id (32 lowercase hex characters).
    pub fn parse(input: &str) -> Result<Self, TextError> {
        let s = input.trim();
        let valid = s.len() == Self::LEN
            && s
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !valid {
            return Err(TextError::InvalidPublicId(input.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for PublicId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PublicId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PublicId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A phone number reduced to an optional leading `+` followed by digits.
///
/// Spaces, dashes, dots and parentheses are removed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let raw = input.as_ref().trim();
        let mut out = String::with_capacity(raw.len());
        for (i, c) in raw.chars().enumerate() {
            match c {
                '+' if i == 0 => out.push(c),
                '0'..='9' => out.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => return Err(TextError::InvalidPhoneNumber(raw.to_owned())),
            }
        }
        if out.is_empty() || out == "+" {
            return Err(TextError::InvalidPhoneNumber(raw.to_owned()));
        }
        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the local part of the number with the international prefix removed.
    ///
    /// `+<code>`, `00<code>` and a bare `<code>` prefix are all recognised; a number that
    /// carries none of them is returned unchanged.
    pub fn without_calling_code(&self, calling_code: &str) -> String {
        let digits = self.0.trim_start_matches('+');
        let international = self.0.starts_with('+');

        if let Some(rest) = digits.strip_prefix("00").and_then(|d| d.strip_prefix(calling_code)) {
            return rest.to_owned();
        }
        if let Some(rest) = digits.strip_prefix(calling_code) {
            if international || rest.len() >= 8 {
                return rest.to_owned();
            }
        }
        digits.to_owned()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  Damascus ").unwrap().as_str(), "Damascus");
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn generated_public_id_parses_back() {
        let id = PublicId::generate();
        let parsed = PublicId::parse(id.as_str()).expect("generated id should parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn public_id_rejects_uppercase_and_wrong_length() {
        assert!(PublicId::parse("ABCDEF0123456789ABCDEF0123456789").is_err());
        assert!(PublicId::parse("abc").is_err());
    }

    #[test]
    fn public_id_deserialises_from_json_string() {
        let id: PublicId =
            serde_json::from_str("\"0123456789abcdef0123456789abcdef\"").expect("valid id");
        assert_eq!(id.as_str(), "0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn phone_number_strips_formatting() {
        let phone = PhoneNumber::new("+963 (11) 555-1234").unwrap();
        assert_eq!(phone.as_str(), "+963115551234");
    }

    #[test]
    fn phone_number_rejects_letters() {
        assert!(PhoneNumber::new("09x1").is_err());
        assert!(PhoneNumber::new("+").is_err());
    }

    #[test]
    fn calling_code_is_stripped_in_every_form() {
        let plus = PhoneNumber::new("+963944123456").unwrap();
        let zeros = PhoneNumber::new("00963944123456").unwrap();
        let bare = PhoneNumber::new("963944123456").unwrap();
        let local = PhoneNumber::new("0944123456").unwrap();

        assert_eq!(plus.without_calling_code("963"), "944123456");
        assert_eq!(zeros.without_calling_code("963"), "944123456");
        assert_eq!(bare.without_calling_code("963"), "944123456");
        assert_eq!(local.without_calling_code("963"), "0944123456");
    }
}
