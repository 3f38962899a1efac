use serde::{Deserialize, Serialize};

use super::RowId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: RowId,
    pub governorate: String,
    pub suburb: String,
    pub street: String,
}

/// A governorate/suburb/street triple as submitted by a client.
///
/// Used both to create an address and to search for one; in a search an empty field is
/// not part of the filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    #[serde(default)]
    pub governorate: String,
    #[serde(default)]
    pub suburb: String,
    #[serde(default)]
    pub street: String,
}

impl AddressFields {
    pub fn new(
        governorate: impl Into<String>,
        suburb: impl Into<String>,
        street: impl Into<String>,
    ) -> Self {
        Self {
            governorate: governorate.into(),
            suburb: suburb.into(),
            street: street.into(),
        }
    }

    pub fn trimmed(&self) -> Self {
        Self::new(
            self.governorate.trim(),
            self.suburb.trim(),
            self.street.trim(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.governorate.trim().is_empty()
            && self.suburb.trim().is_empty()
            && self.street.trim().is_empty()
    }

    /// Case-insensitive substring match on every non-empty field.
    pub fn matches(&self, address: &Address) -> bool {
        fn like(haystack: &str, needle: &str) -> bool {
            let needle = needle.trim();
            needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        like(&address.governorate, &self.governorate)
            && like(&address.suburb, &self.suburb)
            && like(&address.street, &self.street)
    }
}
