use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RowId;
use crate::permissions::{AccountType, Permissions};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: RowId,
    pub display_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub account_type: AccountType,
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewAccount {
    pub display_name: String,
    pub username: String,
    pub password_hash: String,
    pub account_type: AccountType,
    pub permissions: Permissions,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Clone, Debug, Default)]
pub struct AccountUpdate {
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub permissions: Option<Permissions>,
}
