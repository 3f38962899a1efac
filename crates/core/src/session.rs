//! Session-token cache.
//!
//! Tokens map to the account that logged in. Entries expire after the configured
//! lifetime and are then indistinguishable from tokens that never existed.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::constants::SESSION_KEY_PREFIX;
use crate::error::{ShsError, ShsResult};
use crate::models::Account;

pub trait SessionCache: Send + Sync {
    fn set_session(&self, token: &str, account: &Account, ttl: Duration) -> ShsResult<()>;
    /// `InvalidSessionToken` when the token is unknown or has expired.
    fn get_session(&self, token: &str) -> ShsResult<Account>;
    /// Removing an unknown token is not an error.
    fn invalidate(&self, token: &str) -> ShsResult<()>;
}

struct Entry {
    account: Account,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemorySessionCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(token: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{token}")
    }

    fn poisoned() -> ShsError {
        ShsError::Store("session cache lock poisoned".into())
    }
}

impl SessionCache for MemorySessionCache {
    fn set_session(&self, token: &str, account: &Account, ttl: Duration) -> ShsResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        let now = Utc::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            Self::key(token),
            Entry {
                account: account.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    fn get_session(&self, token: &str) -> ShsResult<Account> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        match entries.get(&Self::key(token)) {
            Some(entry) if entry.expires_at > Utc::now() => Ok(entry.account.clone()),
            _ => Err(ShsError::InvalidSessionToken),
        }
    }

    fn invalidate(&self, token: &str) -> ShsResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(&Self::key(token));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{AccountType, PATIENT_PERMISSIONS};

    fn account() -> Account {
        Account {
            id: 7,
            display_name: "Sami Haddad".into(),
            username: "0123456789abcdef0123456789abcdef".into(),
            password_hash: String::new(),
            account_type: AccountType::Patient,
            permissions: PATIENT_PERMISSIONS,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stored_session_is_returned_until_invalidated() {
        let cache = MemorySessionCache::new();
        cache.set_session("tok", &account(), Duration::days(60)).unwrap();
        assert_eq!(cache.get_session("tok").unwrap().id, 7);

        cache.invalidate("tok").unwrap();
        assert!(matches!(
            cache.get_session("tok"),
            Err(ShsError::InvalidSessionToken)
        ));
        cache.invalidate("tok").unwrap();
    }

    #[test]
    fn expired_session_is_rejected() {
        let cache = MemorySessionCache::new();
        cache
            .set_session("old", &account(), Duration::seconds(-1))
            .unwrap();
        assert!(matches!(
            cache.get_session("old"),
            Err(ShsError::InvalidSessionToken)
        ));
    }
}
