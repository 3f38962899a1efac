//! One-way password hashing.
//!
//! Hashes are stored as `pbkdf2-sha256$<rounds>$<salt-hex>$<hash-hex>` so the round count
//! can be raised later without invalidating existing accounts.

use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::constants::{PBKDF2_HASH_BYTES, PBKDF2_ROUNDS, PBKDF2_SALT_BYTES};
use crate::error::{ShsError, ShsResult};

const SCHEME: &str = "pbkdf2-sha256";

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> ShsResult<String>;
    /// `Ok(false)` on mismatch; `Err` only when `encoded` is not a hash this hasher wrote.
    fn verify(&self, password: &str, encoded: &str) -> ShsResult<bool>;
}

#[derive(Clone, Debug)]
pub struct Pbkdf2Hasher {
    rounds: u32,
}

impl Pbkdf2Hasher {
    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self::new(PBKDF2_ROUNDS)
    }
}

fn derive(password: &str, salt: &[u8], rounds: u32, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}

impl CredentialHasher for Pbkdf2Hasher {
    fn hash(&self, password: &str) -> ShsResult<String> {
        if password.is_empty() {
            return Err(ShsError::validation("password cannot be empty"));
        }
        let mut salt = [0u8; PBKDF2_SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = derive(password, &salt, self.rounds, PBKDF2_HASH_BYTES);
        Ok(format!(
            "{SCHEME}${}${}${}",
            self.rounds,
            hex::encode(salt),
            hex::encode(hash)
        ))
    }

    fn verify(&self, password: &str, encoded: &str) -> ShsResult<bool> {
        let malformed = || ShsError::Credential("malformed password hash".into());

        let mut parts = encoded.split('$');
        if parts.next() != Some(SCHEME) {
            return Err(malformed());
        }
        let rounds: u32 = parts
            .next()
            .and_then(|r| r.parse().ok())
            .ok_or_else(malformed)?;
        let salt = parts
            .next()
            .and_then(|s| hex::decode(s).ok())
            .ok_or_else(malformed)?;
        let expected = parts
            .next()
            .and_then(|h| hex::decode(h).ok())
            .ok_or_else(malformed)?;
        if parts.next().is_some() || expected.is_empty() {
            return Err(malformed());
        }

        let actual = derive(password, &salt, rounds, expected.len());
        Ok(actual.ct_eq(&expected).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Pbkdf2Hasher {
        Pbkdf2Hasher::new(1_000)
    }

    #[test]
    fn hash_verifies_only_the_original_password() {
        let encoded = hasher().hash("01020304050").unwrap();
        assert!(encoded.starts_with("pbkdf2-sha256$1000$"));
        assert!(hasher().verify("01020304050", &encoded).unwrap());
        assert!(!hasher().verify("01020304051", &encoded).unwrap());
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let a = hasher().hash("secret").unwrap();
        let b = hasher().hash("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn foreign_hash_format_is_an_error() {
        assert!(matches!(
            hasher().verify("secret", "$2b$12$abcdef"),
            Err(ShsError::Credential(_))
        ));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(hasher().hash(""), Err(ShsError::Validation(_))));
    }
}
