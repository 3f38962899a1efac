//! Constants used throughout the SHS core crate.

/// Lifetime of a session token when no explicit value is configured.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 60;

/// Number of patients returned by the list-recent operation by default.
pub const DEFAULT_RECENT_PATIENTS_LIMIT: usize = 50;

/// International calling code stripped from phone numbers when deriving an initial password.
pub const DEFAULT_COUNTRY_CALLING_CODE: &str = "963";

/// Key prefix under which session tokens are stored in a shared cache.
pub const SESSION_KEY_PREFIX: &str = "shs:";

/// Number of random bytes in a session token (hex encoded to twice as many characters).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// PBKDF2 iteration count for newly hashed passwords.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Salt length in bytes for newly hashed passwords.
pub const PBKDF2_SALT_BYTES: usize = 16;

/// Derived key length in bytes.
pub const PBKDF2_HASH_BYTES: usize = 32;

/// Inclusive upper bound of a single joint evaluation score.
pub const MAX_JOINT_SCORE: u8 = 20;
