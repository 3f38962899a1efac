//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in this crate reads process environment variables during request handling.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;

use crate::constants::{
    DEFAULT_COUNTRY_CALLING_CODE, DEFAULT_RECENT_PATIENTS_LIMIT, DEFAULT_SESSION_TTL_DAYS,
};
use crate::error::{ShsError, ShsResult};

/// Which half of a [`crate::authorizer::Requirement`] decides access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthorizationStrategy {
    /// The actor must hold at least one of the required permission bits.
    #[default]
    Capabilities,
    /// The actor's account type must be in the required role list.
    Roles,
}

impl FromStr for AuthorizationStrategy {
    type Err = ShsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "capabilities" | "permissions" | "bitset" => Ok(Self::Capabilities),
            "roles" => Ok(Self::Roles),
            other => Err(ShsError::validation(format!(
                "unknown authorization strategy: {other}"
            ))),
        }
    }
}

impl fmt::Display for AuthorizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capabilities => f.write_str("capabilities"),
            Self::Roles => f.write_str("roles"),
        }
    }
}

/// What to do with medicine or virus ids that do not name an existing row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnresolvedReferencePolicy {
    /// Keep the resolvable subset and log the rest.
    #[default]
    Drop,
    /// Fail the whole request with a validation error.
    Reject,
}

impl FromStr for UnresolvedReferencePolicy {
    type Err = ShsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "reject" => Ok(Self::Reject),
            other => Err(ShsError::validation(format!(
                "unknown unresolved reference policy: {other}"
            ))),
        }
    }
}

impl fmt::Display for UnresolvedReferencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => f.write_str("drop"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    authorization_strategy: AuthorizationStrategy,
    unresolved_reference_policy: UnresolvedReferencePolicy,
    session_ttl: Duration,
    recent_patients_limit: usize,
    country_calling_code: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        authorization_strategy: AuthorizationStrategy,
        unresolved_reference_policy: UnresolvedReferencePolicy,
        session_ttl_days: i64,
        recent_patients_limit: usize,
        country_calling_code: String,
    ) -> ShsResult<Self> {
        if session_ttl_days <= 0 {
            return Err(ShsError::validation("session ttl must be at least one day"));
        }
        if recent_patients_limit == 0 {
            return Err(ShsError::validation(
                "recent patients limit must be greater than zero",
            ));
        }
        let country_calling_code = country_calling_code.trim().trim_start_matches('+').to_owned();
        if country_calling_code.is_empty()
            || !country_calling_code.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ShsError::validation(
                "country calling code must contain digits only",
            ));
        }

        Ok(Self {
            authorization_strategy,
            unresolved_reference_policy,
            session_ttl: Duration::days(session_ttl_days),
            recent_patients_limit,
            country_calling_code,
        })
    }

    pub fn authorization_strategy(&self) -> AuthorizationStrategy {
        self.authorization_strategy
    }

    pub fn unresolved_reference_policy(&self) -> UnresolvedReferencePolicy {
        self.unresolved_reference_policy
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn recent_patients_limit(&self) -> usize {
        self.recent_patients_limit
    }

    pub fn country_calling_code(&self) -> &str {
        &self.country_calling_code
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            authorization_strategy: AuthorizationStrategy::default(),
            unresolved_reference_policy: UnresolvedReferencePolicy::default(),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            recent_patients_limit: DEFAULT_RECENT_PATIENTS_LIMIT,
            country_calling_code: DEFAULT_COUNTRY_CALLING_CODE.to_owned(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the authorization strategy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`AuthorizationStrategy::Capabilities`].
pub fn authorization_strategy_from_env_value(
    value: Option<String>,
) -> ShsResult<AuthorizationStrategy> {
    non_empty(value)
        .map(|v| v.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse the unresolved reference policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`UnresolvedReferencePolicy::Drop`].
pub fn unresolved_reference_policy_from_env_value(
    value: Option<String>,
) -> ShsResult<UnresolvedReferencePolicy> {
    non_empty(value)
        .map(|v| v.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse the session lifetime in days, defaulting to 60.
pub fn session_ttl_days_from_env_value(value: Option<String>) -> ShsResult<i64> {
    match non_empty(value) {
        Some(v) => v
            .parse()
            .map_err(|_| ShsError::validation(format!("invalid session ttl: {v}"))),
        None => Ok(DEFAULT_SESSION_TTL_DAYS),
    }
}

/// Parse the list-recent size, defaulting to 50.
pub fn recent_patients_limit_from_env_value(value: Option<String>) -> ShsResult<usize> {
    match non_empty(value) {
        Some(v) => v
            .parse()
            .map_err(|_| ShsError::validation(format!("invalid recent patients limit: {v}"))),
        None => Ok(DEFAULT_RECENT_PATIENTS_LIMIT),
    }
}

/// Resolve the country calling code, defaulting to `963`.
pub fn country_calling_code_from_env_value(value: Option<String>) -> String {
    non_empty(value).unwrap_or_else(|| DEFAULT_COUNTRY_CALLING_CODE.to_owned())
}
