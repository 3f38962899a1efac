use serde_json::json;

/// Errors surfaced by every SHS core operation.
///
/// Each variant carries a stable identifier ([`ShsError::id`]) and an optional structured
/// payload ([`ShsError::extra`]) so callers can render a localised message without matching
/// on display strings.
#[derive(Debug, thiserror::Error)]
pub enum ShsError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("{resource} already exists")]
    AlreadyExists { resource: &'static str },
    #[error("permission denied")]
    PermissionDenied,
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("invalid session token")]
    InvalidSessionToken,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(
        "insufficient amount of {medicine_name}: {exceeding_amount} over stock, {left_packages} left"
    )]
    InsufficientMedicineAmount {
        medicine_name: String,
        exceeding_amount: u32,
        left_packages: u32,
    },
    #[error("store failure: {0}")]
    Store(String),
    #[error("credential hashing failed: {0}")]
    Credential(String),
}

pub type ShsResult<T> = std::result::Result<T, ShsError>;

impl ShsError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable identifier of the error.
    pub fn id(&self) -> &'static str {
        match self {
            Self::NotFound { resource } => match *resource {
                "account" => "account-not-found",
                "patient" => "patient-not-found",
                "address" => "address-not-found",
                "blood test" => "blood-test-not-found",
                "blood test result" => "blood-test-result-not-found",
                "virus" => "virus-not-found",
                "medicine" => "medicine-not-found",
                "visit" => "visit-not-found",
                "prescribed medicine" => "prescribed-medicine-not-found",
                "diagnosis" => "diagnosis-not-found",
                _ => "not-found",
            },
            Self::AlreadyExists { resource } => match *resource {
                "account" => "account-exists",
                "patient" => "patient-exists",
                _ => "already-exists",
            },
            Self::PermissionDenied => "permission-denied",
            Self::InvalidCredentials => "invalid-login-credentials",
            Self::InvalidSessionToken => "invalid-session-token",
            Self::Validation(_) => "validation-failed",
            Self::InsufficientMedicineAmount { .. } => "insufficient-medicine-amount",
            Self::Store(_) | Self::Credential(_) => "something-went-wrong",
        }
    }

    /// Structured context for the presentation layer, when the error has any.
    pub fn extra(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound { resource } | Self::AlreadyExists { resource } => {
                Some(json!({ "resource_name": resource }))
            }
            Self::Validation(message) => Some(json!({ "reason": message })),
            Self::InsufficientMedicineAmount {
                medicine_name,
                exceeding_amount,
                left_packages,
            } => Some(json!({
                "medicine_name": medicine_name,
                "exceeding_amount": exceeding_amount,
                "left_packages": left_packages,
            })),
            _ => None,
        }
    }

    /// Whether the message may be shown to clients verbatim.
    pub fn exposed_to_clients(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::Credential(_))
    }
}

impl From<shs_types::TextError> for ShsError {
    fn from(err: shs_types::TextError) -> Self {
        Self::Validation(err.to_string())
    }
}
