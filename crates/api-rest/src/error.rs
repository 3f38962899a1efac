//! Mapping of core errors onto HTTP responses.

use api_shared::dto::{ErrorDetail, ErrorRes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shs_core::ShsError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable session token was sent.
    #[error("authentication required")]
    Unauthorized,
    #[error(transparent)]
    Core(#[from] ShsError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let err = match self {
            Self::Unauthorized => return StatusCode::UNAUTHORIZED,
            Self::Core(err) => err,
        };
        match err {
            ShsError::NotFound { .. } => StatusCode::NOT_FOUND,
            ShsError::AlreadyExists { .. } => StatusCode::CONFLICT,
            ShsError::PermissionDenied => StatusCode::FORBIDDEN,
            ShsError::InvalidCredentials | ShsError::InvalidSessionToken => {
                StatusCode::UNAUTHORIZED
            }
            ShsError::Validation(_) => StatusCode::BAD_REQUEST,
            ShsError::InsufficientMedicineAmount { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ShsError::Store(_) | ShsError::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        match self {
            Self::Unauthorized => ErrorDetail {
                id: "authentication-required".into(),
                message: self.to_string(),
                extra: None,
            },
            Self::Core(err) if !err.exposed_to_clients() => {
                tracing::error!(error = %err, "request failed");
                ErrorDetail {
                    id: err.id().into(),
                    message: "something went wrong".into(),
                    extra: None,
                }
            }
            Self::Core(err) => ErrorDetail {
                id: err.id().into(),
                message: err.to_string(),
                extra: err.extra(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorRes {
            error: self.detail(),
        };
        (self.status(), Json(body)).into_response()
    }
}
