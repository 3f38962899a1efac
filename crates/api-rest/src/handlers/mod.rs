//! Request handlers, grouped by resource.

pub mod accounts;
pub mod catalogue;
pub mod patients;
pub mod session;
pub mod visits;

use api_shared::{HealthRes, HealthService};
use axum::response::Json;
use shs_core::repositories::patients::PatientRef;
use shs_core::ShsError;
use shs_types::PublicId;

use crate::error::{ApiError, ApiResult};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

/// Patients are addressed by public id in paths; a malformed id names no patient.
pub(crate) fn patient_ref(raw: &str) -> ApiResult<PatientRef> {
    PublicId::parse(raw)
        .map(PatientRef::from)
        .map_err(|_| ApiError::from(ShsError::not_found("patient")))
}

pub(crate) fn public_id(raw: &str) -> ApiResult<PublicId> {
    PublicId::parse(raw).map_err(|_| ApiError::from(ShsError::not_found("patient")))
}
