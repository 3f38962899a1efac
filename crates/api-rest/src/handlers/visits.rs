//! Visits, prescriptions and the patient's own view of them.

use api_shared::dto::{CreateVisitReq, CreateVisitRes, ErrorRes, UsedMedicineRes, VisitRes};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use shs_core::VisitService;

use super::public_id;
use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::router::AppState;

#[utoipa::path(
    post,
    path = "/v1/patients/{id}/visits",
    params(("id" = String, Path, description = "Patient public id")),
    request_body = CreateVisitReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Visit recorded and stock decremented", body = CreateVisitRes),
        (status = 400, description = "Unknown medicine id under the reject policy", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 422, description = "Insufficient medicine stock", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_visit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<CreateVisitReq>,
) -> ApiResult<(StatusCode, Json<CreateVisitRes>)> {
    let record = VisitService::new(state.ctx).create_visit(
        &actor,
        &public_id(&id)?,
        req.reason,
        &req.medicine_ids,
    )?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    get,
    path = "/v1/patients/{id}/visits",
    params(("id" = String, Path, description = "Patient public id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Visits, newest first", body = [VisitRes]),
        (status = 403, description = "Permission denied", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_visits(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<VisitRes>>> {
    let visits = VisitService::new(state.ctx).list_for_patient(&actor, &public_id(&id)?)?;
    Ok(Json(visits.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/me/last-visit",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "The caller's most recent visit", body = VisitRes),
        (status = 404, description = "No visit recorded", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn last_visit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<VisitRes>> {
    let visit = VisitService::new(state.ctx).last_visit(&actor)?;
    Ok(Json(visit.into()))
}

#[utoipa::path(
    post,
    path = "/v1/me/medicines/{id}/use",
    params(("id" = u64, Path, description = "Prescribed medicine id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Medicine marked as used", body = UsedMedicineRes),
        (status = 400, description = "Already used", body = ErrorRes),
        (status = 404, description = "Not one of the caller's prescriptions", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn use_medicine(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<UsedMedicineRes>> {
    let used = VisitService::new(state.ctx).use_medicine(&actor, id)?;
    Ok(Json(used.into()))
}
