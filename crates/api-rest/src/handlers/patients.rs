//! Patient registration, the patient aggregate and the records attached to it.

use api_shared::dto::{
    BloodTestResultReq, BloodTestResultRes, CompleteBloodTestResultReq, CreatePatientReq,
    CreatePatientRes, DiagnosisResultReq, DiagnosisResultRes, ErrorRes, JointsEvaluationReq,
    JointsEvaluationRes, PatientRes, PatientSearchQuery, PatientSummaryRes, SuccessRes,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use shs_core::PatientService;

use super::patient_ref;
use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::router::AppState;

#[utoipa::path(
    post,
    path = "/v1/patients",
    request_body = CreatePatientReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Patient registered with a patient account", body = CreatePatientRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 403, description = "Permission denied", body = ErrorRes),
        (status = 409, description = "Duplicate national id", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreatePatientReq>,
) -> ApiResult<(StatusCode, Json<CreatePatientRes>)> {
    let created = PatientService::new(state.ctx).create_patient(&actor, req.into())?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/v1/patients",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Most recently registered patients", body = [PatientSummaryRes]),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_recent_patients(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<PatientSummaryRes>>> {
    let patients = PatientService::new(state.ctx).list_recent(&actor)?;
    Ok(Json(patients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/patients/search",
    params(PatientSearchQuery),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Patients matching every given field", body = [PatientSummaryRes]),
        (status = 404, description = "No search field given", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn find_patients(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<PatientSearchQuery>,
) -> ApiResult<Json<Vec<PatientSummaryRes>>> {
    let patients = PatientService::new(state.ctx).find_patients(&actor, &query.into())?;
    Ok(Json(patients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/patients/{id}",
    params(("id" = String, Path, description = "Patient public id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "The full patient record", body = PatientRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientRes>> {
    let view = PatientService::new(state.ctx).get_full(&actor, &patient_ref(&id)?)?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    get,
    path = "/v1/patients/{id}/summary",
    params(("id" = String, Path, description = "Patient public id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Demographics and addresses only", body = PatientSummaryRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_patient_summary(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientSummaryRes>> {
    let summary = PatientService::new(state.ctx).get_minimal(&actor, &patient_ref(&id)?)?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/patients/{id}",
    params(("id" = String, Path, description = "Patient public id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Patient and its account deleted", body = SuccessRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessRes>> {
    PatientService::new(state.ctx).delete_patient(&actor, &patient_ref(&id)?)?;
    Ok(Json(SuccessRes::ok()))
}

#[utoipa::path(
    post,
    path = "/v1/patients/{id}/blood-tests",
    params(("id" = String, Path, description = "Patient public id")),
    request_body = BloodTestResultReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Blood test result stored", body = BloodTestResultRes),
        (status = 400, description = "Field does not belong to the blood test", body = ErrorRes),
        (status = 404, description = "Unknown patient or blood test", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_blood_test_result(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<BloodTestResultReq>,
) -> ApiResult<(StatusCode, Json<BloodTestResultRes>)> {
    let result = PatientService::new(state.ctx).create_blood_test_result(
        &actor,
        &patient_ref(&id)?,
        req.into(),
    )?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

#[utoipa::path(
    put,
    path = "/v1/patients/{id}/blood-tests/{result_id}",
    params(
        ("id" = String, Path, description = "Patient public id"),
        ("result_id" = u64, Path, description = "Blood test result id")
    ),
    request_body = CompleteBloodTestResultReq,
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Pending result completed", body = BloodTestResultRes),
        (status = 400, description = "Result is not pending", body = ErrorRes),
        (status = 404, description = "Unknown patient or result", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn complete_blood_test_result(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((id, result_id)): Path<(String, u64)>,
    Json(req): Json<CompleteBloodTestResultReq>,
) -> ApiResult<Json<BloodTestResultRes>> {
    let result = PatientService::new(state.ctx).update_pending_result(
        &actor,
        &patient_ref(&id)?,
        result_id,
        req.filled_fields.into_iter().map(Into::into).collect(),
    )?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/v1/patients/{id}/joints-evaluations",
    params(("id" = String, Path, description = "Patient public id")),
    request_body = JointsEvaluationReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Joints evaluation stored", body = JointsEvaluationRes),
        (status = 400, description = "Score out of range", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_joints_evaluation(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<JointsEvaluationReq>,
) -> ApiResult<(StatusCode, Json<JointsEvaluationRes>)> {
    let evaluation = PatientService::new(state.ctx).create_joints_evaluation(
        &actor,
        &patient_ref(&id)?,
        req.into(),
    )?;
    Ok((StatusCode::CREATED, Json(evaluation.into())))
}

#[utoipa::path(
    post,
    path = "/v1/patients/{id}/diagnoses",
    params(("id" = String, Path, description = "Patient public id")),
    request_body = DiagnosisResultReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Diagnosis recorded", body = DiagnosisResultRes),
        (status = 404, description = "Unknown patient or diagnosis", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_diagnosis_result(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<DiagnosisResultReq>,
) -> ApiResult<(StatusCode, Json<DiagnosisResultRes>)> {
    let result = PatientService::new(state.ctx).create_diagnosis_result(
        &actor,
        &patient_ref(&id)?,
        req.diagnosis_id,
    )?;
    Ok((StatusCode::CREATED, Json(result.into())))
}
