//! Blood tests, viruses, medicines and the diagnosis catalogue.

use api_shared::dto::{
    BloodTestReq, BloodTestRes, DiagnosisReq, DiagnosisRes, ErrorRes, MedicineReq, MedicineRes,
    SuccessRes, VirusReq, VirusRes,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use shs_core::CatalogueService;

use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::router::AppState;

// ============================================================================
// BLOOD TESTS
// ============================================================================

#[utoipa::path(
    post,
    path = "/v1/blood-tests",
    request_body = BloodTestReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Blood test created", body = BloodTestRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_blood_test(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<BloodTestReq>,
) -> ApiResult<(StatusCode, Json<BloodTestRes>)> {
    let created = CatalogueService::new(state.ctx).create_blood_test(&actor, req.into())?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/v1/blood-tests",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "All blood tests", body = [BloodTestRes]),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_blood_tests(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<BloodTestRes>>> {
    let tests = CatalogueService::new(state.ctx).list_blood_tests(&actor)?;
    Ok(Json(tests.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/blood-tests/{id}",
    params(("id" = u64, Path, description = "Blood test id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "The blood test", body = BloodTestRes),
        (status = 404, description = "Unknown blood test", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_blood_test(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<BloodTestRes>> {
    let test = CatalogueService::new(state.ctx).get_blood_test(&actor, id)?;
    Ok(Json(test.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/blood-tests/{id}",
    params(("id" = u64, Path, description = "Blood test id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Blood test deleted", body = SuccessRes),
        (status = 404, description = "Unknown blood test", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_blood_test(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<SuccessRes>> {
    CatalogueService::new(state.ctx).delete_blood_test(&actor, id)?;
    Ok(Json(SuccessRes::ok()))
}

// ============================================================================
// VIRUSES
// ============================================================================

#[utoipa::path(
    post,
    path = "/v1/viruses",
    request_body = VirusReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Virus created", body = VirusRes),
        (status = 400, description = "Invalid input or unknown blood test id", body = ErrorRes),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_virus(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<VirusReq>,
) -> ApiResult<(StatusCode, Json<VirusRes>)> {
    let virus = CatalogueService::new(state.ctx).create_virus(&actor, req.into())?;
    Ok((StatusCode::CREATED, Json(virus.into())))
}

#[utoipa::path(
    get,
    path = "/v1/viruses",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "All viruses", body = [VirusRes]),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_viruses(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<VirusRes>>> {
    let viruses = CatalogueService::new(state.ctx).list_viruses(&actor)?;
    Ok(Json(viruses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/v1/viruses/{id}",
    params(("id" = u64, Path, description = "Virus id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Virus deleted", body = SuccessRes),
        (status = 404, description = "Unknown virus", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_virus(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<SuccessRes>> {
    CatalogueService::new(state.ctx).delete_virus(&actor, id)?;
    Ok(Json(SuccessRes::ok()))
}

// ============================================================================
// MEDICINES
// ============================================================================

#[utoipa::path(
    post,
    path = "/v1/medicines",
    request_body = MedicineReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Medicine created", body = MedicineRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_medicine(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<MedicineReq>,
) -> ApiResult<(StatusCode, Json<MedicineRes>)> {
    let medicine = CatalogueService::new(state.ctx).create_medicine(&actor, req.into())?;
    Ok((StatusCode::CREATED, Json(medicine.into())))
}

#[utoipa::path(
    get,
    path = "/v1/medicines",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "All medicines", body = [MedicineRes]),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_medicines(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<MedicineRes>>> {
    let medicines = CatalogueService::new(state.ctx).list_medicines(&actor)?;
    Ok(Json(medicines.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/medicines/{id}",
    params(("id" = u64, Path, description = "Medicine id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "The medicine", body = MedicineRes),
        (status = 404, description = "Unknown medicine", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_medicine(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<MedicineRes>> {
    let medicine = CatalogueService::new(state.ctx).get_medicine(&actor, id)?;
    Ok(Json(medicine.into()))
}

#[utoipa::path(
    put,
    path = "/v1/medicines/{id}",
    params(("id" = u64, Path, description = "Medicine id")),
    request_body = MedicineReq,
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Medicine updated", body = MedicineRes),
        (status = 404, description = "Unknown medicine", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn update_medicine(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
    Json(req): Json<MedicineReq>,
) -> ApiResult<Json<MedicineRes>> {
    let medicine = CatalogueService::new(state.ctx).update_medicine(&actor, id, req.into())?;
    Ok(Json(medicine.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/medicines/{id}",
    params(("id" = u64, Path, description = "Medicine id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Medicine deleted", body = SuccessRes),
        (status = 404, description = "Unknown medicine", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_medicine(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<SuccessRes>> {
    CatalogueService::new(state.ctx).delete_medicine(&actor, id)?;
    Ok(Json(SuccessRes::ok()))
}

// ============================================================================
// DIAGNOSES
// ============================================================================

#[utoipa::path(
    post,
    path = "/v1/diagnoses",
    request_body = DiagnosisReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Diagnosis created", body = DiagnosisRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_diagnosis(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<DiagnosisReq>,
) -> ApiResult<(StatusCode, Json<DiagnosisRes>)> {
    let diagnosis = CatalogueService::new(state.ctx).create_diagnosis(&actor, req.into())?;
    Ok((StatusCode::CREATED, Json(diagnosis.into())))
}

#[utoipa::path(
    get,
    path = "/v1/diagnoses",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "All diagnoses", body = [DiagnosisRes]),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_diagnoses(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<DiagnosisRes>>> {
    let diagnoses = CatalogueService::new(state.ctx).list_diagnoses(&actor)?;
    Ok(Json(diagnoses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/v1/diagnoses/{id}",
    params(("id" = u64, Path, description = "Diagnosis id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Diagnosis deleted", body = SuccessRes),
        (status = 404, description = "Unknown diagnosis", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_diagnosis(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<SuccessRes>> {
    CatalogueService::new(state.ctx).delete_diagnosis(&actor, id)?;
    Ok(Json(SuccessRes::ok()))
}
