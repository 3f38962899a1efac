use api_shared::dto::{AccountRes, CreateAccountReq, ErrorRes, SuccessRes, UpdateAccountReq};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use shs_core::AccountService;

use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::router::AppState;

#[utoipa::path(
    post,
    path = "/v1/accounts/secretary",
    request_body = CreateAccountReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Secretary account created", body = AccountRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 403, description = "Permission denied", body = ErrorRes),
        (status = 409, description = "Username taken", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_secretary(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateAccountReq>,
) -> ApiResult<(StatusCode, Json<AccountRes>)> {
    let account =
        AccountService::new(state.ctx).create_secretary_account(&actor, req.into_request()?)?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

#[utoipa::path(
    post,
    path = "/v1/accounts/admin",
    request_body = CreateAccountReq,
    security(("session_token" = [])),
    responses(
        (status = 201, description = "Admin account created", body = AccountRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 403, description = "Permission denied", body = ErrorRes),
        (status = 409, description = "Username taken", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_admin(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateAccountReq>,
) -> ApiResult<(StatusCode, Json<AccountRes>)> {
    let account =
        AccountService::new(state.ctx).create_admin_account(&actor, req.into_request()?)?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

#[utoipa::path(
    get,
    path = "/v1/accounts",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "All accounts", body = [AccountRes]),
        (status = 403, description = "Permission denied", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_accounts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<AccountRes>>> {
    let accounts = AccountService::new(state.ctx).list_accounts(&actor)?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/accounts/{id}",
    params(("id" = u64, Path, description = "Account id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "The account", body = AccountRes),
        (status = 404, description = "Unknown account", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_account(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<AccountRes>> {
    let account = AccountService::new(state.ctx).get_account(&actor, id)?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    put,
    path = "/v1/accounts/{id}",
    params(("id" = u64, Path, description = "Account id")),
    request_body = UpdateAccountReq,
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Account updated", body = AccountRes),
        (status = 403, description = "Permission denied", body = ErrorRes),
        (status = 404, description = "Unknown account", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn update_account(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
    Json(req): Json<UpdateAccountReq>,
) -> ApiResult<Json<AccountRes>> {
    let account = AccountService::new(state.ctx).update_account(&actor, id, req.into_changes()?)?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/accounts/{id}",
    params(("id" = u64, Path, description = "Account id")),
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Account deleted", body = SuccessRes),
        (status = 403, description = "Permission denied", body = ErrorRes),
        (status = 404, description = "Unknown account", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<u64>,
) -> ApiResult<Json<SuccessRes>> {
    AccountService::new(state.ctx).delete_account(&actor, id)?;
    Ok(Json(SuccessRes::ok()))
}
