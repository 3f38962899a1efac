use api_shared::dto::{AccountRes, ErrorRes, LoginReq, LoginRes, SuccessRes};
use axum::extract::State;
use axum::response::Json;
use shs_core::AuthService;

use crate::error::ApiResult;
use crate::extract::{CurrentActor, SessionToken};
use crate::router::AppState;

#[utoipa::path(
    post,
    path = "/v1/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Session opened", body = LoginRes),
        (status = 401, description = "Invalid login credentials", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> ApiResult<Json<LoginRes>> {
    let session = AuthService::new(state.ctx).login(&req.username, &req.password)?;
    Ok(Json(session.into()))
}

#[utoipa::path(
    get,
    path = "/v1/me",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "The authenticated account", body = AccountRes),
        (status = 401, description = "Missing or invalid session", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<AccountRes>> {
    let account = AuthService::new(state.ctx).current_account(&actor)?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    post,
    path = "/v1/me/logout",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Session closed", body = SuccessRes),
        (status = 401, description = "Missing session token", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> ApiResult<Json<SuccessRes>> {
    AuthService::new(state.ctx).logout(&token)?;
    Ok(Json(SuccessRes::ok()))
}
