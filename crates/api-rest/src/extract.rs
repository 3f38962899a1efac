//! Session-token extractors.

use api_shared::session_token_from_header;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use shs_core::{Actor, AuthService};

use crate::error::ApiError;
use crate::router::AppState;

/// The raw session token of the request.
pub struct SessionToken(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        session_token_from_header(header)
            .map(|token| Self(token.to_owned()))
            .ok_or(ApiError::Unauthorized)
    }
}

/// The authenticated account behind the request's session token.
pub struct CurrentActor(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionToken(token) = SessionToken::from_request_parts(parts, state).await?;
        let actor = AuthService::new(state.ctx.clone()).authenticate(&token)?;
        tracing::debug!(actor_id = actor.id, "request authenticated");
        Ok(Self(actor))
    }
}
