use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::{
    auth::jwt::{JwtKeys, TokenKind},
    error::AppError,
    items::repo_types::OwnerId,
    state::AppState,
};

/// Username taken from a valid bearer access token.
#[derive(Debug)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header"))?;

        let claims = JwtKeys::from_ref(state)
            .verify(token, TokenKind::Access)
            .map_err(|e| {
                warn!(error = %e, "bearer token rejected");
                AppError::unauthorized("Invalid or expired token")
            })?;

        Ok(AuthUser(claims.sub))
    }
}

/// The owner whose items a request may touch, resolved from the bearer token's username.
///
/// A token whose user no longer exists fails with `UserNotFound`, which is a server error.
#[derive(Debug, Clone)]
pub struct CurrentOwner {
    pub owner: OwnerId,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(username) = AuthUser::from_request_parts(parts, state).await?;
        let owner = state.accounts.resolve_owner(&username).await?;
        Ok(CurrentOwner { owner, username })
    }
}
