use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        jwt::{JwtKeys, TokenKind},
        repo_types::User,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<StatusCode> {
    state
        .accounts
        .register(&payload.username, &payload.password)
        .await?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .accounts
        .authenticate(&payload.username, &payload.password)
        .await?;
    Ok(Json(issue_tokens(&state, user)?))
}

/// Trades a refresh token for a new pair. Only a vanished account is a 401;
/// store failures stay server errors.
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let claims = JwtKeys::from_ref(&state)
        .verify(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            AppError::unauthorized("Invalid refresh token")
        })?;

    let user = match state.accounts.current_user(&claims.sub).await {
        Ok(user) => user,
        Err(AppError::UserNotFound(username)) => {
            warn!(%username, "refresh for deleted account");
            return Err(AppError::unauthorized("User not found"));
        }
        Err(e) => return Err(e),
    };

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = state.accounts.current_user(&username).await?;
    Ok(Json(user.into()))
}

fn issue_tokens(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let pair = JwtKeys::from_ref(state).issue(&user.username)?;
    info!(user_id = user.id, username = %user.username, "tokens issued");
    Ok(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: user.into(),
    })
}
