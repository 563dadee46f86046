use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::CurrentOwner,
    error::AppResult,
    state::AppState,
};

use super::dto::{CreateItemRequest, ItemView, ShoppingListResponse};

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", delete(delete_item))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    CurrentOwner { owner, username }: CurrentOwner,
) -> AppResult<Json<ShoppingListResponse>> {
    let overview = state.shopping.overview(owner).await?;
    Ok(Json(overview.into()))
}

#[instrument(skip(state))]
pub async fn create_item(
    State(state): State<AppState>,
    CurrentOwner { owner, username }: CurrentOwner,
    Json(body): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ItemView>)> {
    let item = state
        .shopping
        .add_item(owner, &body.name, body.quantity, body.unit_price)
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Always 204: ids the caller does not own are ignored.
#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentOwner { owner, username }: CurrentOwner,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.shopping.delete_item(owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
