// handlers/protected/items.rs - /api/v1/items
//
// Non-administrators only ever see and touch their own items. Ownership is
// taken from the token, never from the body.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use uuid::Uuid;

use crate::api::{ItemCreate, ItemPublic, ItemUpdate, ItemsPublic, ListQuery, Message, Validate};
use crate::app::AppState;
use crate::error::ApiResult;
use crate::middleware::CurrentUser;

/// GET /api/v1/items?skip=&limit=
pub async fn items_list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<ItemsPublic> {
    let Query(query) = query?;
    let (items, count) = state.items.list(&user, query.page(&state.config.api)).await?;
    Ok(Json(ItemsPublic {
        data: items.into_iter().map(ItemPublic::from).collect(),
        count,
    }))
}

/// POST /api/v1/items
pub async fn item_create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<ItemCreate>, JsonRejection>,
) -> ApiResult<ItemPublic> {
    let Json(input) = payload?;
    input.validate()?;
    let item = state.items.create(&user, input).await?;
    Ok(Json(item.into()))
}

/// GET /api/v1/items/:id
pub async fn item_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ItemPublic> {
    let Path(id) = id?;
    let item = state.items.get(&user, id).await?;
    Ok(Json(item.into()))
}

/// PUT /api/v1/items/:id - fields left out of the body are kept
pub async fn item_update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ItemUpdate>, JsonRejection>,
) -> ApiResult<ItemPublic> {
    let Path(id) = id?;
    let Json(input) = payload?;
    input.validate()?;
    let item = state.items.update(&user, id, input).await?;
    Ok(Json(item.into()))
}

/// DELETE /api/v1/items/:id
pub async fn item_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Message> {
    let Path(id) = id?;
    state.items.delete(&user, id).await?;
    Ok(Json(Message::new("Item deleted successfully")))
}
