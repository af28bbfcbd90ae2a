use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use uuid::Uuid;

use crate::api::{ListQuery, Message, UserCreate, UserPublic, UserUpdate, UsersPublic, Validate};
use crate::app::AppState;
use crate::error::ApiResult;
use crate::middleware::CurrentUser;

/// GET /api/v1/users?skip=&limit=
pub async fn users_list(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<UsersPublic> {
    let Query(query) = query?;
    let (users, count) = state.users.list(&admin, query.page(&state.config.api)).await?;
    Ok(Json(UsersPublic {
        data: users.into_iter().map(UserPublic::from).collect(),
        count,
    }))
}

/// POST /api/v1/users - may create other administrators or inactive accounts
pub async fn user_create(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> ApiResult<UserPublic> {
    let Json(input) = payload?;
    input.validate()?;
    let user = state.users.create(&admin, input).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/:id
pub async fn user_patch(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<UserPublic> {
    let Path(id) = id?;
    let Json(input) = payload?;
    input.validate()?;
    let user = state.users.update_by_id(&admin, id, input).await?;
    Ok(Json(user.into()))
}

/// DELETE /api/v1/users/:id - also removes the account's items
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Message> {
    let Path(id) = id?;
    state.users.delete_by_id(&admin, id).await?;
    Ok(Json(Message::new("User deleted successfully")))
}
