use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use uuid::Uuid;

use crate::api::{Message, UpdatePassword, UserPublic, UserUpdateMe, Validate};
use crate::app::AppState;
use crate::error::ApiResult;
use crate::middleware::CurrentUser;

/// GET /api/v1/users/me
pub async fn me_get(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<UserPublic> {
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/me - change own email and/or full name
pub async fn me_patch(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<UserUpdateMe>, JsonRejection>,
) -> ApiResult<UserPublic> {
    let Json(input) = payload?;
    input.validate()?;
    let updated = state.users.update_me(&user, input).await?;
    Ok(Json(updated.into()))
}

/// PATCH /api/v1/users/me/password
pub async fn me_password_patch(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<UpdatePassword>, JsonRejection>,
) -> ApiResult<Message> {
    let Json(input) = payload?;
    input.validate()?;
    state.users.update_password(&user, input).await?;
    Ok(Json(Message::new("Password updated successfully")))
}

/// DELETE /api/v1/users/me - administrators must use another account
pub async fn me_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Message> {
    state.users.delete_me(&user).await?;
    Ok(Json(Message::new("User deleted successfully")))
}

/// GET /api/v1/users/:id - self, or anyone for administrators
pub async fn user_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<UserPublic> {
    let Path(id) = id?;
    let target = state.users.read_by_id(&user, id).await?;
    Ok(Json(target.into()))
}
