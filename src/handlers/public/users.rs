// handlers/public/users.rs - POST /api/v1/users/signup

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::{UserPublic, UserRegister, Validate};
use crate::app::AppState;
use crate::error::ApiResult;

/// Self-registration. Always creates an active, non-administrative account;
/// an email already in use gives 409.
pub async fn user_signup(
    State(state): State<AppState>,
    payload: Result<Json<UserRegister>, JsonRejection>,
) -> ApiResult<UserPublic> {
    let Json(input) = payload?;
    input.validate()?;
    let user = state.users.register(input).await?;
    Ok(Json(user.into()))
}
