use axum::{Extension, Json};

use crate::api::UserPublic;
use crate::error::ApiResult;
use crate::middleware::CurrentUser;

/// POST /api/v1/login/test-token - echo the account behind the token
pub async fn test_token(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<UserPublic> {
    Ok(Json(user.into()))
}
