// handlers/public/login.rs - POST /api/v1/login/access-token

use axum::{extract::rejection::FormRejection, extract::State, Form, Json};
use tracing::info;

use crate::api::{LoginForm, Token};
use crate::app::AppState;
use crate::error::ApiResult;

/// OAuth2 password flow: exchange an email and password for a bearer token.
///
/// Form fields `username` (the email) and `password`. Unknown email or a
/// wrong password gives 403 "Incorrect email or password"; an inactive
/// account gives 403 "Inactive user".
///
/// ```json
/// { "access_token": "eyJhbGciOiJIUzI1NiI...", "token_type": "bearer" }
/// ```
pub async fn login_access_token(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<Token> {
    let Form(form) = form?;
    let user = state.users.login(&form.username, &form.password).await?;
    let access_token = state.tokens.issue(user.id)?;

    info!("Issued access token for user {}", user.id);
    Ok(Json(Token::bearer(access_token)))
}
