use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;

/// The account behind the request's bearer token, active at the time of the request.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Bearer authentication for protected and elevated routes.
///
/// Resolves the token to an active account and injects it as a
/// [`CurrentUser`] extension. Missing or bad tokens get 403 "Could not
/// validate credentials"; a token for a deleted account gets 404.
pub async fn require_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        debug!("{}", msg);
        ApiError::invalid_token()
    })?;

    let user_id = state.tokens.decode(token)?;
    let user = state.users.principal(user_id).await?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("bearer "))
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}
