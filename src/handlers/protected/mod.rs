// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here receives the resolved account as
// `Extension<CurrentUser>`, inserted by `middleware::require_user`.

pub mod items; // /api/v1/items[/:id]
pub mod login; // POST /api/v1/login/test-token
pub mod users; // /api/v1/users/me[/password], GET /api/v1/users/:id
