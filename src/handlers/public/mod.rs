// handlers/public/mod.rs - Public handlers (no authentication)
//
// Token acquisition and self-registration. Nothing here trusts a caller,
// so every body is validated before it reaches a service.

pub mod login; // POST /api/v1/login/access-token
pub mod users; // POST /api/v1/users/signup

pub use login::login_access_token;
pub use users::user_signup;
