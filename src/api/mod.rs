//! Request and response bodies for the HTTP API.

pub mod items;
pub mod nullable;
pub mod users;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::filter::Page;

pub use items::{ItemCreate, ItemPublic, ItemUpdate, ItemsPublic};
pub use users::{
    UpdatePassword, UserCreate, UserPublic, UserRegister, UserUpdate, UserUpdateMe, UsersPublic,
};
pub use validation::{Validate, ValidationErrors};

/// Plain outcome message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// OAuth2 password-flow form. `username` carries the email; other
/// OAuth2 fields (`grant_type`, `scope`, ...) are accepted and ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `?skip=&limit=` on list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl ListQuery {
    /// Resolve to a window, defaulting and clamping `limit` to the configured sizes.
    /// `skip` is capped at `i64::MAX`, the largest offset SQL accepts.
    pub fn page(&self, api: &ApiConfig) -> Page {
        let limit = self.limit.unwrap_or(api.default_page_size).min(api.max_page_size);
        let skip = self.skip.unwrap_or(0).min(i64::MAX as u64);
        Page::new(skip, limit)
    }
}
