//! Account and item rules, callable without HTTP.

pub mod item_service;
pub mod user_service;

use thiserror::Error;

use crate::access::AccessDenied;
use crate::auth::PasswordError;
use crate::database::DatabaseError;

pub use item_service::ItemService;
pub use user_service::UserService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    #[error("{0}")]
    InvalidCredentials(&'static str),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
