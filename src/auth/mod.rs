//! Credentials: password hashing and bearer token signing.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{Claims, TokenCodec, TokenError};
