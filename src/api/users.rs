use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::User;

use super::nullable;
use super::validation::{Checker, Validate, ValidationErrors, MAX_TEXT_LEN};

fn default_true() -> bool {
    true
}

fn full_name(update: &Option<Option<String>>) -> Option<&str> {
    update.as_ref().and_then(Option::as_deref)
}

/// `POST /users/signup`
#[derive(Debug, Clone, Deserialize)]
pub struct UserRegister {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Validate for UserRegister {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::new()
            .email("email", &self.email)
            .password("password", &self.password)
            .max_length("full_name", self.full_name.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

/// `POST /users` (administrators)
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::new()
            .email("email", &self.email)
            .password("password", &self.password)
            .max_length("full_name", self.full_name.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

/// `PATCH /users/{id}` (administrators). Absent fields are left alone;
/// `"full_name": null` clears the name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub full_name: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checker = Checker::new();
        if let Some(email) = &self.email {
            checker.email("email", email);
        }
        if let Some(password) = &self.password {
            checker.password("password", password);
        }
        checker
            .max_length("full_name", full_name(&self.full_name), MAX_TEXT_LEN)
            .finish()
    }
}

/// `PATCH /users/me`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateMe {
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub full_name: Option<Option<String>>,
    pub email: Option<String>,
}

impl Validate for UserUpdateMe {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checker = Checker::new();
        if let Some(email) = &self.email {
            checker.email("email", email);
        }
        checker
            .max_length("full_name", full_name(&self.full_name), MAX_TEXT_LEN)
            .finish()
    }
}

/// `PATCH /users/me/password`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePassword {
    pub current_password: String,
    pub new_password: String,
}

impl Validate for UpdatePassword {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::new()
            .password("current_password", &self.current_password)
            .password("new_password", &self.new_password)
            .finish()
    }
}

/// What clients see of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            full_name: user.full_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersPublic {
    pub data: Vec<UserPublic>,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn public_projection_drops_the_hash() {
        let user = User::new("a@x.com", Some("A".to_string()), "$argon2id$secret".to_string());
        let value = serde_json::to_value(UserPublic::from(user)).unwrap();
        assert!(value.get("hashed_password").is_none());
        assert_eq!(value["email"], "a@x.com");
        assert_eq!(value["is_active"], true);
    }

    #[test]
    fn admin_create_defaults_to_active_regular_user() {
        let body: UserCreate = serde_json::from_value(json!({
            "email": "a@x.com",
            "password": "pw123456"
        }))
        .unwrap();
        assert!(body.is_active);
        assert!(!body.is_superuser);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn empty_update_validates() {
        let body: UserUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(body.validate().is_ok());
        let body: UserUpdateMe = serde_json::from_value(json!({})).unwrap();
        assert!(body.validate().is_ok());
    }

    #[test]
    fn explicit_null_full_name_is_kept_apart_from_absent() {
        let body: UserUpdateMe = serde_json::from_value(json!({ "full_name": null })).unwrap();
        assert_eq!(body.full_name, Some(None));
        assert!(body.validate().is_ok());

        let body: UserUpdate = serde_json::from_value(json!({ "email": "a@x.com" })).unwrap();
        assert_eq!(body.full_name, None);
    }

    #[test]
    fn register_reports_bad_fields() {
        let body = UserRegister {
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
            full_name: None,
        };
        let errors = body.validate().unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
    }
}
