use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Record;

/// Stored user account. `hashed_password` never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub hashed_password: String,
}

fn default_true() -> bool {
    true
}

impl User {
    /// A fresh active, non-administrative account.
    pub fn new(
        email: impl Into<String>,
        full_name: Option<String>,
        hashed_password: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            full_name,
            is_active: true,
            is_superuser: false,
            hashed_password,
        }
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Partial update; `None` fields are left as stored, `full_name: Some(None)`
/// is written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_password: Option<String>,
}

impl UserPatch {
    pub fn password(hashed_password: String) -> Self {
        Self {
            hashed_password: Some(hashed_password),
            ..Default::default()
        }
    }
}
