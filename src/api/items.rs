use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Item, ItemPatch};

use super::nullable;
use super::validation::{Checker, Validate, ValidationErrors, MAX_TEXT_LEN};

/// `POST /items`. Unknown fields, `owner_id` included, are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for ItemCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::new()
            .length("title", &self.title, 1, MAX_TEXT_LEN)
            .max_length("description", self.description.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

/// `PUT /items/{id}`: partial in practice; absent fields are kept.
/// `"description": null` clears the description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub description: Option<Option<String>>,
}

impl Validate for ItemUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checker = Checker::new();
        if let Some(title) = &self.title {
            checker.length("title", title, 1, MAX_TEXT_LEN);
        }
        let description = self.description.as_ref().and_then(Option::as_deref);
        checker
            .max_length("description", description, MAX_TEXT_LEN)
            .finish()
    }
}

impl From<ItemUpdate> for ItemPatch {
    fn from(update: ItemUpdate) -> Self {
        Self {
            title: update.title,
            description: update.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPublic {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
}

impl From<Item> for ItemPublic {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            owner_id: item.owner_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsPublic {
    pub data: Vec<ItemPublic>,
    pub count: u64,
}
