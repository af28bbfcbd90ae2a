use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Record;

/// Stored item. `owner_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: Uuid,
}

impl Item {
    pub fn new(title: impl Into<String>, description: Option<String>, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            owner_id,
        }
    }
}

impl Record for Item {
    const COLLECTION: &'static str = "items";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Partial update. Ownership cannot be patched. `description: Some(None)`
/// is written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}
