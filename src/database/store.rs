use async_trait::async_trait;
use uuid::Uuid;

use crate::filter::{Document, Filter};

use super::manager::DatabaseError;

/// Collection-oriented document store. Documents are flat JSON objects whose
/// `id` field mirrors the key they were inserted under.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the collection and its lookup index if missing.
    async fn ensure_collection(&self, collection: &str) -> Result<(), DatabaseError>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError>;

    /// First match in insertion order.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, DatabaseError>;

    /// Matches in insertion order, windowed by the filter's offset/limit.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, DatabaseError>;

    /// Number of matches, ignoring the filter's offset/limit.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn insert(&self, collection: &str, id: Uuid, doc: Document) -> Result<(), DatabaseError>;

    /// Merge `patch` into the top level of the document; `None` if absent.
    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Document>, DatabaseError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, DatabaseError>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Collections are plain identifiers so they can be quoted into SQL safely.
pub(crate) fn validate_collection_name(name: &str) -> Result<(), DatabaseError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DatabaseError::InvalidCollection(name.to_string()))
    }
}
