use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::filter::{Document, Filter};

use super::manager::DatabaseError;
use super::store::{validate_collection_name, DocumentStore};

/// Process-local store. Collections keep insertion order so pagination is stable.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(Uuid, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collection(&self, collection: &str) -> Result<(), DatabaseError> {
        validate_collection_name(collection)?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default();
        Ok(())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(key, _)| *key == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(_, doc)| filter.matches(doc)))
            .map(|(_, doc)| doc.clone()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };
        let matching = docs
            .iter()
            .filter(|(_, doc)| filter.matches(doc))
            .map(|(_, doc)| doc.clone());
        Ok(filter.window(matching))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|(_, doc)| filter.matches(doc)).count() as u64)
            .unwrap_or(0))
    }

    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        mut doc: Document,
    ) -> Result<(), DatabaseError> {
        validate_collection_name(collection)?;
        doc.insert("id".to_string(), Value::String(id.to_string()));
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push((id, doc));
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Document>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some((_, doc)) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(key, _)| *key == id))
        else {
            return Ok(None);
        };
        for (field, value) in patch {
            doc.insert(field, value);
        }
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(key, _)| *key != id);
        Ok(docs.len() != before)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|(_, doc)| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
