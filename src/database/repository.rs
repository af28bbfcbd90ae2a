use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::filter::{Document, Filter};

use super::manager::DatabaseError;
use super::store::DocumentStore;

/// A typed entity stored as one document in a named collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

/// Typed access to one collection of a [`DocumentStore`].
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _phantom: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn select_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn select_one(&self, filter: &Filter) -> Result<Option<T>, DatabaseError> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn select_any(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        self.store.count(T::COLLECTION, filter).await
    }

    pub async fn insert(&self, record: &T) -> Result<(), DatabaseError> {
        let doc = Self::encode(record)?;
        self.store.insert(T::COLLECTION, record.id(), doc).await
    }

    /// Apply a partial update. Fields the patch serializes are overwritten;
    /// `id` is never touched.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &impl Serialize,
    ) -> Result<Option<T>, DatabaseError> {
        let mut doc = Self::encode(patch)?;
        doc.remove("id");
        if doc.is_empty() {
            return self.select_id(id).await;
        }
        self.store
            .update(T::COLLECTION, id, doc)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.store.delete(T::COLLECTION, id).await
    }

    pub async fn delete_any(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        self.store.delete_many(T::COLLECTION, filter).await
    }

    fn encode(value: &impl Serialize) -> Result<Document, DatabaseError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(map),
            other => Err(DatabaseError::Corrupt {
                collection: T::COLLECTION.to_string(),
                message: format!("expected an object to store, found {}", other),
            }),
        }
    }

    fn decode(doc: Document) -> Result<T, DatabaseError> {
        serde_json::from_value(Value::Object(doc)).map_err(|e| DatabaseError::Corrupt {
            collection: T::COLLECTION.to_string(),
            message: e.to_string(),
        })
    }
}
