use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::filter::{Document, Filter};

use super::manager::DatabaseError;
use super::store::{validate_collection_name, DocumentStore};

/// Document store backed by one Postgres table per collection:
/// `(seq BIGSERIAL, id UUID PRIMARY KEY, doc JSONB)`.
///
/// Filters become JSONB containment (`doc @> $1`), partial updates become a
/// top-level merge (`doc || $2`). `seq` gives a stable insertion order for
/// offset pagination.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn table(collection: &str) -> Result<String, DatabaseError> {
        validate_collection_name(collection)?;
        Ok(Self::quote_identifier(collection))
    }

    fn into_document(collection: &str, value: Value) -> Result<Document, DatabaseError> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(DatabaseError::Corrupt {
                collection: collection.to_string(),
                message: format!("expected a JSON object, found {}", other),
            }),
        }
    }

    /// Values past `i64::MAX` saturate; an offset that large already skips every row.
    fn window_param(value: u64) -> i64 {
        i64::try_from(value).unwrap_or(i64::MAX)
    }

    /// Table plus one GIN index over the whole document. `jsonb_path_ops`
    /// serves the `doc @> $1` containment used by every filtered query.
    fn schema(collection: &str) -> Result<[String; 2], DatabaseError> {
        let table = Self::table(collection)?;
        let index = Self::quote_identifier(&format!("{}_doc_idx", collection));
        Ok([
            format!(
                "CREATE TABLE IF NOT EXISTS {} \
                 (seq BIGSERIAL NOT NULL, id UUID PRIMARY KEY, doc JSONB NOT NULL)",
                table
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} USING GIN (doc jsonb_path_ops)",
                index, table
            ),
        ])
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ensure_collection(&self, collection: &str) -> Result<(), DatabaseError> {
        for statement in Self::schema(collection)? {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        debug!("Ensured collection {}", collection);
        Ok(())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let sql = format!("SELECT doc FROM {} WHERE id = $1", Self::table(collection)?);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| Self::into_document(collection, r.try_get("doc")?))
            .transpose()
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, DatabaseError> {
        let sql = format!(
            "SELECT doc FROM {} WHERE doc @> $1 ORDER BY seq LIMIT 1",
            Self::table(collection)?
        );
        let row = sqlx::query(&sql)
            .bind(filter.containment())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| Self::into_document(collection, r.try_get("doc")?))
            .transpose()
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, DatabaseError> {
        // LIMIT NULL is LIMIT ALL
        let sql = format!(
            "SELECT doc FROM {} WHERE doc @> $1 ORDER BY seq OFFSET $2 LIMIT $3",
            Self::table(collection)?
        );
        let rows = sqlx::query(&sql)
            .bind(filter.containment())
            .bind(Self::window_param(filter.offset()))
            .bind(filter.limit().map(Self::window_param))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|r| Self::into_document(collection, r.try_get("doc")?))
            .collect()
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE doc @> $1", Self::table(collection)?);
        let count: (i64,) = sqlx::query_as(&sql)
            .bind(filter.containment())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 as u64)
    }

    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        mut doc: Document,
    ) -> Result<(), DatabaseError> {
        doc.insert("id".to_string(), Value::String(id.to_string()));
        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", Self::table(collection)?);
        sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Document>, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET doc = doc || $2 WHERE id = $1 RETURNING doc",
            Self::table(collection)?
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(patch))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| Self::into_document(collection, r.try_get("doc")?))
            .transpose()
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::table(collection)?);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE doc @> $1", Self::table(collection)?);
        let result = sqlx::query(&sql)
            .bind(filter.containment())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers() {
        assert_eq!(PgDocumentStore::quote_identifier("users"), "\"users\"");
        assert_eq!(PgDocumentStore::quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn rejects_invalid_table_names() {
        assert!(PgDocumentStore::table("items").is_ok());
        assert!(matches!(
            PgDocumentStore::table("items\"; --"),
            Err(DatabaseError::InvalidCollection(_))
        ));
    }

    #[test]
    fn collections_get_a_containment_index_over_the_document() {
        let [table, index] = PgDocumentStore::schema("items").unwrap();
        assert!(table.starts_with("CREATE TABLE IF NOT EXISTS \"items\""));
        assert!(index.starts_with("CREATE INDEX IF NOT EXISTS \"items_doc_idx\" ON \"items\""));
        assert!(index.ends_with("USING GIN (doc jsonb_path_ops)"));
        assert!(PgDocumentStore::schema("Items").is_err());
    }

    #[test]
    fn window_params_saturate_at_the_signed_range() {
        assert_eq!(PgDocumentStore::window_param(0), 0);
        assert_eq!(PgDocumentStore::window_param(i64::MAX as u64), i64::MAX);
        assert_eq!(PgDocumentStore::window_param(u64::MAX), i64::MAX);
    }

    #[test]
    fn non_object_rows_are_reported_as_corrupt() {
        let err = PgDocumentStore::into_document("users", Value::Bool(true)).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { .. }));
    }
}
