use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::store::{DocumentStore, StoreError};
use crate::config::DatabaseConfig;
use crate::filter::Filter;

const UNIQUE_VIOLATION: &str = "23505";

/// Document store on Postgres: one table per collection holding JSONB
/// documents, with a `seq` column preserving insertion order.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        if !config.url.starts_with("postgres://") && !config.url.starts_with("postgresql://") {
            return Err(StoreError::InvalidDatabaseUrl(config.url.clone()));
        }
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;
        info!("Connected to Postgres document store");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn index_name(collection: &str, field: &str) -> String {
        format!("{}_{}_key", collection, field)
    }

    /// Maps a unique violation onto the document field behind the index
    fn map_write_error(collection: &str, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let field = db_err
                    .constraint()
                    .and_then(|name| name.strip_prefix(&format!("{}_", collection)))
                    .map(|rest| match rest {
                        "pkey" => "_id".to_string(),
                        other => other.strip_suffix("_key").unwrap_or(other).to_string(),
                    })
                    .unwrap_or_else(|| "unknown".to_string());
                return StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    field,
                };
            }
        }
        StoreError::Sqlx(err)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ensure_collection(&self, collection: &str, unique_fields: &[&str]) -> Result<(), StoreError> {
        Filter::validate_collection(collection)?;
        let create = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\
                \"seq\" BIGSERIAL, \
                \"id\" UUID PRIMARY KEY, \
                \"doc\" JSONB NOT NULL\
            )",
            collection
        );
        sqlx::query(&create).execute(&self.pool).await?;

        for field in unique_fields {
            let index = Self::index_name(collection, field);
            Filter::validate_collection(&index)?;
            let ddl = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS \"{}\" ON \"{}\" ((\"doc\"->>'{}'))",
                index, collection, field
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn insert(&self, collection: &str, id: Uuid, document: Value) -> Result<(), StoreError> {
        Filter::validate_collection(collection)?;
        let sql = format!("INSERT INTO \"{}\" (\"id\", \"doc\") VALUES ($1, $2)", collection);
        sqlx::query(&sql)
            .bind(id)
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, e))?;
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let sql_result = filter.to_sql(collection)?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = q.bind(p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("doc").map_err(StoreError::from))
            .collect()
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        Filter::validate_collection(collection)?;
        let sql = format!("SELECT \"doc\" FROM \"{}\" WHERE \"id\" = $1", collection);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<Value, _>("doc")?)),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Value>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Filter::validate_collection(collection)?;
        let sql = format!(
            "SELECT \"doc\" FROM \"{}\" WHERE \"id\" = ANY($1) ORDER BY \"seq\"",
            collection
        );
        let rows = sqlx::query(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("doc").map_err(StoreError::from))
            .collect()
    }

    async fn replace(&self, collection: &str, id: Uuid, document: Value) -> Result<bool, StoreError> {
        Filter::validate_collection(collection)?;
        let sql = format!("UPDATE \"{}\" SET \"doc\" = $2 WHERE \"id\" = $1", collection);
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        Filter::validate_collection(collection)?;
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", collection);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_names_follow_postgres_key_convention() {
        assert_eq!(PgDocumentStore::index_name("users", "email"), "users_email_key");
    }

    #[tokio::test]
    async fn refuses_non_postgres_urls() {
        let config = DatabaseConfig {
            url: "mysql://localhost/petora".into(),
            max_connections: 1,
            connection_timeout: 1,
        };
        let err = PgDocumentStore::connect(&config).await.err();
        assert!(matches!(err, Some(StoreError::InvalidDatabaseUrl(_))));
    }
}
