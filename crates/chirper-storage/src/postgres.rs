use crate::config::DatabaseConfig;
use crate::query::ChirpQuery;
use crate::upsert;
use async_trait::async_trait;
use chirper_core::{Chirp, ChirpRepository, NewChirp, Result, StorageError};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

const SCHEMA: &str = include_str!("../ddl/postgres/schema.sql");

/// PostgreSQL implementation of the repository contract.
///
/// Users and tags are created lazily through get-or-create upserts and are
/// never deleted. A chirp, its author and its tag links are written on one
/// transaction, so readers never observe a partially stored chirp.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new connection pool.
    ///
    /// Fails when no connection can be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(map_sqlx_error)?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "connected to postgres"
        );
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Configuration(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn chirp_from_row(row: &PgRow) -> Result<Chirp> {
    Ok(Chirp {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        message: row.try_get("message").map_err(map_sqlx_error)?,
        tags: row.try_get("tags").map_err(map_sqlx_error)?,
        author: row.try_get("author").map_err(map_sqlx_error)?,
    })
}

/// Writes the author, the chirp and every tag link on `conn`.
///
/// Tags are resolved in name order so that concurrent submissions sharing new
/// tags acquire them in the same order. Links follow submission order.
async fn store_chirp(conn: &mut PgConnection, chirp: &NewChirp) -> Result<i32> {
    let author_id = upsert::get_or_create_user(conn, &chirp.author).await?;
    let chirp_id = upsert::insert_chirp(conn, author_id, &chirp.message).await?;

    let mut tag_ids = BTreeMap::new();
    for name in chirp.tags.iter().collect::<BTreeSet<_>>() {
        tag_ids.insert(name, upsert::get_or_create_tag(conn, name).await?);
    }
    for name in &chirp.tags {
        if let Some(&tag_id) = tag_ids.get(name) {
            upsert::link_tag(conn, chirp_id, tag_id).await?;
        }
    }

    Ok(chirp_id)
}

#[async_trait]
impl ChirpRepository for PostgresRepository {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Schema(e.to_string()))?;

        debug!("schema is in place");
        Ok(())
    }

    async fn create_chirp(&self, chirp: NewChirp) -> Result<i32> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(format!("failed to begin: {e}")))?;

        // A panic while the transaction is open drops `tx`, which rolls back.
        match store_chirp(&mut tx, &chirp).await {
            Ok(chirp_id) => {
                tx.commit()
                    .await
                    .map_err(|e| StorageError::Transaction(format!("failed to commit: {e}")))?;
                debug!(chirp_id, tags = chirp.tags.len(), "stored chirp");
                Ok(chirp_id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "failed to roll back chirp transaction");
                }
                Err(err)
            }
        }
    }

    async fn get_chirps(&self, tags: &[String]) -> Result<Vec<Chirp>> {
        let mut builder = ChirpQuery::list(tags)?.into_builder();

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(chirp_from_row).collect()
    }

    async fn count_chirps(
        &self,
        starting_date: &str,
        ending_date: &str,
        tags: &[String],
    ) -> Result<i64> {
        let mut builder = ChirpQuery::count(starting_date, ending_date, tags)?.into_builder();

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
