//! Database connection pooling and transaction scoping

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres, Transaction};
use vitrine_config::DbConfig;
use vitrine_error::{AppError, AppResult};

/// Database connection pool type
pub type DbPool = Pool<Postgres>;

/// Create a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, db_config: &DbConfig) -> AppResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            db_config.acquire_timeout_secs,
        ))
        .idle_timeout(Some(std::time::Duration::from_secs(
            db_config.idle_timeout_secs,
        )))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Run `body` inside a transaction: commit on success, roll back on error.
///
/// The body receives the transaction by value and hands it back on success.
/// On error the transaction is dropped inside the body; sqlx rolls back
/// uncommitted transactions on drop, so rollback needs no explicit call at
/// the error sites. Commit stays at this single seam.
pub async fn with_transaction<T, F, Fut>(pool: &DbPool, body: F) -> AppResult<T>
where
    F: FnOnce(Transaction<'static, Postgres>) -> Fut,
    Fut: Future<Output = AppResult<(Transaction<'static, Postgres>, T)>>,
{
    let tx = pool.begin().await.map_err(AppError::from)?;
    let (tx, value) = body(tx).await?;
    tx.commit().await.map_err(AppError::from)?;
    Ok(value)
}
