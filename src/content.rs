// ============================================================================
// Content Storage
// ============================================================================
//
// Article is the reference versioned entity: tenant-scoped, soft-deleted,
// and guarded by the optimistic-concurrency version check on every
// user-editable write. The guard exemption for Article is `notified_at`,
// a system-written notification timestamp that no admin can edit
// concurrently; `mark_notified` writes it without a version bump.
//
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;
use vitrine_error::{AppError, AppResult};

use crate::db::{DbPool, with_transaction};
use crate::versioning::{self, SoftDeletable, TenantScoped, Versioned};

/// Localized article belonging to one tenant
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Article {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set once the new-content notification went out; system-written,
    /// exempt from the version guard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_at: Option<DateTime<Utc>>,
}

impl Versioned for Article {
    const ENTITY_TYPE: &'static str = "article";

    fn current_version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

impl TenantScoped for Article {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl SoftDeletable for Article {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Partial update applied after the version check passes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleChanges {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Storage seam for articles
///
/// `update_guarded` must perform the version check atomically with the field
/// write; implementations may not check-then-write in separate steps visible
/// to concurrent writers.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetch a live (non-deleted) article scoped to the tenant
    async fn fetch(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Article>;

    /// Apply `changes` if `provided_version` matches the stored version,
    /// advancing the version by one; otherwise fail with `VersionConflict`
    /// (or `NotFound` when the row is gone or soft-deleted)
    async fn update_guarded(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        provided_version: i32,
        changes: ArticleChanges,
    ) -> AppResult<Article>;

    /// Record that the new-content notification went out. System-initiated
    /// write, bypasses the version guard by design (documented exemption).
    async fn mark_notified(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()>;
}

// ============================================================================
// Postgres implementation
// ============================================================================

const SELECT_ARTICLE: &str = r"
    SELECT id, tenant_id, slug, title, body, version, updated_at, deleted_at, notified_at
    FROM articles
    WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
";

/// Postgres-backed article store
///
/// The guarded update relies on the database for conflict serialization:
/// `UPDATE ... WHERE version = $provided` bumps the version and applies the
/// field changes in one statement, and a zero affected-row count means the
/// row moved (conflict) or vanished (not found). Two concurrent writers that
/// both read version V therefore cannot both commit.
pub struct PgArticleStore {
    pool: DbPool,
}

impl PgArticleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn fetch(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Article> {
        sqlx::query_as::<_, Article>(SELECT_ARTICLE)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("article {}", id)))
    }

    async fn update_guarded(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        provided_version: i32,
        changes: ArticleChanges,
    ) -> AppResult<Article> {
        with_transaction(&self.pool, |mut tx| async move {
            let updated = sqlx::query_as::<_, Article>(
                r"
                UPDATE articles
                SET slug = COALESCE($4, slug),
                    title = COALESCE($5, title),
                    body = COALESCE($6, body),
                    version = version + 1,
                    updated_at = now()
                WHERE id = $1 AND tenant_id = $2 AND version = $3 AND deleted_at IS NULL
                RETURNING id, tenant_id, slug, title, body, version, updated_at, deleted_at, notified_at
                ",
            )
            .bind(id)
            .bind(tenant_id)
            .bind(provided_version)
            .bind(changes.slug)
            .bind(changes.title)
            .bind(changes.body)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(article) = updated {
                return Ok((tx, article));
            }

            // Zero rows: either the version moved or the row is gone.
            // Re-read inside the same transaction to report which.
            let current = sqlx::query(
                "SELECT version FROM articles WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
            )
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&mut *tx)
            .await?;

            match current {
                Some(row) => Err(AppError::VersionConflict {
                    entity_type: Article::ENTITY_TYPE.to_string(),
                    current_version: row.try_get("version")?,
                    provided_version,
                }),
                None => Err(AppError::NotFound(format!("article {}", id))),
            }
        })
        .await
    }

    async fn mark_notified(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE articles SET notified_at = now() WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// In-memory article store for tests and single-process development runs.
///
/// The mutex serializes the check-and-write, giving the same single-winner
/// guarantee the Postgres version predicate gives.
#[derive(Default)]
pub struct MemoryArticleStore {
    articles: Mutex<HashMap<Uuid, Article>>,
}

impl MemoryArticleStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a fresh article at version 1
    pub async fn insert(&self, tenant_id: Uuid, slug: &str, title: &str, body: &str) -> Article {
        let article = Article {
            id: Uuid::new_v4(),
            tenant_id,
            slug: slug.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            version: 1,
            updated_at: Utc::now(),
            deleted_at: None,
            notified_at: None,
        };
        self.articles
            .lock()
            .await
            .insert(article.id, article.clone());
        article
    }

    /// Soft-delete an article, hiding it from reads and guarded writes
    pub async fn soft_delete(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut articles = self.articles.lock().await;
        match articles.get_mut(&id) {
            Some(article) if article.tenant_id == tenant_id && !article.is_deleted() => {
                article.deleted_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("article {}", id))),
        }
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn fetch(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Article> {
        let articles = self.articles.lock().await;
        articles
            .get(&id)
            .filter(|a| a.tenant_id == tenant_id && !a.is_deleted())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("article {}", id)))
    }

    async fn update_guarded(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        provided_version: i32,
        changes: ArticleChanges,
    ) -> AppResult<Article> {
        let mut articles = self.articles.lock().await;
        let article = articles
            .get_mut(&id)
            .filter(|a| a.tenant_id == tenant_id && !a.is_deleted())
            .ok_or_else(|| AppError::NotFound(format!("article {}", id)))?;

        versioning::check_and_advance(article, provided_version)?;

        if let Some(slug) = changes.slug {
            article.slug = slug;
        }
        if let Some(title) = changes.title {
            article.title = title;
        }
        if let Some(body) = changes.body {
            article.body = body;
        }
        article.updated_at = Utc::now();

        Ok(article.clone())
    }

    async fn mark_notified(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut articles = self.articles.lock().await;
        let article = articles
            .get_mut(&id)
            .filter(|a| a.tenant_id == tenant_id && !a.is_deleted())
            .ok_or_else(|| AppError::NotFound(format!("article {}", id)))?;

        article.notified_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_is_tenant_scoped() {
        let store = MemoryArticleStore::new();
        let tenant = Uuid::new_v4();
        let other_tenant = Uuid::new_v4();
        let article = store.insert(tenant, "about", "About us", "...").await;

        assert!(store.fetch(tenant, article.id).await.is_ok());
        assert!(matches!(
            store.fetch(other_tenant, article.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn soft_deleted_articles_are_invisible() {
        let store = MemoryArticleStore::new();
        let tenant = Uuid::new_v4();
        let article = store.insert(tenant, "news", "News", "...").await;

        store.soft_delete(tenant, article.id).await.unwrap();

        assert!(store.fetch(tenant, article.id).await.is_err());
        let result = store
            .update_guarded(tenant, article.id, 1, ArticleChanges::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn mark_notified_does_not_bump_version() {
        let store = MemoryArticleStore::new();
        let tenant = Uuid::new_v4();
        let article = store.insert(tenant, "svc", "Services", "...").await;

        store.mark_notified(tenant, article.id).await.unwrap();

        let fetched = store.fetch(tenant, article.id).await.unwrap();
        assert_eq!(fetched.version, 1);
        assert!(fetched.notified_at.is_some());
    }
}
