//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{LinkRepository, StoreError, UniqueField};

/// Name of the unique constraint on `links.code`.
const CODE_CONSTRAINT: &str = "links_code_key";

/// Name of the unique constraint on `links.target`.
const TARGET_CONSTRAINT: &str = "links_target_key";

/// Row shape shared by every `links` query.
#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    target: String,
    clicks: i64,
    last_clicked: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(r.id, r.code, r.target, r.clicks, r.last_clicked, r.created_at)
    }
}

/// Translates a SQLx error, keeping unique violations distinguishable.
pub fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        match db.constraint() {
            Some(CODE_CONSTRAINT) => return StoreError::UniqueViolation(UniqueField::Code),
            Some(TARGET_CONSTRAINT) => return StoreError::UniqueViolation(UniqueField::Target),
            _ => {}
        }
    }

    StoreError::Backend(e.to_string())
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses SQLx prepared statements for SQL injection protection.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, target)
            VALUES ($1, $2)
            RETURNING id, code, target, clicks, last_clicked, created_at
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.target)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, clicks, last_clicked, created_at
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Link::from))
    }

    async fn find_by_target(&self, target: &str) -> Result<Option<Link>, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, clicks, last_clicked, created_at
            FROM links
            WHERE target = $1
            LIMIT 1
            "#,
        )
        .bind(target)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Link::from))
    }

    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM links WHERE code = $1)")
            .bind(code)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn list(&self) -> Result<Vec<Link>, StoreError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, clicks, last_clicked, created_at
            FROM links
            ORDER BY id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn delete(&self, code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM links WHERE code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_click(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET clicks = clicks + 1,
                last_clicked = GREATEST(COALESCE(last_clicked, $2), $2)
            WHERE code = $1
            "#,
        )
        .bind(code)
        .bind(clicked_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
