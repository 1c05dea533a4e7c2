//! Review repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{
    audit_log::AuditLog,
    review::{Review, ReviewStatus, ReviewTransition},
};
use crate::repositories::{
    audit_log::insert_audit_log,
    common::{push_clause, push_created_range, ExportFilter},
};
use crate::types::ReviewId;

const REVIEW_COLUMNS: &str = "id, artisan_id, reviewer_id, rating, comment, status, moderated_by, \
     moderated_at, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, sqlx::Error>;

    /// Applies the moderation decision if the review is still in the expected
    /// status and records `audit` in the same transaction.
    async fn apply_transition(
        &self,
        transition: &ReviewTransition,
        audit: &AuditLog,
    ) -> Result<Option<Review>, sqlx::Error>;

    async fn list_for_export(&self, filter: &ExportFilter) -> Result<Vec<Review>, sqlx::Error>;

    /// Approved reviews created in `[from, to)`
    async fn list_approved_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Review>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepositoryTrait for ReviewRepository {
    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn apply_transition(
        &self,
        transition: &ReviewTransition,
        audit: &AuditLog,
    ) -> Result<Option<Review>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET status = $1, moderated_by = $2, moderated_at = $3 \
             WHERE id = $4 AND status = $5 RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(transition.status)
        .bind(transition.moderated_by)
        .bind(transition.moderated_at)
        .bind(transition.id)
        .bind(transition.expected)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(updated) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        insert_audit_log(&mut *tx, audit).await?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn list_for_export(&self, filter: &ExportFilter) -> Result<Vec<Review>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM reviews", REVIEW_COLUMNS));
        let mut has_clause = false;
        if let Some(status) = filter.status.as_ref() {
            push_clause(&mut builder, &mut has_clause);
            builder.push("status::text = ").push_bind(status.clone());
        }
        push_created_range(&mut builder, &mut has_clause, filter.created_range());
        builder.push(" ORDER BY created_at DESC, id DESC");

        builder
            .build_query_as::<Review>()
            .fetch_all(&self.pool)
            .await
    }

    async fn list_approved_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE status = $1 AND created_at >= $2 AND created_at < $3 \
             ORDER BY created_at, id",
            REVIEW_COLUMNS
        ))
        .bind(ReviewStatus::Approved)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }
}
