//! Artisan profile repository.
//!
//! Status changes go through [`ArtisanRepositoryTrait::apply_transition`],
//! which writes the update and its audit row in a single transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{
    artisan::{Artisan, ArtisanTransition},
    audit_log::AuditLog,
};
use crate::repositories::{
    audit_log::insert_audit_log,
    common::{push_clause, push_created_range, ExportFilter},
};
use crate::types::ArtisanId;

const ARTISAN_COLUMNS: &str = "id, user_id, business_name, category, location, phone, status, \
     is_verified, verification_method, verified_at, verified_by, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtisanRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, id: ArtisanId) -> Result<Option<Artisan>, sqlx::Error>;

    /// Applies the transition if the profile is still in one of the expected
    /// statuses and records `audit` alongside it. Returns `None`, writing
    /// nothing, when no row matched.
    async fn apply_transition(
        &self,
        transition: &ArtisanTransition,
        audit: &AuditLog,
    ) -> Result<Option<Artisan>, sqlx::Error>;

    async fn list_for_export(&self, filter: &ExportFilter) -> Result<Vec<Artisan>, sqlx::Error>;

    /// Profiles created in `[from, to)`
    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Artisan>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct ArtisanRepository {
    pool: PgPool,
}

impl ArtisanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtisanRepositoryTrait for ArtisanRepository {
    async fn find_by_id(&self, id: ArtisanId) -> Result<Option<Artisan>, sqlx::Error> {
        sqlx::query_as::<_, Artisan>(&format!(
            "SELECT {} FROM artisans WHERE id = $1",
            ARTISAN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn apply_transition(
        &self,
        transition: &ArtisanTransition,
        audit: &AuditLog,
    ) -> Result<Option<Artisan>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE artisans SET status = ");
        builder
            .push_bind(transition.status)
            .push(", updated_at = ")
            .push_bind(transition.updated_at);
        if let Some(verification) = transition.verification.as_ref() {
            builder
                .push(", is_verified = TRUE, verification_method = ")
                .push_bind(verification.method)
                .push(", verified_at = ")
                .push_bind(verification.verified_at)
                .push(", verified_by = ")
                .push_bind(verification.verified_by);
        }
        builder
            .push(" WHERE id = ")
            .push_bind(transition.id)
            .push(" AND status IN (");
        let mut statuses = builder.separated(", ");
        for status in transition.expected {
            statuses.push_bind(*status);
        }
        statuses.push_unseparated(")");
        builder.push(" RETURNING ").push(ARTISAN_COLUMNS);

        let updated = builder
            .build_query_as::<Artisan>()
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

    async fn list_for_export(&self, filter: &ExportFilter) -> Result<Vec<Artisan>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM artisans", ARTISAN_COLUMNS));
        let mut has_clause = false;
        if let Some(status) = filter.status.as_ref() {
            push_clause(&mut builder, &mut has_clause);
            builder.push("status::text = ").push_bind(status.clone());
        }
        if let Some(category) = filter.category.as_ref() {
            push_clause(&mut builder, &mut has_clause);
            builder.push("category = ").push_bind(category.clone());
        }
        if let Some(is_verified) = filter.is_verified {
            push_clause(&mut builder, &mut has_clause);
            builder.push("is_verified = ").push_bind(is_verified);
        }
        push_created_range(&mut builder, &mut has_clause, filter.created_range());
        builder.push(" ORDER BY created_at DESC, id DESC");

        builder
            .build_query_as::<Artisan>()
            .fetch_all(&self.pool)
            .await
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Artisan>, sqlx::Error> {
        sqlx::query_as::<_, Artisan>(&format!(
            "SELECT {} FROM artisans WHERE created_at >= $1 AND created_at < $2 \
             ORDER BY created_at, id",
            ARTISAN_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }
}
