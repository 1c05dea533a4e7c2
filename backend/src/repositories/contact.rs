//! Contact event repository (read-only).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::contact::ContactEvent;
use crate::repositories::common::{push_created_range, ExportFilter};

const CONTACT_COLUMNS: &str = "id, artisan_id, buyer_id, channel, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepositoryTrait: Send + Sync {
    async fn list_for_export(
        &self,
        filter: &ExportFilter,
    ) -> Result<Vec<ContactEvent>, sqlx::Error>;

    /// Contact events created in `[from, to)`
    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ContactEvent>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepositoryTrait for ContactRepository {
    async fn list_for_export(
        &self,
        filter: &ExportFilter,
    ) -> Result<Vec<ContactEvent>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM contact_events", CONTACT_COLUMNS));
        let mut has_clause = false;
        push_created_range(&mut builder, &mut has_clause, filter.created_range());
        builder.push(" ORDER BY created_at DESC, id DESC");

        builder
            .build_query_as::<ContactEvent>()
            .fetch_all(&self.pool)
            .await
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ContactEvent>, sqlx::Error> {
        sqlx::query_as::<_, ContactEvent>(&format!(
            "SELECT {} FROM contact_events WHERE created_at >= $1 AND created_at < $2 \
             ORDER BY created_at, id",
            CONTACT_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }
}
