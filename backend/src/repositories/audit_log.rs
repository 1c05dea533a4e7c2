//! Audit log repository.
//!
//! The `audit_logs` table is append-only: this module inserts and reads rows
//! but has no update or delete path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::models::audit_log::AuditLog;
use crate::repositories::common::{push_clause, push_created_range, ExportFilter};
use crate::types::UserId;

const AUDIT_LOG_COLUMNS: &str = "id, created_at, actor_id, action_type, target_type, target_id, \
     details, ip, user_agent, request_id";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLogFilters {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub actor_id: Option<UserId>,
    pub action_type: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
}

impl AuditLogFilters {
    pub fn matches(&self, log: &AuditLog) -> bool {
        self.from.map_or(true, |from| log.created_at >= from)
            && self.to.map_or(true, |to| log.created_at <= to)
            && self.actor_id.map_or(true, |actor| log.actor_id == actor)
            && self
                .action_type
                .as_deref()
                .map_or(true, |action| log.action_type == action)
            && self
                .target_type
                .as_deref()
                .map_or(true, |kind| log.target_type.as_deref() == Some(kind))
            && self
                .target_id
                .as_deref()
                .map_or(true, |id| log.target_id.as_deref() == Some(id))
    }
}

/// Repository trait for the audit store.
///
/// Results are always ordered newest first, ties broken by id descending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogRepositoryTrait: Send + Sync {
    /// Append one row
    async fn insert(&self, log: &AuditLog) -> Result<(), sqlx::Error>;

    /// One page of matching rows plus the total match count
    async fn search(
        &self,
        filters: &AuditLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AuditLog>, i64), sqlx::Error>;

    /// The newest `limit` rows
    async fn recent(&self, limit: i64) -> Result<Vec<AuditLog>, sqlx::Error>;

    /// Every row matching an export filter, unpaginated
    async fn export(&self, filter: &ExportFilter) -> Result<Vec<AuditLog>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Inserts an audit row on any executor, so moderation can write it inside
/// its own transaction.
pub async fn insert_audit_log<'e, E>(executor: E, log: &AuditLog) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO audit_logs \
         (id, created_at, actor_id, action_type, target_type, target_id, details, ip, \
         user_agent, request_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(log.id)
    .bind(log.created_at)
    .bind(log.actor_id)
    .bind(&log.action_type)
    .bind(&log.target_type)
    .bind(&log.target_id)
    .bind(&log.details)
    .bind(&log.ip)
    .bind(&log.user_agent)
    .bind(&log.request_id)
    .execute(executor)
    .await
    .map(|_| ())
}

#[async_trait]
impl AuditLogRepositoryTrait for AuditLogRepository {
    async fn insert(&self, log: &AuditLog) -> Result<(), sqlx::Error> {
        insert_audit_log(&self.pool, log).await
    }

    async fn search(
        &self,
        filters: &AuditLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AuditLog>, i64), sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM audit_logs", AUDIT_LOG_COLUMNS));
        let mut has_clause = false;
        apply_audit_log_filters(&mut builder, &mut has_clause, filters);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let items = builder
            .build_query_as::<AuditLog>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM audit_logs");
        let mut count_has_clause = false;
        apply_audit_log_filters(&mut count_builder, &mut count_has_clause, filters);
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AuditLog>, sqlx::Error> {
        sqlx::query_as::<_, AuditLog>(&format!(
            "SELECT {} FROM audit_logs ORDER BY created_at DESC, id DESC LIMIT $1",
            AUDIT_LOG_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn export(&self, filter: &ExportFilter) -> Result<Vec<AuditLog>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM audit_logs", AUDIT_LOG_COLUMNS));
        let mut has_clause = false;
        if let Some(actor_id) = filter.actor_id {
            push_clause(&mut builder, &mut has_clause);
            builder.push("actor_id = ").push_bind(actor_id);
        }
        if let Some(action_type) = filter.action_type.as_ref() {
            push_clause(&mut builder, &mut has_clause);
            builder.push("action_type = ").push_bind(action_type.clone());
        }
        push_created_range(&mut builder, &mut has_clause, filter.created_range());
        builder.push(" ORDER BY created_at DESC, id DESC");

        builder
            .build_query_as::<AuditLog>()
            .fetch_all(&self.pool)
            .await
    }
}

fn apply_audit_log_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    has_clause: &mut bool,
    filters: &AuditLogFilters,
) {
    if let Some(from) = filters.from {
        push_clause(builder, has_clause);
        builder.push("created_at >= ").push_bind(from);
    }
    if let Some(to) = filters.to {
        push_clause(builder, has_clause);
        builder.push("created_at <= ").push_bind(to);
    }
    if let Some(actor_id) = filters.actor_id {
        push_clause(builder, has_clause);
        builder.push("actor_id = ").push_bind(actor_id);
    }
    if let Some(action_type) = filters.action_type.as_ref() {
        push_clause(builder, has_clause);
        builder.push("action_type = ").push_bind(action_type.clone());
    }
    if let Some(target_type) = filters.target_type.as_ref() {
        push_clause(builder, has_clause);
        builder.push("target_type = ").push_bind(target_type.clone());
    }
    if let Some(target_id) = filters.target_id.as_ref() {
        push_clause(builder, has_clause);
        builder.push("target_id = ").push_bind(target_id.clone());
    }
}
