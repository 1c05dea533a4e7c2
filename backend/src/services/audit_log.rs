use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use std::sync::Arc;

use crate::{
    models::{
        actor::Actor,
        audit_log::{AuditAction, AuditDetails, AuditLog},
    },
    repositories::audit_log::{AuditLogFilters, AuditLogRepositoryTrait},
    types::AuditLogId,
};

/// Write-side description of a privileged action. The actor is passed next
/// to it rather than resolved from ambient session state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    pub action: AuditAction,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub details: AuditDetails,
}

impl AuditLogEntry {
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            target_type: None,
            target_id: None,
            details: AuditDetails::new(),
        }
    }

    pub fn target(mut self, kind: &str, id: impl ToString) -> Self {
        self.target_type = Some(kind.to_string());
        self.target_id = Some(id.to_string());
        self
    }

    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn details(mut self, details: AuditDetails) -> Self {
        self.details.extend(details);
        self
    }
}

/// Best-effort network metadata of the request that triggered an action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientMetadata {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The store could not be queried. Distinct from an empty result.
    #[error("audit log store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
}

/// One page of audit search results.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogPage {
    pub rows: Vec<AuditLog>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct AuditLogService {
    repo: Arc<dyn AuditLogRepositoryTrait>,
    default_page_size: i64,
    max_page_size: i64,
}

impl AuditLogService {
    pub fn new(
        repo: Arc<dyn AuditLogRepositoryTrait>,
        default_page_size: i64,
        max_page_size: i64,
    ) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            repo,
            default_page_size: default_page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }

    /// Builds the row for `entry` without writing it. `id` and `created_at`
    /// are assigned here, on the application server, and stored verbatim.
    pub fn record_for(actor: &Actor, entry: AuditLogEntry, meta: &ClientMetadata) -> AuditLog {
        AuditLog {
            id: AuditLogId::new(),
            created_at: Utc::now(),
            actor_id: actor.id,
            action_type: entry.action.to_string(),
            target_type: entry.target_type,
            target_id: entry.target_id,
            details: Json(entry.details),
            ip: meta.ip.clone(),
            user_agent: meta.user_agent.clone(),
            request_id: meta.request_id.clone(),
        }
    }

    /// Records an action. Never fails the caller: a missing actor or a store
    /// error is reported to the operational log and otherwise ignored.
    pub async fn log_action(
        &self,
        actor: Option<&Actor>,
        entry: AuditLogEntry,
        meta: &ClientMetadata,
    ) {
        let Some(actor) = actor else {
            tracing::warn!(
                action = %entry.action,
                target_id = ?entry.target_id,
                "Skipping audit log without an authenticated actor"
            );
            return;
        };

        let log = Self::record_for(actor, entry, meta);
        if let Err(err) = self.repo.insert(&log).await {
            tracing::warn!(
                error = ?err,
                action = %log.action_type,
                actor_id = %log.actor_id,
                target_id = ?log.target_id,
                "Failed to record audit log"
            );
        }
    }

    pub async fn search_logs(
        &self,
        filters: &AuditLogFilters,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<AuditLogPage, AuditError> {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);
        let offset = (page - 1).saturating_mul(page_size);

        let (rows, total_count) = self
            .repo
            .search(filters, page_size, offset)
            .await
            .map_err(AuditError::Unavailable)?;

        Ok(AuditLogPage {
            rows,
            total_count,
            page,
            page_size,
            total_pages: total_pages(total_count, page_size),
        })
    }

    pub async fn recent_activity(&self, limit: i64) -> Result<Vec<AuditLog>, AuditError> {
        self.repo
            .recent(limit.max(1))
            .await
            .map_err(AuditError::Unavailable)
    }
}

fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if total_count <= 0 {
        0
    } else {
        (total_count + page_size - 1) / page_size
    }
}
