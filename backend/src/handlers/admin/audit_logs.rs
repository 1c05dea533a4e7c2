use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    models::audit_log::AuditLog,
    repositories::AuditLogFilters,
    services::audit_log::AuditLogPage,
    state::AppState,
    types::UserId,
    utils::time::parse_datetime_value,
};

use super::common::{normalize_filter, parse_id};

#[derive(Debug, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AuditLogListQuery {
    pub actor_id: Option<String>,
    pub action_type: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`, inclusive.
    pub from: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` (whole day), inclusive.
    pub to: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub actor_id: String,
    pub action_type: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub details: Value,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id.to_string(),
            created_at: log.created_at,
            actor_id: log.actor_id.to_string(),
            action_type: log.action_type,
            target_type: log.target_type,
            target_id: log.target_id,
            details: Value::Object(log.details.0),
            ip: log.ip,
            user_agent: log.user_agent,
            request_id: log.request_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogListResponse {
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub items: Vec<AuditLogResponse>,
}

impl From<AuditLogPage> for AuditLogListResponse {
    fn from(page: AuditLogPage) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total_count: page.total_count,
            total_pages: page.total_pages,
            items: page.rows.into_iter().map(AuditLogResponse::from).collect(),
        }
    }
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(q): Query<AuditLogListQuery>,
) -> Result<Json<AuditLogListResponse>, AppError> {
    let (page, page_size) = (q.page, q.page_size);
    let filters = build_filters(q, &state.config.time_zone)?;
    let result = state.audit.search_logs(&filters, page, page_size).await?;
    Ok(Json(result.into()))
}

fn build_filters(q: AuditLogListQuery, tz: &Tz) -> Result<AuditLogFilters, AppError> {
    let from = match normalize_filter(q.from) {
        Some(raw) => Some(parse_datetime_value(&raw, false, tz).ok_or_else(|| {
            AppError::BadRequest("`from` must be a valid datetime (RFC3339 or YYYY-MM-DD)".into())
        })?),
        None => None,
    };
    let to = match normalize_filter(q.to) {
        Some(raw) => Some(parse_datetime_value(&raw, true, tz).ok_or_else(|| {
            AppError::BadRequest("`to` must be a valid datetime (RFC3339 or YYYY-MM-DD)".into())
        })?),
        None => None,
    };
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(AppError::BadRequest(
                "`from` must be before or equal to `to`".into(),
            ));
        }
    }

    let actor_id = normalize_filter(q.actor_id)
        .map(|raw| parse_id::<UserId>(&raw, "actor"))
        .transpose()?;

    Ok(AuditLogFilters {
        from,
        to,
        actor_id,
        action_type: normalize_filter(q.action_type).map(|value| value.to_ascii_lowercase()),
        target_type: normalize_filter(q.target_type).map(|value| value.to_ascii_lowercase()),
        target_id: normalize_filter(q.target_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_to_date_covers_the_whole_day() {
        let filters = build_filters(AuditLogListQuery {
            from: Some("2025-01-10".into()),
            to: Some("2025-01-10".into()),
            ..AuditLogListQuery::default()
        }, &chrono_tz::UTC)
        .expect("filters");
        assert_eq!(
            filters.from.unwrap().to_rfc3339(),
            "2025-01-10T00:00:00+00:00"
        );
        assert_eq!(
            filters.to.unwrap().format("%H:%M:%S").to_string(),
            "23:59:59"
        );
    }

    #[test]
    fn bare_dates_are_local_calendar_days() {
        let filters = build_filters(AuditLogListQuery {
            from: Some("2025-01-10".into()),
            to: Some("2025-01-10".into()),
            ..AuditLogListQuery::default()
        }, &chrono_tz::Africa::Lagos)
        .expect("filters");
        assert_eq!(
            filters.from.unwrap().to_rfc3339(),
            "2025-01-09T23:00:00+00:00"
        );
        assert_eq!(
            filters.to.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2025-01-10 22:59:59"
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = build_filters(AuditLogListQuery {
            from: Some("2025-02-01".into()),
            to: Some("2025-01-01".into()),
            ..AuditLogListQuery::default()
        }, &chrono_tz::UTC)
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn blank_filters_are_ignored_and_kinds_lowercased() {
        let filters = build_filters(AuditLogListQuery {
            actor_id: Some("  ".into()),
            action_type: Some("Approve_Artisan".into()),
            ..AuditLogListQuery::default()
        }, &chrono_tz::UTC)
        .expect("filters");
        assert!(filters.actor_id.is_none());
        assert_eq!(filters.action_type.as_deref(), Some("approve_artisan"));
    }

    #[test]
    fn malformed_actor_id_is_a_bad_request() {
        let err = build_filters(AuditLogListQuery {
            actor_id: Some("nope".into()),
            ..AuditLogListQuery::default()
        }, &chrono_tz::UTC)
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
