use axum::{
    body::Body,
    extract::{Extension, Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue,
    },
    response::Response,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::AppError,
    models::actor::Actor,
    repositories::ExportFilter,
    services::{audit_log::ClientMetadata, export::ExportKind},
    state::AppState,
    types::UserId,
    validation::rules::validate_category,
};

use super::common::{normalize_filter, parse_id, parse_optional_date};

pub const ROW_COUNT_HEADER: &str = "x-row-count";

#[derive(Debug, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// Artisan or review status, depending on the export kind.
    pub status: Option<String>,
    pub category: Option<String>,
    pub is_verified: Option<bool>,
    pub actor_id: Option<String>,
    pub action_type: Option<String>,
    pub from: Option<String>, // YYYY-MM-DD
    pub to: Option<String>,   // YYYY-MM-DD
}

#[derive(Debug, Deserialize, Serialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct MonthlyReportQuery {
    #[validate(range(min = 2000, max = 9999))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
}

fn attachment(filename: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn build_filter(q: ExportQuery) -> Result<ExportFilter, AppError> {
    let from = parse_optional_date(q.from.as_deref()).map_err(|e| AppError::BadRequest(e.into()))?;
    let to = parse_optional_date(q.to.as_deref()).map_err(|e| AppError::BadRequest(e.into()))?;
    let category = normalize_filter(q.category);
    if let Some(category) = category.as_deref() {
        validate_category(category)
            .map_err(|_| AppError::BadRequest("`category` is invalid".into()))?;
    }
    let actor_id = normalize_filter(q.actor_id)
        .map(|raw| parse_id::<UserId>(&raw, "actor"))
        .transpose()?;

    Ok(ExportFilter {
        status: normalize_filter(q.status),
        category,
        is_verified: q.is_verified,
        actor_id,
        action_type: normalize_filter(q.action_type).map(|value| value.to_ascii_lowercase()),
        from,
        to,
        time_zone: None,
    })
}

pub async fn export_csv(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Path(kind): Path<String>,
    Query(q): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let kind: ExportKind = kind.parse()?;
    let filter = build_filter(q)?;
    let export = state.export.export_csv(&actor, kind, &filter, &meta).await?;

    let mut response = Response::new(Body::from(export.content));
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(CONTENT_DISPOSITION, attachment(&export.filename));
    headers.insert(ROW_COUNT_HEADER, HeaderValue::from(export.row_count));
    Ok(response)
}

pub async fn monthly_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Query(q): Query<MonthlyReportQuery>,
) -> Result<Response, AppError> {
    q.validate()?;
    let document = state
        .export
        .monthly_summary(&actor, q.month, q.year, &meta)
        .await?;

    let mut response = Response::new(Body::from(document.bytes));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(CONTENT_DISPOSITION, attachment(&document.filename));
    Ok(response)
}
