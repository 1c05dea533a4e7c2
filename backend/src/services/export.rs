//! CSV exports and the monthly PDF summary.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};
use utoipa::ToSchema;

use crate::{
    models::{
        actor::Actor,
        artisan::{Artisan, ArtisanStatus},
        audit_log::{AuditAction, AuditLog},
        contact::ContactEvent,
        review::{Review, ReviewStatus},
    },
    repositories::{
        artisan::ArtisanRepositoryTrait, audit_log::AuditLogRepositoryTrait,
        common::ExportFilter, contact::ContactRepositoryTrait, review::ReviewRepositoryTrait,
    },
    services::audit_log::{AuditLogEntry, AuditLogService, ClientMetadata},
    utils::{csv::CsvBuilder, pdf::PdfDocument, time},
};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0}")]
    InvalidFilter(String),
    #[error("failed to fetch export rows: {0}")]
    Fetch(#[source] sqlx::Error),
    #[error("failed to render export: {0}")]
    Render(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Artisans,
    Reviews,
    Contacts,
    AuditLogs,
}

impl ExportKind {
    /// Entity name used in file names and audit rows.
    pub fn entity(&self) -> &'static str {
        match self {
            ExportKind::Artisans => "artisans",
            ExportKind::Reviews => "reviews",
            ExportKind::Contacts => "contacts",
            ExportKind::AuditLogs => "audit_logs",
        }
    }

    pub fn audit_action(&self) -> AuditAction {
        match self {
            ExportKind::Artisans => AuditAction::ExportArtisans,
            ExportKind::Reviews => AuditAction::ExportReviews,
            ExportKind::Contacts => AuditAction::ExportContacts,
            ExportKind::AuditLogs => AuditAction::ExportAuditLogs,
        }
    }

    pub fn filename(&self, date: NaiveDate) -> String {
        format!("{}_export_{}.csv", self.entity(), date.format("%Y-%m-%d"))
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity())
    }
}

impl FromStr for ExportKind {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "artisans" => Ok(ExportKind::Artisans),
            "reviews" => Ok(ExportKind::Reviews),
            "contacts" => Ok(ExportKind::Contacts),
            "audit_logs" => Ok(ExportKind::AuditLogs),
            other => Err(ExportError::InvalidFilter(format!(
                "unknown export kind `{}`",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub new_artisans: u64,
    pub new_reviews: u64,
    pub contact_events: u64,
    /// Mean approved rating with two decimals, `"0.00"` when there are none.
    pub average_rating: String,
    pub categories: BTreeMap<String, u64>,
}

impl MonthlySummary {
    pub fn from_rows(
        year: i32,
        month: u32,
        artisans: &[Artisan],
        reviews: &[Review],
        contacts: &[ContactEvent],
    ) -> Self {
        let mut categories = BTreeMap::new();
        for artisan in artisans {
            *categories.entry(artisan.category.clone()).or_insert(0) += 1;
        }
        let average = if reviews.is_empty() {
            0.0
        } else {
            let total: i64 = reviews.iter().map(|review| i64::from(review.rating)).sum();
            total as f64 / reviews.len() as f64
        };
        Self {
            year,
            month,
            new_artisans: artisans.len() as u64,
            new_reviews: reviews.len() as u64,
            contact_events: contacts.len() as u64,
            average_rating: format!("{:.2}", average),
            categories,
        }
    }

    pub fn filename(&self) -> String {
        format!("artisan_connect_summary_{}_{}.pdf", self.year, self.month)
    }

    fn month_label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|date| date.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{}", self.year, self.month))
    }

    pub fn render_pdf(&self, generated_at: &str) -> Vec<u8> {
        let mut doc = PdfDocument::new(format!("Artisan Connect Summary {}", self.month_label()));
        doc.heading("Artisan Connect Monthly Summary")
            .line(self.month_label())
            .line(format!("Generated {}", generated_at))
            .blank()
            .line(format!("New Artisans: {}", self.new_artisans))
            .line(format!("New Reviews: {}", self.new_reviews))
            .line(format!("Contact Events: {}", self.contact_events))
            .line(format!("Average Rating: {}", self.average_rating))
            .blank()
            .heading("Artisans by Category");
        if self.categories.is_empty() {
            doc.line("No new artisans this month");
        }
        for (category, count) in &self.categories {
            doc.line(format!("{}: {}", category, count));
        }
        doc.render()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub summary: MonthlySummary,
}

#[derive(Clone)]
pub struct ExportService {
    artisans: Arc<dyn ArtisanRepositoryTrait>,
    reviews: Arc<dyn ReviewRepositoryTrait>,
    contacts: Arc<dyn ContactRepositoryTrait>,
    audit_logs: Arc<dyn AuditLogRepositoryTrait>,
    audit: AuditLogService,
    time_zone: Tz,
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

const ARTISAN_HEADERS: &[&str] = &[
    "ID",
    "Business Name",
    "Category",
    "Location",
    "Phone",
    "Status",
    "Verified",
    "Verification Method",
    "Verified At",
    "Created At",
];

fn artisan_row(artisan: &Artisan) -> Vec<String> {
    vec![
        artisan.id.to_string(),
        artisan.business_name.clone(),
        artisan.category.clone(),
        artisan.location.clone(),
        artisan.phone.clone().unwrap_or_default(),
        artisan.status.to_string(),
        artisan.is_verified.to_string(),
        optional(artisan.verification_method),
        optional(artisan.verified_at.map(timestamp)),
        timestamp(artisan.created_at),
    ]
}

const REVIEW_HEADERS: &[&str] = &[
    "ID",
    "Artisan ID",
    "Reviewer ID",
    "Rating",
    "Comment",
    "Status",
    "Moderated By",
    "Moderated At",
    "Created At",
];

fn review_row(review: &Review) -> Vec<String> {
    vec![
        review.id.to_string(),
        review.artisan_id.to_string(),
        review.reviewer_id.to_string(),
        review.rating.to_string(),
        review.comment.clone().unwrap_or_default(),
        review.status.to_string(),
        optional(review.moderated_by),
        optional(review.moderated_at.map(timestamp)),
        timestamp(review.created_at),
    ]
}

const CONTACT_HEADERS: &[&str] = &["ID", "Artisan ID", "Buyer ID", "Channel", "Created At"];

fn contact_row(contact: &ContactEvent) -> Vec<String> {
    vec![
        contact.id.to_string(),
        contact.artisan_id.to_string(),
        optional(contact.buyer_id),
        contact.channel.clone(),
        timestamp(contact.created_at),
    ]
}

const AUDIT_LOG_HEADERS: &[&str] = &[
    "ID",
    "Created At",
    "Actor ID",
    "Action",
    "Target Type",
    "Target ID",
    "Details",
    "IP",
    "User Agent",
    "Request ID",
];

fn audit_log_row(log: &AuditLog) -> Vec<String> {
    vec![
        log.id.to_string(),
        timestamp(log.created_at),
        log.actor_id.to_string(),
        log.action_type.clone(),
        log.target_type.clone().unwrap_or_default(),
        log.target_id.clone().unwrap_or_default(),
        serde_json::to_string(&log.details.0).unwrap_or_default(),
        log.ip.clone().unwrap_or_default(),
        log.user_agent.clone().unwrap_or_default(),
        log.request_id.clone().unwrap_or_default(),
    ]
}

async fn render_csv<T>(
    headers: &'static [&'static str],
    rows: Vec<T>,
    to_row: fn(&T) -> Vec<String>,
) -> Result<(String, usize), ExportError>
where
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut builder = CsvBuilder::with_headers(headers)?;
        for row in &rows {
            builder.push_row(to_row(row))?;
        }
        let count = builder.row_count();
        Ok::<_, csv::Error>((builder.finish()?, count))
    })
    .await
    .map_err(|err| ExportError::Render(err.to_string()))?
    .map_err(|err| ExportError::Render(err.to_string()))
}

/// Rejects filters that cannot apply to `kind` and normalizes the status.
pub fn validate_filter(kind: ExportKind, filter: &ExportFilter) -> Result<ExportFilter, ExportError> {
    let mut filter = filter.clone();
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(ExportError::InvalidFilter(
                "`from` must be on or before `to`".into(),
            ));
        }
    }
    if let Some(status) = filter.status.as_deref() {
        let normalized = match kind {
            ExportKind::Artisans => ArtisanStatus::from_str(status)
                .map(|status| status.as_str())
                .map_err(ExportError::InvalidFilter)?,
            ExportKind::Reviews => ReviewStatus::from_str(status)
                .map(|status| status.as_str())
                .map_err(ExportError::InvalidFilter)?,
            ExportKind::Contacts | ExportKind::AuditLogs => {
                return Err(ExportError::InvalidFilter(format!(
                    "`status` does not apply to {} exports",
                    kind
                )))
            }
        };
        filter.status = Some(normalized.to_string());
    }
    Ok(filter)
}

impl ExportService {
    pub fn new(
        artisans: Arc<dyn ArtisanRepositoryTrait>,
        reviews: Arc<dyn ReviewRepositoryTrait>,
        contacts: Arc<dyn ContactRepositoryTrait>,
        audit_logs: Arc<dyn AuditLogRepositoryTrait>,
        audit: AuditLogService,
        time_zone: Tz,
    ) -> Self {
        Self {
            artisans,
            reviews,
            contacts,
            audit_logs,
            audit,
            time_zone,
        }
    }

    pub async fn export_csv(
        &self,
        actor: &Actor,
        kind: ExportKind,
        filter: &ExportFilter,
        meta: &ClientMetadata,
    ) -> Result<CsvExport, ExportError> {
        let mut filter = validate_filter(kind, filter)?;
        filter.time_zone = Some(self.time_zone);

        let (content, row_count) = match kind {
            ExportKind::Artisans => {
                let rows = self
                    .artisans
                    .list_for_export(&filter)
                    .await
                    .map_err(ExportError::Fetch)?;
                render_csv(ARTISAN_HEADERS, rows, artisan_row).await?
            }
            ExportKind::Reviews => {
                let rows = self
                    .reviews
                    .list_for_export(&filter)
                    .await
                    .map_err(ExportError::Fetch)?;
                render_csv(REVIEW_HEADERS, rows, review_row).await?
            }
            ExportKind::Contacts => {
                let rows = self
                    .contacts
                    .list_for_export(&filter)
                    .await
                    .map_err(ExportError::Fetch)?;
                render_csv(CONTACT_HEADERS, rows, contact_row).await?
            }
            ExportKind::AuditLogs => {
                let rows = self
                    .audit_logs
                    .export(&filter)
                    .await
                    .map_err(ExportError::Fetch)?;
                render_csv(AUDIT_LOG_HEADERS, rows, audit_log_row).await?
            }
        };

        let entry = AuditLogEntry::new(kind.audit_action())
            .details(filter.to_details())
            .detail("row_count", row_count as u64);
        self.audit.log_action(Some(actor), entry, meta).await;

        tracing::info!(kind = %kind, row_count, actor_id = %actor.id, "CSV export generated");
        Ok(CsvExport {
            filename: kind.filename(time::today_local(&self.time_zone)),
            content,
            row_count,
        })
    }

    pub async fn monthly_summary(
        &self,
        actor: &Actor,
        month: u32,
        year: i32,
        meta: &ClientMetadata,
    ) -> Result<SummaryDocument, ExportError> {
        let (from, to) = time::month_bounds(year, month, &self.time_zone).ok_or_else(|| {
            ExportError::InvalidFilter(format!("invalid month {}-{}", year, month))
        })?;

        let (artisans, reviews, contacts) = tokio::try_join!(
            self.artisans.list_created_between(from, to),
            self.reviews.list_approved_created_between(from, to),
            self.contacts.list_created_between(from, to),
        )
        .map_err(ExportError::Fetch)?;

        let summary = MonthlySummary::from_rows(year, month, &artisans, &reviews, &contacts);
        let generated_at = time::now_in_timezone(&self.time_zone)
            .format("%Y-%m-%d %H:%M %Z")
            .to_string();
        let bytes = summary.render_pdf(&generated_at);

        let entry = AuditLogEntry::new(AuditAction::GenerateMonthlySummary)
            .detail("year", year)
            .detail("month", month)
            .detail("new_artisans", summary.new_artisans)
            .detail("new_reviews", summary.new_reviews)
            .detail("contact_events", summary.contact_events)
            .detail(
                "row_count",
                summary.new_artisans + summary.new_reviews + summary.contact_events,
            );
        self.audit.log_action(Some(actor), entry, meta).await;

        tracing::info!(year, month, actor_id = %actor.id, "Monthly summary generated");
        Ok(SummaryDocument {
            filename: summary.filename(),
            bytes,
            summary,
        })
    }
}
