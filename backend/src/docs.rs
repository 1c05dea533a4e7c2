#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::{
        admin::{
            ActivityFeedResponse, ActivityQuery, ApproveArtisanPayload, AuditLogListQuery,
            AuditLogListResponse, AuditLogResponse, ExportQuery, MonthlyReportQuery,
            ReasonPayload,
        },
        artisans::AvailabilityPayload,
    },
    models::{
        actor::ActorRole,
        artisan::{Artisan, ArtisanStatus, VerificationMethod},
        review::{Review, ReviewStatus},
    },
    services::{
        activity_feed::ActivityFeedItem,
        export::{ExportKind, MonthlySummary},
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        approve_artisan_doc,
        reject_artisan_doc,
        suspend_artisan_doc,
        activate_artisan_doc,
        set_availability_doc,
        approve_review_doc,
        reject_review_doc,
        list_audit_logs_doc,
        recent_activity_doc,
        activity_stream_doc,
        export_csv_doc,
        monthly_report_doc
    ),
    components(
        schemas(
            // moderation
            Artisan,
            ArtisanStatus,
            VerificationMethod,
            Review,
            ReviewStatus,
            ActorRole,
            ApproveArtisanPayload,
            ReasonPayload,
            AvailabilityPayload,
            // audit & activity
            AuditLogListQuery,
            AuditLogListResponse,
            AuditLogResponse,
            ActivityQuery,
            ActivityFeedResponse,
            ActivityFeedItem,
            // exports
            ExportKind,
            ExportQuery,
            MonthlyReportQuery,
            MonthlySummary
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Moderation", description = "Artisan and review moderation"),
        (name = "Artisans", description = "Owner actions on artisan profiles"),
        (name = "Audit", description = "Audit trail and activity feed"),
        (name = "Export", description = "CSV exports and monthly reports")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/artisans/{id}/approve",
    params(("id" = String, Path, description = "Artisan ID")),
    request_body = ApproveArtisanPayload,
    responses(
        (status = 200, description = "Artisan approved and verified", body = Artisan),
        (status = 404, description = "Artisan not found"),
        (status = 409, description = "Artisan is not pending")
    ),
    tag = "Moderation"
)]
fn approve_artisan_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/artisans/{id}/reject",
    params(("id" = String, Path, description = "Artisan ID")),
    request_body = ReasonPayload,
    responses(
        (status = 200, description = "Artisan rejected", body = Artisan),
        (status = 409, description = "Artisan is not pending")
    ),
    tag = "Moderation"
)]
fn reject_artisan_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/artisans/{id}/suspend",
    params(("id" = String, Path, description = "Artisan ID")),
    request_body = ReasonPayload,
    responses(
        (status = 200, description = "Artisan suspended", body = Artisan),
        (status = 409, description = "Artisan is not active or paused")
    ),
    tag = "Moderation"
)]
fn suspend_artisan_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/artisans/{id}/activate",
    params(("id" = String, Path, description = "Artisan ID")),
    responses(
        (status = 200, description = "Artisan activated", body = Artisan),
        (status = 409, description = "Artisan is not suspended or paused")
    ),
    tag = "Moderation"
)]
fn activate_artisan_doc() {}

#[utoipa::path(
    put,
    path = "/api/artisans/{id}/availability",
    params(("id" = String, Path, description = "Artisan ID")),
    request_body = AvailabilityPayload,
    responses(
        (status = 200, description = "Availability updated", body = Artisan),
        (status = 403, description = "Caller does not own the profile")
    ),
    tag = "Artisans"
)]
fn set_availability_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/reviews/{id}/approve",
    params(("id" = String, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review approved", body = Review),
        (status = 409, description = "Review already moderated")
    ),
    tag = "Moderation"
)]
fn approve_review_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/reviews/{id}/reject",
    params(("id" = String, Path, description = "Review ID")),
    request_body = ReasonPayload,
    responses(
        (status = 200, description = "Review rejected", body = Review),
        (status = 409, description = "Review already moderated")
    ),
    tag = "Moderation"
)]
fn reject_review_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    params(AuditLogListQuery),
    responses(
        (status = 200, body = AuditLogListResponse),
        (status = 503, description = "Audit store unavailable")
    ),
    tag = "Audit"
)]
fn list_audit_logs_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/activity",
    params(ActivityQuery),
    responses(
        (status = 200, body = ActivityFeedResponse),
        (status = 503, description = "Audit store unavailable")
    ),
    tag = "Audit"
)]
fn recent_activity_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/activity/stream",
    responses((status = 200, description = "Server-sent `activity` events", content_type = "text/event-stream")),
    tag = "Audit"
)]
fn activity_stream_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/export/{kind}",
    params(
        ("kind" = ExportKind, Path, description = "artisans, reviews, contacts or audit_logs"),
        ExportQuery
    ),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 400, description = "Invalid filter")
    ),
    tag = "Export"
)]
fn export_csv_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/reports/monthly",
    params(MonthlyReportQuery),
    responses(
        (status = 200, description = "PDF attachment", content_type = "application/pdf"),
        (status = 400, description = "Invalid month")
    ),
    tag = "Export"
)]
fn monthly_report_doc() {}
