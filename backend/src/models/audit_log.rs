use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};
use std::fmt;

use crate::types::{AuditLogId, UserId};

/// Free-form detail payload attached to an audit row.
pub type AuditDetails = Map<String, Value>;

/// Append-only record of a privileged action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub created_at: DateTime<Utc>,
    pub actor_id: UserId,
    pub action_type: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub details: Json<AuditDetails>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

impl AuditLog {
    pub fn action(&self) -> AuditAction {
        AuditAction::from(self.action_type.as_str())
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.0.get(key).and_then(Value::as_str)
    }
}

/// Kind of action recorded in the audit trail.
///
/// Known kinds get their own variant; anything else written by newer code is
/// preserved verbatim in [`AuditAction::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuditAction {
    ApproveArtisan,
    RejectArtisan,
    SuspendArtisan,
    ActivateArtisan,
    PauseArtisan,
    ResumeArtisan,
    ApproveReview,
    RejectReview,
    ExportArtisans,
    ExportReviews,
    ExportContacts,
    ExportAuditLogs,
    GenerateMonthlySummary,
    Other(String),
}

impl AuditAction {
    pub const KNOWN: [AuditAction; 13] = [
        AuditAction::ApproveArtisan,
        AuditAction::RejectArtisan,
        AuditAction::SuspendArtisan,
        AuditAction::ActivateArtisan,
        AuditAction::PauseArtisan,
        AuditAction::ResumeArtisan,
        AuditAction::ApproveReview,
        AuditAction::RejectReview,
        AuditAction::ExportArtisans,
        AuditAction::ExportReviews,
        AuditAction::ExportContacts,
        AuditAction::ExportAuditLogs,
        AuditAction::GenerateMonthlySummary,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::ApproveArtisan => "approve_artisan",
            AuditAction::RejectArtisan => "reject_artisan",
            AuditAction::SuspendArtisan => "suspend_artisan",
            AuditAction::ActivateArtisan => "activate_artisan",
            AuditAction::PauseArtisan => "pause_artisan",
            AuditAction::ResumeArtisan => "resume_artisan",
            AuditAction::ApproveReview => "approve_review",
            AuditAction::RejectReview => "reject_review",
            AuditAction::ExportArtisans => "export_artisans",
            AuditAction::ExportReviews => "export_reviews",
            AuditAction::ExportContacts => "export_contacts",
            AuditAction::ExportAuditLogs => "export_audit_logs",
            AuditAction::GenerateMonthlySummary => "generate_monthly_summary",
            AuditAction::Other(raw) => raw.as_str(),
        }
    }
}

impl From<&str> for AuditAction {
    fn from(raw: &str) -> Self {
        AuditAction::KNOWN
            .into_iter()
            .find(|known| known.as_str() == raw)
            .unwrap_or_else(|| AuditAction::Other(raw.to_string()))
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuditAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuditAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(AuditAction::from(raw.as_str()))
    }
}
