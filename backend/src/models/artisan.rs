//! Artisan profiles and their moderation state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use crate::{
    models::audit_log::AuditAction,
    types::{ArtisanId, UserId},
};

/// Database representation of an artisan profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Artisan {
    #[schema(value_type = String)]
    pub id: ArtisanId,
    /// Account owning the profile; only this user may toggle availability.
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub business_name: String,
    /// Trade, e.g. `Electrician` or `Plumber`.
    pub category: String,
    pub location: String,
    pub phone: Option<String>,
    pub status: ArtisanStatus,
    pub is_verified: bool,
    pub verification_method: Option<VerificationMethod>,
    pub verified_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub verified_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "artisan_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArtisanStatus {
    /// Awaiting admin review after onboarding.
    Pending,
    /// Visible to buyers.
    Active,
    /// Hidden by an admin (rejected or suspended).
    Suspended,
    /// Temporarily unavailable at the owner's request.
    Paused,
}

impl ArtisanStatus {
    pub const ALL: [ArtisanStatus; 4] = [
        ArtisanStatus::Pending,
        ArtisanStatus::Active,
        ArtisanStatus::Suspended,
        ArtisanStatus::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtisanStatus::Pending => "pending",
            ArtisanStatus::Active => "active",
            ArtisanStatus::Suspended => "suspended",
            ArtisanStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for ArtisanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtisanStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ArtisanStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown artisan status `{}`", value))
    }
}

/// How an admin confirmed the artisan's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "verification_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// National identification number check.
    Nin,
    PhoneCall,
    InPerson,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::Nin => "nin",
            VerificationMethod::PhoneCall => "phone_call",
            VerificationMethod::InPerson => "in_person",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status changes an artisan profile can go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtisanAction {
    Approve,
    Reject,
    Suspend,
    Activate,
    /// Owner marks the profile unavailable.
    Pause,
    /// Owner marks the profile available again.
    Resume,
}

impl ArtisanAction {
    /// Statuses the profile must currently be in for the action to apply.
    pub fn allowed_from(&self) -> &'static [ArtisanStatus] {
        match self {
            ArtisanAction::Approve | ArtisanAction::Reject => &[ArtisanStatus::Pending],
            ArtisanAction::Suspend => &[ArtisanStatus::Active, ArtisanStatus::Paused],
            ArtisanAction::Activate => &[ArtisanStatus::Suspended, ArtisanStatus::Paused],
            ArtisanAction::Pause => &[ArtisanStatus::Active],
            ArtisanAction::Resume => &[ArtisanStatus::Paused],
        }
    }

    pub fn target_status(&self) -> ArtisanStatus {
        match self {
            ArtisanAction::Approve | ArtisanAction::Activate | ArtisanAction::Resume => {
                ArtisanStatus::Active
            }
            ArtisanAction::Reject | ArtisanAction::Suspend => ArtisanStatus::Suspended,
            ArtisanAction::Pause => ArtisanStatus::Paused,
        }
    }

    pub fn audit_action(&self) -> AuditAction {
        match self {
            ArtisanAction::Approve => AuditAction::ApproveArtisan,
            ArtisanAction::Reject => AuditAction::RejectArtisan,
            ArtisanAction::Suspend => AuditAction::SuspendArtisan,
            ArtisanAction::Activate => AuditAction::ActivateArtisan,
            ArtisanAction::Pause => AuditAction::PauseArtisan,
            ArtisanAction::Resume => AuditAction::ResumeArtisan,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ArtisanAction::Approve => "approve",
            ArtisanAction::Reject => "reject",
            ArtisanAction::Suspend => "suspend",
            ArtisanAction::Activate => "activate",
            ArtisanAction::Pause => "pause",
            ArtisanAction::Resume => "resume",
        }
    }

    pub fn applies_to(&self, status: ArtisanStatus) -> bool {
        self.allowed_from().contains(&status)
    }
}

/// Verification stamp written together with an approval.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub method: VerificationMethod,
    pub verified_by: UserId,
    pub verified_at: DateTime<Utc>,
}

/// A conditional status update, applied only while the profile is still in
/// one of the `expected` statuses.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtisanTransition {
    pub id: ArtisanId,
    pub expected: &'static [ArtisanStatus],
    pub status: ArtisanStatus,
    pub verification: Option<Verification>,
    pub updated_at: DateTime<Utc>,
}

impl ArtisanTransition {
    pub fn new(id: ArtisanId, action: ArtisanAction, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            expected: action.allowed_from(),
            status: action.target_status(),
            verification: None,
            updated_at,
        }
    }

    pub fn with_verification(mut self, verification: Verification) -> Self {
        self.verification = Some(verification);
        self
    }

    /// Returns the profile as it looks once the transition has been applied.
    pub fn apply(&self, artisan: &Artisan) -> Artisan {
        let mut updated = artisan.clone();
        updated.status = self.status;
        updated.updated_at = self.updated_at;
        if let Some(verification) = &self.verification {
            updated.is_verified = true;
            updated.verification_method = Some(verification.method);
            updated.verified_at = Some(verification.verified_at);
            updated.verified_by = Some(verification.verified_by);
        }
        updated
    }
}
