//! Buyer reviews of artisans, moderated before publication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use crate::{
    models::audit_log::AuditAction,
    types::{ArtisanId, ReviewId, UserId},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    #[schema(value_type = String)]
    pub id: ReviewId,
    #[schema(value_type = String)]
    pub artisan_id: ArtisanId,
    #[schema(value_type = String)]
    pub reviewer_id: UserId,
    /// Star rating between 1 and 5.
    pub rating: i16,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    #[schema(value_type = Option<String>)]
    pub moderated_by: Option<UserId>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "review_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [
        ReviewStatus::Pending,
        ReviewStatus::Approved,
        ReviewStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ReviewStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown review status `{}`", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn target_status(&self) -> ReviewStatus {
        match self {
            ReviewAction::Approve => ReviewStatus::Approved,
            ReviewAction::Reject => ReviewStatus::Rejected,
        }
    }

    pub fn audit_action(&self) -> AuditAction {
        match self {
            ReviewAction::Approve => AuditAction::ApproveReview,
            ReviewAction::Reject => AuditAction::RejectReview,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }
}

/// Moderation decision on a review that is still `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewTransition {
    pub id: ReviewId,
    pub expected: ReviewStatus,
    pub status: ReviewStatus,
    pub moderated_by: UserId,
    pub moderated_at: DateTime<Utc>,
}

impl ReviewTransition {
    pub fn new(
        id: ReviewId,
        action: ReviewAction,
        moderated_by: UserId,
        moderated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            expected: ReviewStatus::Pending,
            status: action.target_status(),
            moderated_by,
            moderated_at,
        }
    }

    pub fn apply(&self, review: &Review) -> Review {
        let mut updated = review.clone();
        updated.status = self.status;
        updated.moderated_by = Some(self.moderated_by);
        updated.moderated_at = Some(self.moderated_at);
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_stamps_moderator() {
        let moderator = UserId::new();
        let now = Utc::now();
        let review = Review {
            id: ReviewId::new(),
            artisan_id: ArtisanId::new(),
            reviewer_id: UserId::new(),
            rating: 4,
            comment: Some("Quick and tidy".into()),
            status: ReviewStatus::Pending,
            moderated_by: None,
            moderated_at: None,
            created_at: now,
        };

        let transition = ReviewTransition::new(review.id, ReviewAction::Reject, moderator, now);
        let updated = transition.apply(&review);
        assert_eq!(updated.status, ReviewStatus::Rejected);
        assert_eq!(updated.moderated_by, Some(moderator));
        assert_eq!(updated.moderated_at, Some(now));
        assert_eq!(transition.expected, ReviewStatus::Pending);
    }
}
