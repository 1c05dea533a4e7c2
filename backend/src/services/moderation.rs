//! Admin moderation of artisan profiles and reviews.
//!
//! Every status change is applied as one conditional update plus its audit
//! row, in a single store transaction.

use chrono::Utc;
use std::sync::Arc;

use crate::{
    models::{
        actor::Actor,
        artisan::{Artisan, ArtisanAction, ArtisanTransition, Verification, VerificationMethod},
        review::{Review, ReviewAction, ReviewStatus, ReviewTransition},
    },
    repositories::{artisan::ArtisanRepositoryTrait, review::ReviewRepositoryTrait},
    services::audit_log::{AuditLogEntry, AuditLogService, ClientMetadata},
    types::{ArtisanId, ReviewId},
};

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    Forbidden(String),
    #[error("cannot {action} {kind} {id} while it is {status}")]
    InvalidTransition {
        kind: &'static str,
        id: String,
        action: &'static str,
        status: String,
    },
    #[error("{kind} {id} was changed by another request")]
    Conflict { kind: &'static str, id: String },
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct ModerationService {
    artisans: Arc<dyn ArtisanRepositoryTrait>,
    reviews: Arc<dyn ReviewRepositoryTrait>,
}

fn require_admin(actor: &Actor) -> Result<(), ModerationError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ModerationError::Forbidden(
            "Only admins can moderate".to_string(),
        ))
    }
}

impl ModerationService {
    pub fn new(
        artisans: Arc<dyn ArtisanRepositoryTrait>,
        reviews: Arc<dyn ReviewRepositoryTrait>,
    ) -> Self {
        Self { artisans, reviews }
    }

    async fn load_artisan(&self, id: ArtisanId) -> Result<Artisan, ModerationError> {
        self.artisans
            .find_by_id(id)
            .await?
            .ok_or_else(|| ModerationError::NotFound {
                kind: "artisan",
                id: id.to_string(),
            })
    }

    async fn load_review(&self, id: ReviewId) -> Result<Review, ModerationError> {
        self.reviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| ModerationError::NotFound {
                kind: "review",
                id: id.to_string(),
            })
    }

    async fn transition_artisan(
        &self,
        actor: &Actor,
        artisan: Artisan,
        action: ArtisanAction,
        method: Option<VerificationMethod>,
        reason: Option<String>,
        meta: &ClientMetadata,
    ) -> Result<Artisan, ModerationError> {
        if !action.applies_to(artisan.status) {
            return Err(ModerationError::InvalidTransition {
                kind: "artisan",
                id: artisan.id.to_string(),
                action: action.verb(),
                status: artisan.status.to_string(),
            });
        }

        let now = Utc::now();
        let mut transition = ArtisanTransition::new(artisan.id, action, now);
        let mut entry = AuditLogEntry::new(action.audit_action())
            .target("artisan", artisan.id)
            .detail("name", artisan.business_name.clone());
        if let Some(method) = method {
            transition = transition.with_verification(Verification {
                method,
                verified_by: actor.id,
                verified_at: now,
            });
            entry = entry.detail("verification_method", method.as_str());
        }
        if let Some(reason) = reason {
            entry = entry.detail("reason", reason);
        }
        let audit = AuditLogService::record_for(actor, entry, meta);

        let updated = self
            .artisans
            .apply_transition(&transition, &audit)
            .await?
            .ok_or_else(|| ModerationError::Conflict {
                kind: "artisan",
                id: artisan.id.to_string(),
            })?;

        tracing::info!(
            artisan_id = %updated.id,
            actor_id = %actor.id,
            from = %artisan.status,
            to = %updated.status,
            action = action.verb(),
            "Artisan status changed"
        );
        Ok(updated)
    }

    pub async fn approve_artisan(
        &self,
        actor: &Actor,
        id: ArtisanId,
        method: VerificationMethod,
        meta: &ClientMetadata,
    ) -> Result<Artisan, ModerationError> {
        require_admin(actor)?;
        let artisan = self.load_artisan(id).await?;
        self.transition_artisan(actor, artisan, ArtisanAction::Approve, Some(method), None, meta)
            .await
    }

    pub async fn reject_artisan(
        &self,
        actor: &Actor,
        id: ArtisanId,
        reason: Option<String>,
        meta: &ClientMetadata,
    ) -> Result<Artisan, ModerationError> {
        require_admin(actor)?;
        let artisan = self.load_artisan(id).await?;
        self.transition_artisan(actor, artisan, ArtisanAction::Reject, None, reason, meta)
            .await
    }

    pub async fn suspend_artisan(
        &self,
        actor: &Actor,
        id: ArtisanId,
        reason: Option<String>,
        meta: &ClientMetadata,
    ) -> Result<Artisan, ModerationError> {
        require_admin(actor)?;
        let artisan = self.load_artisan(id).await?;
        self.transition_artisan(actor, artisan, ArtisanAction::Suspend, None, reason, meta)
            .await
    }

    pub async fn activate_artisan(
        &self,
        actor: &Actor,
        id: ArtisanId,
        meta: &ClientMetadata,
    ) -> Result<Artisan, ModerationError> {
        require_admin(actor)?;
        let artisan = self.load_artisan(id).await?;
        self.transition_artisan(actor, artisan, ArtisanAction::Activate, None, None, meta)
            .await
    }

    /// Owner toggle between `active` and `paused`.
    pub async fn set_availability(
        &self,
        actor: &Actor,
        id: ArtisanId,
        available: bool,
        meta: &ClientMetadata,
    ) -> Result<Artisan, ModerationError> {
        let artisan = self.load_artisan(id).await?;
        if artisan.user_id != actor.id {
            return Err(ModerationError::Forbidden(
                "Only the profile owner can change availability".to_string(),
            ));
        }
        let action = if available {
            ArtisanAction::Resume
        } else {
            ArtisanAction::Pause
        };
        self.transition_artisan(actor, artisan, action, None, None, meta)
            .await
    }

    async fn moderate_review(
        &self,
        actor: &Actor,
        id: ReviewId,
        action: ReviewAction,
        reason: Option<String>,
        meta: &ClientMetadata,
    ) -> Result<Review, ModerationError> {
        require_admin(actor)?;
        let review = self.load_review(id).await?;
        if review.status != ReviewStatus::Pending {
            return Err(ModerationError::InvalidTransition {
                kind: "review",
                id: id.to_string(),
                action: action.verb(),
                status: review.status.to_string(),
            });
        }

        let name = match self.artisans.find_by_id(review.artisan_id).await? {
            Some(artisan) => artisan.business_name,
            None => review.artisan_id.to_string(),
        };
        let mut entry = AuditLogEntry::new(action.audit_action())
            .target("review", id)
            .detail("name", name)
            .detail("artisan_id", review.artisan_id.to_string())
            .detail("rating", review.rating);
        if let Some(reason) = reason {
            entry = entry.detail("reason", reason);
        }
        let audit = AuditLogService::record_for(actor, entry, meta);
        let transition = ReviewTransition::new(id, action, actor.id, Utc::now());

        let updated = self
            .reviews
            .apply_transition(&transition, &audit)
            .await?
            .ok_or_else(|| ModerationError::Conflict {
                kind: "review",
                id: id.to_string(),
            })?;

        tracing::info!(
            review_id = %id,
            actor_id = %actor.id,
            to = %updated.status,
            action = action.verb(),
            "Review moderated"
        );
        Ok(updated)
    }

    pub async fn approve_review(
        &self,
        actor: &Actor,
        id: ReviewId,
        meta: &ClientMetadata,
    ) -> Result<Review, ModerationError> {
        self.moderate_review(actor, id, ReviewAction::Approve, None, meta)
            .await
    }

    pub async fn reject_review(
        &self,
        actor: &Actor,
        id: ReviewId,
        reason: Option<String>,
        meta: &ClientMetadata,
    ) -> Result<Review, ModerationError> {
        self.moderate_review(actor, id, ReviewAction::Reject, reason, meta)
            .await
    }
}
