use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        actor::Actor,
        artisan::{Artisan, VerificationMethod},
        review::Review,
    },
    services::audit_log::ClientMetadata,
    state::AppState,
    types::{ArtisanId, ReviewId},
    validation::rules::validate_reason,
};

use super::common::parse_id;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ApproveArtisanPayload {
    pub verification_method: VerificationMethod,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ReasonPayload {
    #[serde(default)]
    #[validate(custom(function = "validate_reason"))]
    pub reason: Option<String>,
}

impl ReasonPayload {
    fn into_reason(self) -> Result<Option<String>, AppError> {
        self.validate()?;
        Ok(self.reason.map(|reason| reason.trim().to_string()))
    }
}

// A request without a JSON body carries no reason.
fn optional_reason(body: Option<Json<ReasonPayload>>) -> Result<Option<String>, AppError> {
    match body {
        Some(Json(payload)) => payload.into_reason(),
        None => Ok(None),
    }
}

pub async fn approve_artisan(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Path(id): Path<String>,
    Json(body): Json<ApproveArtisanPayload>,
) -> Result<Json<Artisan>, AppError> {
    let id: ArtisanId = parse_id(&id, "artisan")?;
    let artisan = state
        .moderation
        .approve_artisan(&actor, id, body.verification_method, &meta)
        .await?;
    Ok(Json(artisan))
}

pub async fn reject_artisan(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Path(id): Path<String>,
    body: Option<Json<ReasonPayload>>,
) -> Result<Json<Artisan>, AppError> {
    let id: ArtisanId = parse_id(&id, "artisan")?;
    let reason = optional_reason(body)?;
    let artisan = state
        .moderation
        .reject_artisan(&actor, id, reason, &meta)
        .await?;
    Ok(Json(artisan))
}

pub async fn suspend_artisan(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Path(id): Path<String>,
    body: Option<Json<ReasonPayload>>,
) -> Result<Json<Artisan>, AppError> {
    let id: ArtisanId = parse_id(&id, "artisan")?;
    let reason = optional_reason(body)?;
    let artisan = state
        .moderation
        .suspend_artisan(&actor, id, reason, &meta)
        .await?;
    Ok(Json(artisan))
}

pub async fn activate_artisan(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Path(id): Path<String>,
) -> Result<Json<Artisan>, AppError> {
    let id: ArtisanId = parse_id(&id, "artisan")?;
    let artisan = state.moderation.activate_artisan(&actor, id, &meta).await?;
    Ok(Json(artisan))
}

pub async fn approve_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Path(id): Path<String>,
) -> Result<Json<Review>, AppError> {
    let id: ReviewId = parse_id(&id, "review")?;
    let review = state.moderation.approve_review(&actor, id, &meta).await?;
    Ok(Json(review))
}

pub async fn reject_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Path(id): Path<String>,
    body: Option<Json<ReasonPayload>>,
) -> Result<Json<Review>, AppError> {
    let id: ReviewId = parse_id(&id, "review")?;
    let reason = optional_reason(body)?;
    let review = state
        .moderation
        .reject_review(&actor, id, reason, &meta)
        .await?;
    Ok(Json(review))
}
