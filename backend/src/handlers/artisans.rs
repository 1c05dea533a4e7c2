use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{actor::Actor, artisan::Artisan},
    services::audit_log::ClientMetadata,
    state::AppState,
    types::ArtisanId,
};

use super::admin::common::parse_id;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvailabilityPayload {
    /// `false` pauses the profile, `true` makes it visible again.
    pub available: bool,
}

pub async fn set_availability(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    meta: ClientMetadata,
    Path(id): Path<String>,
    Json(body): Json<AvailabilityPayload>,
) -> Result<Json<Artisan>, AppError> {
    let id: ArtisanId = parse_id(&id, "artisan")?;
    let artisan = state
        .moderation
        .set_availability(&actor, id, body.available, &meta)
        .await?;
    Ok(Json(artisan))
}
