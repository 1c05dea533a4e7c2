//! Buyer-to-artisan contact events (calls, messages). Read-only here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{ArtisanId, ContactEventId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ContactEvent {
    #[schema(value_type = String)]
    pub id: ContactEventId,
    #[schema(value_type = String)]
    pub artisan_id: ArtisanId,
    #[schema(value_type = Option<String>)]
    pub buyer_id: Option<UserId>,
    /// `phone`, `whatsapp`, `email`, ...
    pub channel: String,
    pub created_at: DateTime<Utc>,
}
