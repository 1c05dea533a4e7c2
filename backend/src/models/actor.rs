//! The authenticated identity performing an action.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use crate::types::UserId;

/// Role carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Marketplace administrator allowed to moderate and export.
    Admin,
    /// Service provider owning an artisan profile.
    Artisan,
    /// Buyer looking for artisans.
    Buyer,
}

impl ActorRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Admin => "admin",
            ActorRole::Artisan => "artisan",
            ActorRole::Buyer => "buyer",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(ActorRole::Admin),
            "artisan" => Ok(ActorRole::Artisan),
            "buyer" => Ok(ActorRole::Buyer),
            other => Err(format!("unknown role `{}`", other)),
        }
    }
}

/// Identity resolved from the current session and threaded explicitly into
/// every privileged operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    #[schema(value_type = String)]
    pub id: UserId,
    pub role: ActorRole,
    /// Display name, when the token carries one.
    pub name: Option<String>,
}

impl Actor {
    pub fn new(id: UserId, role: ActorRole) -> Self {
        Self {
            id,
            role,
            name: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, ActorRole::Admin)
    }
}
