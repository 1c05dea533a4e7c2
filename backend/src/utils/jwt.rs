use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    models::actor::{Actor, ActorRole},
    types::UserId,
};

/// Access-token claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64, // expiration time
    pub iat: i64, // issued at
}

impl Claims {
    pub fn new(user_id: String, role: String, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user_id,
            role,
            name: None,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Resolves the acting identity carried by the token.
    pub fn to_actor(&self) -> anyhow::Result<Actor> {
        let id: UserId = self
            .sub
            .parse()
            .map_err(|_| anyhow::anyhow!("token subject is not a user id"))?;
        let role: ActorRole = self.role.parse().map_err(anyhow::Error::msg)?;
        Ok(Actor {
            id,
            role,
            name: self.name.clone(),
        })
    }
}

pub fn create_access_token(
    actor: &Actor,
    secret: &str,
    expiration_hours: u64,
) -> anyhow::Result<String> {
    let mut claims = Claims::new(
        actor.id.to_string(),
        actor.role.as_str().to_string(),
        expiration_hours,
    );
    claims.name = actor.name.clone();
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_round_trips_the_actor() {
        let mut actor = Actor::new(UserId::new(), ActorRole::Admin);
        actor.name = Some("Ngozi".into());
        let token = create_access_token(&actor, "secret", 1).expect("create token");
        let claims = verify_access_token(&token, "secret").expect("verify token");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.to_actor().expect("actor"), actor);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let actor = Actor::new(UserId::new(), ActorRole::Buyer);
        let token = create_access_token(&actor, "secret", 1).expect("create token");
        assert!(verify_access_token(&token, "other").is_err());
    }

    #[test]
    fn unknown_role_does_not_resolve_to_an_actor() {
        let claims = Claims::new(UserId::new().to_string(), "owner".into(), 1);
        assert!(claims.to_actor().is_err());
    }
}
