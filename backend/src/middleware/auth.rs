use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{models::actor::Actor, state::AppState, utils::jwt::verify_access_token};

/// Requires a valid access token and exposes the [`Actor`] to handlers.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = authenticate_request(request.headers(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

// Auth + require admin role for admin-only routes
pub async fn auth_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = authenticate_request(request.headers(), &state.config.jwt_secret)?;
    if !actor.is_admin() {
        tracing::warn!(actor_id = %actor.id, role = %actor.role, "Non-admin hit an admin route");
        return Err(StatusCode::FORBIDDEN);
    }
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(rest) = header.strip_prefix("Bearer ") {
        return Some(rest);
    }
    if let Some(rest) = header.strip_prefix("bearer ") {
        return Some(rest);
    }
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}

fn authenticate_request(headers: &HeaderMap, secret: &str) -> Result<Actor, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = verify_access_token(token, secret).map_err(|_| StatusCode::UNAUTHORIZED)?;
    claims.to_actor().map_err(|err| {
        tracing::warn!(error = %err, "Access token carries an unusable identity");
        StatusCode::UNAUTHORIZED
    })
}
