use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::{error::AppError, types::UserId};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// The caller on whose behalf a ledger command runs, as asserted by the
/// upstream gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

impl Actor {
    pub fn id(&self) -> UserId {
        self.0
    }
}

/// Rejects requests without a usable `x-actor-id` header and exposes the
/// parsed [`Actor`] to handlers as an extension.
pub async fn require_actor(mut request: Request, next: Next) -> Result<Response, AppError> {
    let actor = actor_from_headers(request.headers())?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, AppError> {
    let raw = headers
        .get(ACTOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {ACTOR_ID_HEADER} header")))?;

    raw.parse::<UserId>()
        .map(Actor)
        .map_err(|_| AppError::Unauthorized(format!("Invalid {ACTOR_ID_HEADER} header")))
}
