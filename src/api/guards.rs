use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use redis::RedisError;

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::repositories;
use crate::services::grading::{require_actor, route_surface, Actor, Surface, SurfaceDecision};

/// Authenticated user plus the session their token belongs to.
pub(crate) struct CurrentUser {
    pub(crate) user: User,
    pub(crate) session_id: String,
}

impl CurrentUser {
    pub(crate) fn actor(&self) -> Actor {
        Actor::new(self.user.id.clone(), self.user.role)
    }
}

/// Resolves the bearer token to an active user. Anything short of a valid
/// token with a live session and an active account is "no session".
async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, ApiError> {
    let Some(token) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    else {
        return Ok(None);
    };

    let Ok(claims) = security::verify_token(token, state.settings()) else {
        return Ok(None);
    };

    if !session_live(state.redis().session_active(&claims.sid, &claims.sub).await) {
        return Ok(None);
    }

    let user = repositories::users::find_by_id(state.db(), &claims.sub)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

    Ok(user
        .filter(|user| user.is_active)
        .map(|user| CurrentUser { user, session_id: claims.sid }))
}

/// A failed lookup on a connected Redis rejects the token, so a revoked
/// session is never accepted during an outage.
fn session_live(check: Result<bool, RedisError>) -> bool {
    match check {
        Ok(active) => active,
        Err(err) => {
            tracing::warn!(error = %err, "Session check failed; rejecting token");
            false
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(require_actor(resolve(parts, state).await?)?)
    }
}

async fn enter_surface(
    parts: &Parts,
    state: &AppState,
    surface: Surface,
) -> Result<Actor, ApiError> {
    let actor = resolve(parts, state).await?.map(|current| current.actor());

    match route_surface(actor.as_ref(), surface) {
        SurfaceDecision::Proceed | SurfaceDecision::Authenticate => Ok(require_actor(actor)?),
        SurfaceDecision::Redirect(home) => {
            let prefix = &state.settings().api().api_v1_str;
            Err(ApiError::Redirect(format!("{prefix}{}", home.path())))
        }
    }
}

/// Student grade surface. Faculty and admins are redirected to management.
pub(crate) struct StudentSurface(pub(crate) Actor);

#[async_trait]
impl FromRequestParts<AppState> for StudentSurface {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        enter_surface(parts, state, Surface::StudentGrades).await.map(StudentSurface)
    }
}

/// Grade management surface. Students are redirected to their own grades.
pub(crate) struct ManagementSurface(pub(crate) Actor);

#[async_trait]
impl FromRequestParts<AppState> for ManagementSurface {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        enter_surface(parts, state, Surface::GradeManagement).await.map(ManagementSurface)
    }
}
