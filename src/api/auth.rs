use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::security;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::auth::{LoginRequest, TokenResponse};
use crate::schemas::user::UserResponse;
use crate::services::grading::Surface;

/// Max login attempts per username per window.
const LOGIN_RATE_LIMIT: u64 = 10;
const LOGIN_RATE_WINDOW_SECONDS: u64 = 60;

const BAD_CREDENTIALS: &str = "Incorrect username or password";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let rate_key = format!("rl:login:{}", payload.username);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, LOGIN_RATE_LIMIT, LOGIN_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let user = repositories::users::find_by_username(state.db(), &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized(BAD_CREDENTIALS))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized(BAD_CREDENTIALS))?;
    if !verified {
        tracing::info!(username = %payload.username, "Rejected login");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    }

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let lifetime = security::token_lifetime(state.settings());
    let session_id = Uuid::new_v4().to_string();
    let token = security::create_access_token(&user.id, &session_id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    state
        .redis()
        .create_session(&session_id, &user.id, lifetime.whole_seconds().max(1) as u64)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to register session"))?;

    let home = Surface::home_for(user.role);

    tracing::info!(user_id = %user.id, role = ?user.role, "User logged in");

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        expires_in: lifetime.whole_seconds(),
        home: format!("{}{}", state.settings().api().api_v1_str, home.path()),
        user: UserResponse::from_db(user),
    }))
}

async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    state
        .redis()
        .revoke_session(&current.session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to revoke session"))?;

    tracing::info!(user_id = %current.user.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

async fn me(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(current.user))
}
