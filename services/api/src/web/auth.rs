//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for signup, login, logout, and the current
//! session's view.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use mentor_booking_core::{AuthState, Identity, Notice, PortError, PortResult, View};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::dto::{ErrorResponse, NoticePayload, SessionResponse, UserPayload};
use crate::web::middleware::{session_id, SESSION_COOKIE};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserPayload,
    /// The dashboard to show: `student` or `teacher`.
    pub view: String,
    /// True when this sign-in created the user record.
    pub first_sign_in: bool,
}

#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub notice: NoticePayload,
    pub view: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn session_cookie(auth_session_id: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, auth_session_id, max_age_seconds
    )
}

/// A missing or expired auth session means signed out; any other store
/// failure is reported.
fn session_user(validated: PortResult<Uuid>) -> Result<Option<Uuid>, ApiError> {
    match validated {
        Ok(user_id) => Ok(Some(user_id)),
        Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolves the identity into a user and opens an auth session for it.
async fn open_session(
    state: &AppState,
    identity: &Identity,
) -> Result<(AuthResponse, String), ApiError> {
    // 1. Bootstrap or load the user record
    let resolution = state.resolver.resolve(identity).await?;

    // 2. Generate auth session ID and expiry
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);
    let expires_at = Utc::now() + ttl;

    // 3. Create auth session in database
    state
        .db
        .create_auth_session(&auth_session_id, resolution.user.id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            ApiError::from(e)
        })?;

    let view = AuthState::SignedIn(resolution.user.clone()).view();
    info!(user_id = %resolution.user.id, view = view.as_str(), "User signed in");

    let response = AuthResponse {
        user: (&resolution.user).into(),
        view: view.as_str().to_string(),
        first_sign_in: resolution.bootstrapped,
    };
    Ok((response, session_cookie(&auth_session_id, ttl.num_seconds())))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create an account and sign in
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 409, description = "Account already exists", body = ErrorResponse),
        (status = 502, description = "Identity provider error", body = ErrorResponse)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = state
        .identity
        .register(
            &req.email,
            &req.password,
            &req.display_name,
            req.photo_url.as_deref(),
        )
        .await?;

    let (response, cookie) = open_session(&state, &identity).await?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Sign in with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = state.identity.sign_in(&req.email, &req.password).await?;

    let (response, cookie) = open_session(&state, &identity).await?;
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Sign out and return to the login view
///
/// Always succeeds from the client's point of view; a failure to delete the
/// stored session is only logged.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(auth_session_id) = session_id(&headers) {
        if let Err(e) = state.db.delete_auth_session(auth_session_id).await {
            error!("Failed to delete auth session: {:?}", e);
        }
    }

    let response = LogoutResponse {
        notice: Notice::success("Logged out successfully").into(),
        view: View::Login.as_str().to_string(),
    };
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie("", 0))],
        Json(response),
    )
}

/// GET /session - Which view to show right now
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current view and user", body = SessionResponse)
    )
)]
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let user_id = match session_id(&headers) {
        Some(auth_session_id) => {
            session_user(state.db.validate_auth_session(auth_session_id).await)?
        }
        None => None,
    };
    let auth_state = state.resolver.current(user_id).await?;

    Ok(Json(SessionResponse {
        view: auth_state.view().as_str().to_string(),
        user: auth_state.user().map(UserPayload::from),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_carries_session_and_lifetime() {
        let cookie = session_cookie("abc", 2_592_000);
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("Max-Age=2592000"));
    }

    #[test]
    fn session_lookup_failures_are_not_sign_outs() {
        let user_id = Uuid::new_v4();
        assert_eq!(session_user(Ok(user_id)).unwrap(), Some(user_id));
        assert_eq!(session_user(Err(PortError::Unauthorized)).unwrap(), None);

        let err = session_user(Err(PortError::Unexpected("pool timed out".to_string())))
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        assert_eq!(
            session_cookie("", 0),
            "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0"
        );
    }
}
