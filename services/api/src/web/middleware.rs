//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use mentor_booking_core::AuthState;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::web::state::{AppState, CurrentUser};

/// Name of the cookie carrying the auth session id.
pub const SESSION_COOKIE: &str = "session";

/// Pulls the auth session id out of the `Cookie` header, if any.
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|id| !id.is_empty())
}

/// Middleware that validates the auth session cookie and resolves the user.
///
/// If valid, inserts a `CurrentUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Parse session ID from cookie
    let auth_session_id = session_id(req.headers()).ok_or(ApiError::Unauthenticated)?;

    // 2. Validate auth session in database, get user_id
    let user_id = state
        .db
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            debug!("Rejected auth session: {:?}", e);
            ApiError::Unauthenticated
        })?;

    // 3. Load the user record behind the session
    let user = match state.resolver.current(Some(user_id)).await {
        Ok(AuthState::SignedIn(user)) => user,
        Ok(AuthState::SignedOut) => return Err(ApiError::Unauthenticated),
        Err(e) => {
            error!("Failed to load user for session: {:?}", e);
            return Err(e.into());
        }
    };

    // 4. Insert the user into request extensions
    req.extensions_mut().insert(CurrentUser(user));

    // 5. Continue to the handler
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let headers = with_cookie("theme=dark; session=abc123; lang=en");
        assert_eq!(session_id(&headers), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_session_is_none() {
        assert_eq!(session_id(&HeaderMap::new()), None);
        assert_eq!(session_id(&with_cookie("theme=dark")), None);
        assert_eq!(session_id(&with_cookie("session=")), None);
    }
}
