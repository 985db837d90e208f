use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use tokio::sync::Mutex;

use crate::api::{cookie_value, RequestContext};
use crate::error::AppError;
use crate::models::User;
use crate::session::{AuthSession, BACKEND_SESSION_COOKIE};
use crate::state::AppState;

fn cookie_header(parts: &Parts) -> Option<String> {
    let joined: Vec<&str> = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if joined.is_empty() {
        None
    } else {
        Some(joined.join("; "))
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestContext::from_cookie_header(
            cookie_header(parts).as_deref(),
        ))
    }
}

/// The browsing context's session object plus everything needed to talk to
/// the backend on its behalf. This is the dependency-injection seam: handlers
/// receive their session here instead of reaching for shared state.
pub struct SessionHandle {
    pub session: Arc<Mutex<AuthSession>>,
    pub ctx: RequestContext,
    /// Backend session cookie value, when the browser sent one.
    pub key: Option<String>,
}

impl FromRequestParts<AppState> for SessionHandle {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = cookie_header(parts);
        let ctx = RequestContext::from_cookie_header(header.as_deref());
        let key = header
            .as_deref()
            .and_then(|h| cookie_value(h, BACKEND_SESSION_COOKIE))
            .map(|v| v.to_string());
        let session = state.sessions.obtain(key.as_deref()).await;
        Ok(SessionHandle { session, ctx, key })
    }
}

/// Requires an authenticated user; rejects into the central 401 redirect.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let handle = SessionHandle::from_request_parts(parts, state).await?;
        let mut session = handle.session.lock().await;
        let identity = session.resolve_identity(&state.api, &handle.ctx).await;
        identity
            .user()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Resolves to `None` instead of rejecting when the visitor is a guest.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let handle = SessionHandle::from_request_parts(parts, state).await?;
        let mut session = handle.session.lock().await;
        let identity = session.resolve_identity(&state.api, &handle.ctx).await;
        Ok(MaybeUser(identity.user().cloned()))
    }
}
