//! Company-wide password gate.
//!
//! Every page request passes through [`require_company_auth`] before any
//! other routing happens. The check is a pure per-request predicate on one
//! cookie; there is no state and no retry logic. Per-user login is a separate
//! concern layered behind this gate.

pub mod handlers;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::api::cookie_value;
use crate::config::Config;
use crate::state::AppState;

/// Exact cookie value marking a request as having passed the gate.
pub const SENTINEL: &str = "authenticated";

/// Where gated traffic is sent.
pub const GATE_PAGE: &str = "/company-login";

/// Paths that must stay reachable without the gate cookie. The verification
/// endpoints and the gate page itself have to be here or the redirect loops;
/// per-user auth pages are open so people can reach login/signup directly.
fn is_allow_listed(path: &str) -> bool {
    path == GATE_PAGE
        || path == "/login"
        || path == "/signup"
        || path.starts_with("/api/company-auth/")
        || path.starts_with("/assets/")
        || path == "/favicon.ico"
}

fn has_gate_cookie(request: &Request, config: &Config) -> bool {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|h| cookie_value(h, &config.gate.cookie_name) == Some(SENTINEL))
}

/// Middleware applied to the whole router: redirect anything outside the
/// allow-list that does not carry the sentinel cookie.
pub async fn require_company_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if is_allow_listed(path) || has_gate_cookie(&request, &state.config) {
        return next.run(request).await;
    }

    tracing::debug!(path, "no gate cookie, redirecting to {GATE_PAGE}");
    Redirect::temporary(GATE_PAGE).into_response()
}

/// Build the sentinel cookie. `cookie_max_age_secs = 0` (or an absent key in
/// a config without the default) means session-only: no Max-Age attribute,
/// the cookie dies with the browser.
pub fn gate_cookie(config: &Config) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        config.gate.cookie_name, SENTINEL
    );
    if let Some(secs) = config.gate.cookie_max_age_secs.filter(|&s| s > 0) {
        cookie.push_str(&format!("; Max-Age={secs}"));
    }
    if config.server.production {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_gate_cookie(config: &Config) -> String {
    let mut cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        config.gate.cookie_name
    );
    if config.server.production {
        cookie.push_str("; Secure");
    }
    cookie
}
