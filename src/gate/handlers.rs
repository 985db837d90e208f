use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::AppResult;
use crate::gate::{clear_gate_cookie, gate_cookie};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/company_login.html")]
pub struct CompanyLoginTemplate;

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/company-login", get(company_login_page))
        .route("/api/company-auth/verify", post(verify))
        .route("/api/company-auth/logout", post(logout))
}

/// GET /company-login — render the gate page
pub async fn company_login_page() -> Html<CompanyLoginTemplate> {
    Html(CompanyLoginTemplate)
}

/// POST /api/company-auth/verify — check the shared passcode and issue the
/// sentinel cookie on success; no cookie leaves on a mismatch.
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> AppResult<Response> {
    if request.password == state.config.gate.passcode {
        tracing::info!("gate passcode accepted");
        let body = serde_json::json!({ "success": true, "message": "Authenticated" });
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (header::SET_COOKIE, gate_cookie(&state.config)),
            ],
            body.to_string(),
        )
            .into_response())
    } else {
        tracing::info!("gate passcode rejected");
        let body = serde_json::json!({ "success": false, "message": "Incorrect passcode" });
        Ok((
            StatusCode::UNAUTHORIZED,
            [(header::CONTENT_TYPE, "application/json".to_string())],
            body.to_string(),
        )
            .into_response())
    }
}

/// POST /api/company-auth/logout — clear the sentinel cookie. Also the target
/// of the browser-close beacon, so failures are tolerated by design.
pub async fn logout(State(state): State<AppState>) -> AppResult<Response> {
    let body = serde_json::json!({ "success": true, "message": "Logged out" });
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::SET_COOKIE, clear_gate_cookie(&state.config)),
        ],
        body.to_string(),
    )
        .into_response())
}
