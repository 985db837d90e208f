use askama::Template;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    /// The backend said 401. Rendered as a redirect to the login page; the
    /// login page's own handlers never convert into this variant.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The backend was unreachable or misbehaved. Scoped to the triggering
    /// action: the user gets a page with a retry affordance, nothing is fatal.
    #[error("Backend error: {0}")]
    Upstream(#[source] ApiError),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => AppError::Unauthorized,
            ApiError::NotFound => AppError::NotFound,
            ApiError::Rejected(body) => AppError::BadRequest(body.messages().join("; ")),
            other => AppError::Upstream(other),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/error.html")]
struct ErrorTemplate {
    message: String,
}

fn error_page(status: StatusCode, message: String) -> Response {
    let template = ErrorTemplate {
        message: message.clone(),
    };
    match template.render() {
        Ok(body) => (
            status,
            [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(_) => (status, message).into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => error_page(StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Unauthorized => Redirect::to("/login").into_response(),
            AppError::BadRequest(msg) => error_page(StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(err) => {
                tracing::error!("backend request failed: {}", err);
                error_page(
                    StatusCode::BAD_GATEWAY,
                    "The board is temporarily unreachable.".to_string(),
                )
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
