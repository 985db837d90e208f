use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::api::{posts, RequestContext};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, SessionHandle};
use crate::models::{Post, User};
use crate::routes::home::Html;
use crate::session::{LoginError, SessionRefresh, SignupError};
use crate::state::AppState;
use crate::validate::SignupForm;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/signup", get(signup_page).post(signup))
        .route("/logout", post(logout))
        .route("/profile", get(profile))
}

// -- Templates --

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub error: String,
    pub username: String,
}

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub errors: Vec<String>,
    pub username: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub user: Option<User>,
    pub my_posts: Vec<Post>,
    pub liked_posts: Vec<Post>,
}

/// Redirect to `/` with any backend session cookies attached: the full
/// application-shell reload after an identity change.
fn reload_shell(refresh: SessionRefresh) -> Response {
    let cookies: Vec<(header::HeaderName, String)> = refresh
        .set_cookies
        .into_iter()
        .map(|cookie| (header::SET_COOKIE, cookie))
        .collect();
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, "/".to_string())],
        AppendHeaders(cookies),
        "",
    )
        .into_response()
}

// -- Login --

/// GET /login
pub async fn login_page() -> Html<LoginTemplate> {
    Html(LoginTemplate {
        error: String::new(),
        username: String::new(),
    })
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login — bad credentials re-render the page inline; this handler
/// never converts a backend 401 into the login redirect (we are already
/// there).
pub async fn login(
    State(state): State<AppState>,
    handle: SessionHandle,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let mut session = handle.session.lock().await;
    match session
        .login(&state.api, &handle.ctx, &form.username, &form.password)
        .await
    {
        Ok(refresh) => Ok(reload_shell(refresh)),
        Err(LoginError::InvalidCredentials(message)) => Ok(Html(LoginTemplate {
            error: message,
            username: form.username,
        })
        .into_response()),
        Err(LoginError::Api(err)) => Err(AppError::Upstream(err)),
    }
}

// -- Signup --

/// GET /signup
pub async fn signup_page() -> Html<SignupTemplate> {
    Html(SignupTemplate {
        errors: Vec::new(),
        username: String::new(),
        email: String::new(),
    })
}

/// POST /signup — validation failures and backend field rejections both come
/// back as one message per field, next to the form.
pub async fn signup(
    State(state): State<AppState>,
    handle: SessionHandle,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let mut session = handle.session.lock().await;
    match session.signup(&state.api, &handle.ctx, &form).await {
        Ok(refresh) => Ok(reload_shell(refresh)),
        Err(SignupError::Invalid(field_errors)) => {
            let errors = field_errors
                .into_iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            Ok(render_signup(errors, form))
        }
        Err(SignupError::Rejected(errors)) => Ok(render_signup(errors, form)),
        Err(SignupError::Api(err)) => Err(AppError::Upstream(err)),
    }
}

fn render_signup(errors: Vec<String>, form: SignupForm) -> Response {
    Html(SignupTemplate {
        errors,
        username: form.username,
        email: form.email,
    })
    .into_response()
}

// -- Logout --

/// POST /logout — server-side termination, atomic local teardown, shell
/// reload. The browsing context's registry entry dies with its session id.
pub async fn logout(State(state): State<AppState>, handle: SessionHandle) -> AppResult<Response> {
    let refresh = {
        let mut session = handle.session.lock().await;
        session.logout(&state.api, &handle.ctx).await?
    };
    if let Some(key) = &handle.key {
        state.sessions.discard(key).await;
    }
    Ok(reload_shell(refresh))
}

// -- Profile --

/// GET /profile — own posts and liked posts.
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ctx: RequestContext,
) -> AppResult<Response> {
    let my_posts = posts::my_posts(&state.api, &ctx).await?;
    let liked_posts = posts::liked_posts(&state.api, &ctx).await?;
    Ok(Html(ProfileTemplate {
        user: Some(user),
        my_posts,
        liked_posts,
    })
    .into_response())
}
