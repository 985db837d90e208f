//! Auth endpoints: who-am-I, login, signup, logout.

use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiResult, RequestContext};
use crate::models::User;

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupResponse {
    pub user: User,
    #[serde(default)]
    pub detail: Option<String>,
}

/// `GET /auth/user/`. A 401 here just means "guest", which callers map to
/// an anonymous identity rather than an error.
pub async fn current_user(api: &ApiClient, ctx: &RequestContext) -> ApiResult<User> {
    api.get_json("/auth/user/", ctx).await
}

/// Login mints a fresh backend session; the returned `Set-Cookie` headers
/// must be relayed to the browser for the identity change to stick.
pub async fn login(
    api: &ApiClient,
    ctx: &RequestContext,
    request: &LoginRequest,
) -> ApiResult<(LoginResponse, Vec<String>)> {
    api.post_json_capturing_cookies("/auth/login/", request, ctx)
        .await
}

pub async fn signup(
    api: &ApiClient,
    ctx: &RequestContext,
    request: &SignupRequest,
) -> ApiResult<(SignupResponse, Vec<String>)> {
    api.post_json_capturing_cookies("/auth/signup/", request, ctx)
        .await
}

pub async fn logout(api: &ApiClient, ctx: &RequestContext) -> ApiResult<Vec<String>> {
    api.post_empty_capturing_cookies("/auth/logout/", ctx).await
}
