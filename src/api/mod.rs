//! Thin wrapper around the backend REST API.
//!
//! One `ApiClient` (and its connection pool) lives in app state; each request
//! handler supplies a [`RequestContext`] carrying the browser's cookies so the
//! backend sees the user's own session. Two things happen on every call, the
//! same way the rest of the app never has to think about:
//!
//! - the CSRF token is read from the `csrftoken` cookie and attached as an
//!   `X-CSRFToken` header when present;
//! - a 401 response becomes [`ApiError::Unauthorized`], which the page layer
//!   turns into a redirect to `/login`.
//!
//! There are no automatic retries and no timeouts beyond transport defaults.

pub mod auth;
pub mod comments;
pub mod posts;
pub mod tags;

use reqwest::header::{COOKIE, CONTENT_TYPE, SET_COOKIE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Per-request browser context forwarded to the backend.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The raw `Cookie` header of the incoming request, if any.
    pub cookies: Option<String>,
    /// Value of the `csrftoken` cookie, extracted once up front.
    pub csrf_token: Option<String>,
}

impl RequestContext {
    pub fn from_cookie_header(header: Option<&str>) -> Self {
        let cookies = header.map(|h| h.to_string());
        let csrf_token = header.and_then(|h| cookie_value(h, CSRF_COOKIE).map(|v| v.to_string()));
        Self {
            cookies,
            csrf_token,
        }
    }
}

/// Pull a single cookie value out of a raw `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}

/// Field-keyed rejection payload the backend sends for invalid form input,
/// plus the free-form `detail` used by auth endpoints.
#[derive(Debug, Clone, Default)]
pub struct ErrorBody {
    pub detail: Option<String>,
    pub fields: Vec<(String, Vec<String>)>,
}

impl ErrorBody {
    fn parse(value: serde_json::Value) -> Self {
        let mut body = ErrorBody::default();
        let serde_json::Value::Object(map) = value else {
            return body;
        };
        for (key, val) in map {
            if key == "detail" {
                if let serde_json::Value::String(s) = val {
                    body.detail = Some(s);
                }
                continue;
            }
            let messages = match val {
                serde_json::Value::String(s) => vec![s],
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect(),
                other => vec![other.to_string()],
            };
            body.fields.push((key, messages));
        }
        body
    }

    /// One line per problem, `field: message`, for transient notifications.
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(detail) = &self.detail {
            out.push(detail.clone());
        }
        for (field, messages) in &self.fields {
            for message in messages {
                out.push(format!("{field}: {message}"));
            }
        }
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Request rejected by backend")]
    Rejected(ErrorBody),

    #[error("Backend returned status {0}")]
    Status(StatusCode),

    #[error("Backend request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Backend response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Backend payload had an unexpected shape: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// `base_url` is the backend API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        // Validate early so a typo fails at startup, not on first click.
        Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a request for an API path (leading slash, e.g. `/posts/`) with
    /// the browser's cookies and CSRF token attached.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        ctx: &RequestContext,
    ) -> reqwest::RequestBuilder {
        let mut rb = self.http.request(method, format!("{}{}", self.base, path));
        if let Some(cookies) = &ctx.cookies {
            rb = rb.header(COOKIE, cookies);
        }
        if let Some(token) = &ctx.csrf_token {
            rb = rb.header(CSRF_HEADER, token);
        }
        rb
    }

    async fn execute(&self, rb: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = rb.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            s if s.is_client_error() => {
                let body = response
                    .json::<serde_json::Value>()
                    .await
                    .map(ErrorBody::parse)
                    .unwrap_or_default();
                Err(ApiError::Rejected(body))
            }
            s => Err(ApiError::Status(s)),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        ctx: &RequestContext,
    ) -> ApiResult<T> {
        let response = self.execute(self.request(Method::GET, path, ctx)).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn get_query_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        ctx: &RequestContext,
    ) -> ApiResult<T> {
        let rb = self.request(Method::GET, path, ctx).query(query);
        let response = self.execute(rb).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        ctx: &RequestContext,
    ) -> ApiResult<T> {
        let rb = self
            .request(Method::POST, path, ctx)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let response = self.execute(rb).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        ctx: &RequestContext,
    ) -> ApiResult<T> {
        let rb = self
            .request(Method::PUT, path, ctx)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let response = self.execute(rb).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn patch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        ctx: &RequestContext,
    ) -> ApiResult<T> {
        let rb = self
            .request(Method::PATCH, path, ctx)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let response = self.execute(rb).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// POST where the response body is irrelevant (likes, logout).
    pub async fn post_empty(&self, path: &str, ctx: &RequestContext) -> ApiResult<()> {
        self.execute(self.request(Method::POST, path, ctx)).await?;
        Ok(())
    }

    /// POST that also returns the backend's `Set-Cookie` headers, so session
    /// cookies minted by auth endpoints can be relayed to the browser.
    pub async fn post_json_capturing_cookies<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        ctx: &RequestContext,
    ) -> ApiResult<(T, Vec<String>)> {
        let rb = self
            .request(Method::POST, path, ctx)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let response = self.execute(rb).await?;
        let cookies = set_cookie_headers(&response);
        let parsed = response.json().await.map_err(ApiError::Decode)?;
        Ok((parsed, cookies))
    }

    /// Bodyless variant of [`Self::post_json_capturing_cookies`] for logout.
    pub async fn post_empty_capturing_cookies(
        &self,
        path: &str,
        ctx: &RequestContext,
    ) -> ApiResult<Vec<String>> {
        let response = self.execute(self.request(Method::POST, path, ctx)).await?;
        Ok(set_cookie_headers(&response))
    }

    pub async fn delete(&self, path: &str, ctx: &RequestContext) -> ApiResult<()> {
        self.execute(self.request(Method::DELETE, path, ctx))
            .await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        ctx: &RequestContext,
    ) -> ApiResult<T> {
        let rb = self.request(Method::POST, path, ctx).multipart(form);
        let response = self.execute(rb).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn patch_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        ctx: &RequestContext,
    ) -> ApiResult<T> {
        let rb = self.request(Method::PATCH, path, ctx).multipart(form);
        let response = self.execute(rb).await?;
        response.json().await.map_err(ApiError::Decode)
    }
}

fn set_cookie_headers(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .collect()
}
