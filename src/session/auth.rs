//! Per-browsing-context auth state.
//!
//! `AuthSession` is the identity cache plus the session-scoped query cache
//! (currently: comment threads). It is owned by the [`SessionRegistry`] and
//! handed to handlers through an extractor, never reached through globals.
//! Logout and login both run [`AuthSession::teardown`] so no server-derived
//! data survives an identity change; the caller then forces a full shell
//! reload by redirecting to `/`.
//!
//! [`SessionRegistry`]: super::SessionRegistry

use std::collections::HashMap;

use crate::api::{self, ApiClient, ApiError, RequestContext};
use crate::comments::CommentThread;
use crate::models::User;
use crate::validate::{FieldError, SignupForm};

/// Identity resolution lifecycle. `Loading` marks a who-am-I call in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Identity {
    #[default]
    Unknown,
    Loading,
    Authenticated(User),
    Anonymous,
}

impl Identity {
    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Identity::Authenticated(_) | Identity::Anonymous)
    }
}

/// Signal that the application shell must fully reload. Carries the
/// `Set-Cookie` headers the backend minted so the handler can relay them.
#[derive(Debug, Default)]
pub struct SessionRefresh {
    pub set_cookies: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Wrong username/password. Prior session state is untouched.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error(transparent)]
    Api(ApiError),
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    /// Failed client-side validation; nothing was submitted.
    #[error("signup form is invalid")]
    Invalid(Vec<FieldError>),

    /// The backend rejected the form; one message per field problem.
    #[error("signup rejected by backend")]
    Rejected(Vec<String>),

    #[error(transparent)]
    Api(ApiError),
}

#[derive(Debug, Default)]
pub struct AuthSession {
    identity: Identity,
    comment_threads: HashMap<i64, CommentThread>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn current_user(&self) -> Option<&User> {
        self.identity.user()
    }

    /// Resolve the identity once per session via the who-am-I endpoint.
    /// Every failure, including the expected 401 for guests, resolves to
    /// `Anonymous`; absence of a session is not an error.
    pub async fn resolve_identity(
        &mut self,
        api: &ApiClient,
        ctx: &RequestContext,
    ) -> &Identity {
        if !self.identity.is_resolved() {
            self.identity = Identity::Loading;
            self.identity = match api::auth::current_user(api, ctx).await {
                Ok(user) => Identity::Authenticated(user),
                Err(err) => {
                    if !matches!(err, ApiError::Unauthorized) {
                        tracing::debug!("identity check failed, treating as guest: {err}");
                    }
                    Identity::Anonymous
                }
            };
        }
        &self.identity
    }

    /// On success the cached identity is replaced, every derived cache is
    /// dropped, and the caller must reload the shell. On failure nothing
    /// changes.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        ctx: &RequestContext,
        username: &str,
        password: &str,
    ) -> Result<SessionRefresh, LoginError> {
        let request = api::auth::LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        match api::auth::login(api, ctx, &request).await {
            Ok((response, set_cookies)) => {
                self.teardown();
                self.identity = Identity::Authenticated(response.user);
                Ok(SessionRefresh { set_cookies })
            }
            Err(ApiError::Unauthorized) => Err(LoginError::InvalidCredentials(
                "Incorrect username or password".to_string(),
            )),
            Err(ApiError::Rejected(body)) => Err(LoginError::InvalidCredentials(
                body.detail
                    .unwrap_or_else(|| "Incorrect username or password".to_string()),
            )),
            Err(err) => Err(LoginError::Api(err)),
        }
    }

    /// Validates client-side before anything leaves the browser's session;
    /// server rejections come back as individual field messages.
    pub async fn signup(
        &mut self,
        api: &ApiClient,
        ctx: &RequestContext,
        form: &SignupForm,
    ) -> Result<SessionRefresh, SignupError> {
        form.validate().map_err(SignupError::Invalid)?;

        let request = api::auth::SignupRequest {
            username: form.username.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
            password2: form.password2.clone(),
        };
        match api::auth::signup(api, ctx, &request).await {
            Ok((response, set_cookies)) => {
                self.teardown();
                self.identity = Identity::Authenticated(response.user);
                Ok(SessionRefresh { set_cookies })
            }
            Err(ApiError::Rejected(body)) => Err(SignupError::Rejected(body.messages())),
            Err(err) => Err(SignupError::Api(err)),
        }
    }

    /// Requests server-side termination, then clears identity and all query
    /// state in one step.
    pub async fn logout(
        &mut self,
        api: &ApiClient,
        ctx: &RequestContext,
    ) -> Result<SessionRefresh, ApiError> {
        let set_cookies = api::auth::logout(api, ctx).await?;
        self.teardown();
        self.identity = Identity::Anonymous;
        Ok(SessionRefresh { set_cookies })
    }

    /// Drop the identity and every cached query at once. Runs under the
    /// session lock, so no handler can observe a half-cleared session.
    pub fn teardown(&mut self) {
        self.identity = Identity::Unknown;
        self.comment_threads.clear();
    }

    // -- Query cache: comment threads --

    pub fn comment_thread(&self, post_id: i64) -> Option<&CommentThread> {
        self.comment_threads.get(&post_id)
    }

    pub fn store_comment_thread(&mut self, post_id: i64, thread: CommentThread) {
        self.comment_threads.insert(post_id, thread);
    }

    /// Rebuild the cached thread for a post with a pure transformation.
    /// Returns false (and caches nothing) when no thread is loaded, which
    /// callers treat as "next page view re-fetches".
    pub fn reconcile_comments(
        &mut self,
        post_id: i64,
        transform: impl FnOnce(&CommentThread) -> CommentThread,
    ) -> bool {
        match self.comment_threads.get(&post_id) {
            Some(thread) => {
                let next = transform(thread);
                debug_assert!(next.counts_consistent());
                self.comment_threads.insert(post_id, next);
                true
            }
            None => false,
        }
    }
}
