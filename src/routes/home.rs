use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::api::{posts, tags, RequestContext};
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::models::{Post, Tag, User};
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub user: Option<User>,
    pub posts: Vec<Post>,
    pub tags: Vec<Tag>,
    pub search: String,
    pub selected_tag: String,
    pub ordering: String,
    pub hide_sold_out: bool,
    pub page: u32,
    pub has_prev: bool,
    pub has_next: bool,
    pub total_count: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct HomeQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    /// Checkbox: any present value counts as on.
    pub hide_sold_out: Option<String>,
}

/// GET / — the board: published posts with search, tag filter, ordering and
/// pagination. The sold-out filter is applied here, after the fetch, so the
/// backend contract stays untouched.
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    ctx: RequestContext,
    Query(query): Query<HomeQuery>,
) -> AppResult<Response> {
    let page = query.page.unwrap_or(1).max(1);
    let list_query = posts::PostListQuery {
        page: Some(page),
        search: query.search.clone(),
        tag: query.tag.clone(),
        ordering: query.ordering.clone(),
    };

    let listing = posts::list(&state.api, &ctx, &list_query).await?;
    let all_tags = tags::list(&state.api, &ctx, None).await.unwrap_or_default();

    let hide_sold_out = query.hide_sold_out.is_some();
    let template = HomeTemplate {
        user,
        total_count: listing.count,
        has_prev: listing.previous.is_some(),
        has_next: listing.next.is_some(),
        posts: posts::hide_sold_out(listing.results, hide_sold_out),
        tags: all_tags,
        search: query.search.unwrap_or_default(),
        selected_tag: query.tag.unwrap_or_default(),
        ordering: query.ordering.unwrap_or_else(|| "-created_at".to_string()),
        hide_sold_out,
        page,
    };

    Ok(Html(template).into_response())
}
