//! Post endpoints: listing with filters, CRUD, likes, per-user collections.

use reqwest::multipart::{Form, Part};

use super::{ApiClient, ApiResult, RequestContext};
use crate::models::{Paginated, Post, PostInput};

/// Query parameters accepted by the post list endpoint.
#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub ordering: Option<String>,
}

impl PostListQuery {
    fn as_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            params.push(("search", search.clone()));
        }
        if let Some(tag) = self.tag.as_ref().filter(|t| !t.is_empty()) {
            params.push(("tag", tag.clone()));
        }
        if let Some(ordering) = self.ordering.as_ref().filter(|o| !o.is_empty()) {
            params.push(("ordering", ordering.clone()));
        }
        params
    }
}

/// An uploaded image travelling from the browser form to the backend.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn post_form(input: &PostInput, image: Option<ImageUpload>) -> Form {
    let mut form = Form::new()
        .text("title", input.title.clone())
        .text("description", input.description.clone())
        .text("is_published", input.is_published.to_string());
    for tag_id in &input.tag_ids {
        form = form.text("tag_ids", tag_id.to_string());
    }
    if let Some(image) = image {
        // A malformed content type falls back to the bare part; the backend
        // sniffs the file anyway.
        let part = match Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
        {
            Ok(part) => part,
            Err(_) => Part::bytes(image.bytes).file_name(image.file_name),
        };
        form = form.part("image", part);
    }
    form
}

pub async fn list(
    api: &ApiClient,
    ctx: &RequestContext,
    query: &PostListQuery,
) -> ApiResult<Paginated<Post>> {
    api.get_query_json("/posts/", &query.as_params(), ctx).await
}

pub async fn get(api: &ApiClient, ctx: &RequestContext, id: i64) -> ApiResult<Post> {
    api.get_json(&format!("/posts/{id}/"), ctx).await
}

pub async fn create(
    api: &ApiClient,
    ctx: &RequestContext,
    input: &PostInput,
    image: Option<ImageUpload>,
) -> ApiResult<Post> {
    api.post_multipart("/posts/", post_form(input, image), ctx)
        .await
}

pub async fn update(
    api: &ApiClient,
    ctx: &RequestContext,
    id: i64,
    input: &PostInput,
    image: Option<ImageUpload>,
) -> ApiResult<Post> {
    api.patch_multipart(&format!("/posts/{id}/"), post_form(input, image), ctx)
        .await
}

pub async fn delete(api: &ApiClient, ctx: &RequestContext, id: i64) -> ApiResult<()> {
    api.delete(&format!("/posts/{id}/"), ctx).await
}

pub async fn set_published(
    api: &ApiClient,
    ctx: &RequestContext,
    id: i64,
    is_published: bool,
) -> ApiResult<Post> {
    api.patch_json(
        &format!("/posts/{id}/"),
        &serde_json::json!({ "is_published": is_published }),
        ctx,
    )
    .await
}

pub async fn like(api: &ApiClient, ctx: &RequestContext, id: i64) -> ApiResult<()> {
    api.post_empty(&format!("/posts/{id}/like/"), ctx).await
}

pub async fn unlike(api: &ApiClient, ctx: &RequestContext, id: i64) -> ApiResult<()> {
    api.delete(&format!("/posts/{id}/like/"), ctx).await
}

pub async fn my_posts(api: &ApiClient, ctx: &RequestContext) -> ApiResult<Vec<Post>> {
    api.get_json("/posts/my_posts/", ctx).await
}

pub async fn liked_posts(api: &ApiClient, ctx: &RequestContext) -> ApiResult<Vec<Post>> {
    api.get_json("/posts/liked_posts/", ctx).await
}

/// Drop sold-out posts when the user has the hide filter on, keeping the
/// relative order of everything else.
pub fn hide_sold_out(posts: Vec<Post>, hide: bool) -> Vec<Post> {
    if !hide {
        return posts;
    }
    posts.into_iter().filter(|post| !post.is_sold_out).collect()
}
