//! Comment endpoints. The list endpoint has shipped both paginated and bare
//! responses across backend revisions, so the fetch accepts either shape.

use serde::Serialize;

use super::{ApiClient, ApiResult, RequestContext};
use crate::models::{Comment, CommentCount, Paginated};

#[derive(Debug, Serialize)]
pub struct CommentBody {
    pub content: String,
}

pub async fn list(api: &ApiClient, ctx: &RequestContext, post_id: i64) -> ApiResult<Vec<Comment>> {
    let value: serde_json::Value = api
        .get_json(&format!("/posts/{post_id}/comments/"), ctx)
        .await?;
    if value.get("results").is_some() {
        let page: Paginated<Comment> = serde_json::from_value(value)?;
        Ok(page.results)
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

pub async fn count(api: &ApiClient, ctx: &RequestContext, post_id: i64) -> ApiResult<CommentCount> {
    api.get_json(&format!("/posts/{post_id}/comments/count/"), ctx)
        .await
}

pub async fn create(
    api: &ApiClient,
    ctx: &RequestContext,
    post_id: i64,
    content: &str,
) -> ApiResult<Comment> {
    api.post_json(
        &format!("/posts/{post_id}/comments/"),
        &CommentBody {
            content: content.to_string(),
        },
        ctx,
    )
    .await
}

pub async fn reply(
    api: &ApiClient,
    ctx: &RequestContext,
    comment_id: i64,
    content: &str,
) -> ApiResult<Comment> {
    api.post_json(
        &format!("/comments/{comment_id}/reply/"),
        &CommentBody {
            content: content.to_string(),
        },
        ctx,
    )
    .await
}

pub async fn update(
    api: &ApiClient,
    ctx: &RequestContext,
    comment_id: i64,
    content: &str,
) -> ApiResult<Comment> {
    api.put_json(
        &format!("/comments/{comment_id}/"),
        &CommentBody {
            content: content.to_string(),
        },
        ctx,
    )
    .await
}

pub async fn delete(api: &ApiClient, ctx: &RequestContext, comment_id: i64) -> ApiResult<()> {
    api.delete(&format!("/comments/{comment_id}/"), ctx).await
}