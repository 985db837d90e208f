//! Tag endpoints. The backend serves tags unpaginated.

use super::{ApiClient, ApiResult, RequestContext};
use crate::models::Tag;

pub async fn list(
    api: &ApiClient,
    ctx: &RequestContext,
    search: Option<&str>,
) -> ApiResult<Vec<Tag>> {
    match search.filter(|s| !s.is_empty()) {
        Some(search) => {
            api.get_query_json("/tags/", &[("search", search.to_string())], ctx)
                .await
        }
        None => api.get_json("/tags/", ctx).await,
    }
}

pub async fn create(api: &ApiClient, ctx: &RequestContext, name: &str) -> ApiResult<Tag> {
    api.post_json("/tags/", &serde_json::json!({ "name": name }), ctx)
        .await
}

pub async fn delete(api: &ApiClient, ctx: &RequestContext, id: i64) -> ApiResult<()> {
    api.delete(&format!("/tags/{id}/"), ctx).await
}
