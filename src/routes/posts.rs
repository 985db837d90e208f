use askama::Template;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::api::{comments, posts, tags, ApiError, RequestContext};
use crate::api::posts::ImageUpload;
use crate::comments::CommentThread;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, SessionHandle};
use crate::models::{Comment, Post, PostInput, Tag, User};
use crate::routes::home::Html;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/new", get(new_post_page).post(create_post))
        .route("/posts/{id}", get(detail))
        .route("/posts/{id}/edit", get(edit_post_page).post(update_post))
        .route("/posts/{id}/delete", post(delete_post))
        .route("/posts/{id}/publish", post(set_published))
        .route("/posts/{id}/like", post(like))
        .route("/posts/{id}/unlike", post(unlike))
        .route("/posts/{id}/comments", post(add_comment))
        .route("/comments/{id}/reply", post(add_reply))
        .route("/comments/{id}/update", post(update_comment))
        .route("/comments/{id}/delete", post(delete_comment))
        .route("/tags/create", post(create_tag))
        .route("/tags/{id}/delete", post(delete_tag))
}

// -- Templates --

#[derive(Template)]
#[template(path = "pages/post_detail.html")]
pub struct PostDetailTemplate {
    pub user: Option<User>,
    pub post: Post,
    pub comments: Vec<Comment>,
    pub comment_count: i64,
    pub comments_failed: bool,
    pub is_owner: bool,
}

#[derive(Template)]
#[template(path = "pages/post_form.html")]
pub struct PostFormTemplate {
    pub user: Option<User>,
    pub post: Option<Post>,
    pub tags: Vec<Tag>,
    pub action: String,
    pub error: String,
}

// -- Helpers --

fn see_other(location: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string())],
        "",
    )
        .into_response()
}

/// Only same-site paths may be used as a post-action destination.
fn safe_next(next: Option<String>, fallback: String) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => fallback,
    }
}

fn bad_upload(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::debug!("rejected multipart body: {err}");
    AppError::BadRequest("Invalid form upload".to_string())
}

async fn parse_post_form(mut multipart: Multipart) -> AppResult<(PostInput, Option<ImageUpload>)> {
    let mut input = PostInput::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => input.title = field.text().await.map_err(bad_upload)?,
            "description" => input.description = field.text().await.map_err(bad_upload)?,
            "tag_ids" => {
                let text = field.text().await.map_err(bad_upload)?;
                if let Ok(id) = text.trim().parse() {
                    input.tag_ids.push(id);
                }
            }
            "is_published" => {
                let text = field.text().await.map_err(bad_upload)?;
                input.is_published = matches!(text.as_str(), "on" | "true" | "1");
            }
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await.map_err(bad_upload)?;
                // Browsers send an empty part when no file was chosen.
                if let Some(file_name) = file_name.filter(|_| !bytes.is_empty()) {
                    image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    Ok((input, image))
}

// -- Post pages --

/// GET /posts/{id} — item page with its comment thread. The thread is
/// fetched once per browsing context and then kept in sync locally by the
/// comment actions below; a load failure renders the page with a retry link
/// instead of failing the whole view.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    handle: SessionHandle,
) -> AppResult<Response> {
    let post = posts::get(&state.api, &handle.ctx, id).await?;

    let mut session = handle.session.lock().await;
    let user = session
        .resolve_identity(&state.api, &handle.ctx)
        .await
        .user()
        .cloned();

    let mut comments_failed = false;
    if session.comment_thread(id).is_none() {
        match comments::list(&state.api, &handle.ctx, id).await {
            Ok(list) => session.store_comment_thread(id, CommentThread::new(list)),
            Err(err) => {
                tracing::warn!("comment load for post {id} failed: {err}");
                comments_failed = true;
            }
        }
    }
    let (comments, comment_count) = match session.comment_thread(id) {
        Some(thread) => (thread.comments().to_vec(), thread.total_count()),
        // The count endpoint is cheaper and may still answer when the list
        // did not; worst case the header shows zero.
        None => match comments::count(&state.api, &handle.ctx, id).await {
            Ok(count) => (Vec::new(), count.count),
            Err(_) => (Vec::new(), 0),
        },
    };
    drop(session);

    let is_owner = user.as_ref().is_some_and(|u| u.id == post.author.id);
    Ok(Html(PostDetailTemplate {
        user,
        post,
        comments,
        comment_count,
        comments_failed,
        is_owner,
    })
    .into_response())
}

/// GET /posts/new
pub async fn new_post_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ctx: RequestContext,
) -> AppResult<Response> {
    let tags = tags::list(&state.api, &ctx, None).await.unwrap_or_default();
    Ok(Html(PostFormTemplate {
        user: Some(user),
        post: None,
        tags,
        action: "/posts/new".to_string(),
        error: String::new(),
    })
    .into_response())
}

/// POST /posts/new — multipart create; backend rejections re-render the form
/// with the field messages instead of bouncing to an error page.
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ctx: RequestContext,
    multipart: Multipart,
) -> AppResult<Response> {
    let (input, image) = parse_post_form(multipart).await?;
    match posts::create(&state.api, &ctx, &input, image).await {
        Ok(post) => Ok(see_other(&format!("/posts/{}", post.id))),
        Err(ApiError::Rejected(body)) => {
            let tags = tags::list(&state.api, &ctx, None).await.unwrap_or_default();
            Ok(Html(PostFormTemplate {
                user: Some(user),
                post: None,
                tags,
                action: "/posts/new".to_string(),
                error: body.messages().join("; "),
            })
            .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /posts/{id}/edit — only the author gets the form; everyone else is
/// sent back to the item page.
pub async fn edit_post_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
    ctx: RequestContext,
) -> AppResult<Response> {
    let post = posts::get(&state.api, &ctx, id).await?;
    if post.author.id != user.id {
        return Ok(see_other(&format!("/posts/{id}")));
    }
    let tags = tags::list(&state.api, &ctx, None).await.unwrap_or_default();
    Ok(Html(PostFormTemplate {
        user: Some(user),
        post: Some(post),
        tags,
        action: format!("/posts/{id}/edit"),
        error: String::new(),
    })
    .into_response())
}

/// POST /posts/{id}/edit
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
    ctx: RequestContext,
    multipart: Multipart,
) -> AppResult<Response> {
    let (input, image) = parse_post_form(multipart).await?;
    match posts::update(&state.api, &ctx, id, &input, image).await {
        Ok(post) => Ok(see_other(&format!("/posts/{}", post.id))),
        Err(ApiError::Rejected(body)) => {
            let post = posts::get(&state.api, &ctx, id).await.ok();
            let tags = tags::list(&state.api, &ctx, None).await.unwrap_or_default();
            Ok(Html(PostFormTemplate {
                user: Some(user),
                post,
                tags,
                action: format!("/posts/{id}/edit"),
                error: body.messages().join("; "),
            })
            .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// POST /posts/{id}/delete
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
    ctx: RequestContext,
) -> AppResult<Response> {
    posts::delete(&state.api, &ctx, id).await?;
    Ok(see_other("/"))
}

#[derive(Deserialize)]
pub struct PublishForm {
    pub is_published: String,
}

/// POST /posts/{id}/publish — draft/publish toggle.
pub async fn set_published(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
    ctx: RequestContext,
    Form(form): Form<PublishForm>,
) -> AppResult<Response> {
    let publish = matches!(form.is_published.as_str(), "on" | "true" | "1");
    posts::set_published(&state.api, &ctx, id, publish).await?;
    Ok(see_other(&format!("/posts/{id}")))
}

#[derive(Deserialize)]
pub struct NextForm {
    pub next: Option<String>,
}

/// POST /posts/{id}/like
pub async fn like(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
    ctx: RequestContext,
    Form(form): Form<NextForm>,
) -> AppResult<Response> {
    posts::like(&state.api, &ctx, id).await?;
    Ok(see_other(&safe_next(form.next, format!("/posts/{id}"))))
}

/// POST /posts/{id}/unlike
pub async fn unlike(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
    ctx: RequestContext,
    Form(form): Form<NextForm>,
) -> AppResult<Response> {
    posts::unlike(&state.api, &ctx, id).await?;
    Ok(see_other(&safe_next(form.next, format!("/posts/{id}"))))
}

// -- Comment actions --
//
// Each one calls the backend first and only reconciles the cached thread
// when the call succeeded, so a failure leaves local state exactly as it
// was. The reconciliation itself is a pure rebuild in `CommentThread`.

#[derive(Deserialize)]
pub struct CommentForm {
    pub content: String,
}

/// POST /posts/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    handle: SessionHandle,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    require_user(&state, &handle).await?;
    let created = comments::create(&state.api, &handle.ctx, id, form.content.trim()).await?;

    let mut session = handle.session.lock().await;
    session.reconcile_comments(id, |thread| thread.add_comment(created.clone()));
    Ok(see_other(&format!("/posts/{id}")))
}

#[derive(Deserialize)]
pub struct ReplyForm {
    pub content: String,
    pub post_id: i64,
}

/// POST /comments/{id}/reply
pub async fn add_reply(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    handle: SessionHandle,
    Form(form): Form<ReplyForm>,
) -> AppResult<Response> {
    require_user(&state, &handle).await?;
    let reply = comments::reply(&state.api, &handle.ctx, id, form.content.trim()).await?;

    let mut session = handle.session.lock().await;
    session.reconcile_comments(form.post_id, |thread| thread.add_reply(id, reply.clone()));
    Ok(see_other(&format!("/posts/{}", form.post_id)))
}

#[derive(Deserialize)]
pub struct CommentEditForm {
    pub content: String,
    pub post_id: i64,
}

/// POST /comments/{id}/update
pub async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    handle: SessionHandle,
    Form(form): Form<CommentEditForm>,
) -> AppResult<Response> {
    require_user(&state, &handle).await?;
    let updated = comments::update(&state.api, &handle.ctx, id, form.content.trim()).await?;

    let mut session = handle.session.lock().await;
    session.reconcile_comments(form.post_id, |thread| thread.update_comment(updated.clone()));
    Ok(see_other(&format!("/posts/{}", form.post_id)))
}

#[derive(Deserialize)]
pub struct CommentDeleteForm {
    pub post_id: i64,
}

/// POST /comments/{id}/delete
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    handle: SessionHandle,
    Form(form): Form<CommentDeleteForm>,
) -> AppResult<Response> {
    require_user(&state, &handle).await?;
    comments::delete(&state.api, &handle.ctx, id).await?;

    let mut session = handle.session.lock().await;
    session.reconcile_comments(form.post_id, |thread| thread.delete_comment(id));
    Ok(see_other(&format!("/posts/{}", form.post_id)))
}

async fn require_user(state: &AppState, handle: &SessionHandle) -> AppResult<()> {
    let mut session = handle.session.lock().await;
    session
        .resolve_identity(&state.api, &handle.ctx)
        .await
        .user()
        .map(|_| ())
        .ok_or(AppError::Unauthorized)
}

// -- Tags --

#[derive(Deserialize)]
pub struct TagCreateForm {
    pub name: String,
    pub next: Option<String>,
}

/// POST /tags/create — inline tag creation from the post form.
pub async fn create_tag(
    State(state): State<AppState>,
    _user: CurrentUser,
    ctx: RequestContext,
    Form(form): Form<TagCreateForm>,
) -> AppResult<Response> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Tag name is required".to_string()));
    }
    tags::create(&state.api, &ctx, name).await?;
    Ok(see_other(&safe_next(form.next, "/posts/new".to_string())))
}

/// POST /tags/{id}/delete
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
    ctx: RequestContext,
    Form(form): Form<NextForm>,
) -> AppResult<Response> {
    tags::delete(&state.api, &ctx, id).await?;
    Ok(see_other(&safe_next(form.next, "/".to_string())))
}
