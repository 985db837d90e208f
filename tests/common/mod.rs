//! Shared harness for integration tests: a stub of the company REST backend
//! served on an ephemeral port, plus a frontend router wired against it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use recirc::config::Config;
use recirc::routes;
use recirc::state::AppState;

pub const GATE_COOKIE: &str = "company-auth=authenticated";
pub const ALICE_SESSION: &str = "sessionid=alice-session";

#[derive(Clone, Default)]
pub struct StubState {
    /// Calls to the comment list endpoint for post 1; replies 500 after the
    /// first so tests can prove the frontend reconciles locally.
    pub comment_list_calls: Arc<AtomicUsize>,
    /// Last X-CSRFToken header seen on a login request.
    pub last_csrf: Arc<Mutex<Option<String>>>,
}

pub struct StubBackend {
    pub base_url: String,
    pub state: StubState,
}

fn has_alice_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|h| h.contains(ALICE_SESSION))
}

fn alice() -> Value {
    json!({"id": 7, "username": "alice", "email": "alice@example.com"})
}

fn tag(id: i64, name: &str) -> Value {
    json!({"id": id, "name": name, "created_at": "2025-01-01T00:00:00Z"})
}

fn post_json(id: i64, title: &str, sold_out: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{title} in good condition"),
        "image": null,
        "author": alice(),
        "tags": [tag(1, "furniture")],
        "likes_count": 2,
        "is_liked": false,
        "is_published": true,
        "is_sold_out": sold_out,
        "created_at": "2025-05-01T09:00:00Z",
        "updated_at": "2025-05-01T09:00:00Z"
    })
}

fn all_posts() -> Vec<Value> {
    vec![
        post_json(1, "Standing desk", false),
        post_json(2, "Label printer", true),
        post_json(3, "Monitor arm", false),
        post_json(4, "Office chair", true),
    ]
}

fn comment_json(id: i64, content: &str, parent: Option<i64>, replies: Vec<Value>) -> Value {
    let reply_count = replies.len() as i64;
    json!({
        "id": id,
        "content": content,
        "author": {"id": 8, "username": "bob", "first_name": "", "last_name": ""},
        "parent": parent,
        "replies": replies,
        "reply_count": reply_count,
        "is_reply": parent.is_some(),
        "created_at": "2025-05-02T10:00:00Z",
        "updated_at": "2025-05-02T10:00:00Z"
    })
}

async fn current_user(headers: HeaderMap) -> Response {
    if has_alice_session(&headers) {
        Json(alice()).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        )
            .into_response()
    }
}

async fn login(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    *state.last_csrf.lock().unwrap() = headers
        .get("X-CSRFToken")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    if body["username"] == "alice" && body["password"] == "password123" {
        (
            StatusCode::OK,
            [(
                header::SET_COOKIE,
                format!("{ALICE_SESSION}; Path=/; HttpOnly"),
            )],
            Json(json!({"detail": "Logged in", "user": alice()})),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid username or password"})),
        )
            .into_response()
    }
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"username": ["This username is already in use"]})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        [(
            header::SET_COOKIE,
            format!("{ALICE_SESSION}; Path=/; HttpOnly"),
        )],
        Json(json!({
            "detail": "Account created",
            "user": {"id": 9, "username": body["username"], "email": body["email"]}
        })),
    )
        .into_response()
}

async fn logout() -> Response {
    (
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            "sessionid=; Path=/; Max-Age=0".to_string(),
        )],
        Json(json!({"detail": "Logged out"})),
    )
        .into_response()
}

#[derive(serde::Deserialize, Default)]
struct ListParams {
    search: Option<String>,
}

async fn list_posts(axum::extract::Query(params): axum::extract::Query<ListParams>) -> Response {
    let search = params.search.unwrap_or_default().to_lowercase();
    let results: Vec<Value> = all_posts()
        .into_iter()
        .filter(|p| {
            search.is_empty()
                || p["title"]
                    .as_str()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&search)
        })
        .collect();
    Json(json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results
    }))
    .into_response()
}

async fn get_post(Path(id): Path<i64>) -> Response {
    match all_posts().into_iter().find(|p| p["id"] == id) {
        Some(post) => Json(post).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Not found."})),
        )
            .into_response(),
    }
}

async fn list_comments(State(state): State<StubState>, Path(id): Path<i64>) -> Response {
    // Post 4's comments never load; post 1's load exactly once.
    if id == 4 {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if id == 1 && state.comment_list_calls.fetch_add(1, Ordering::SeqCst) > 0 {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let replies = vec![comment_json(101, "Yes, come pick it up", Some(100), vec![])];
    Json(json!([comment_json(
        100,
        "Is this still available?",
        None,
        replies
    )]))
    .into_response()
}

async fn comment_count() -> Response {
    Json(json!({"count": 2})).into_response()
}

async fn create_comment(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_alice_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut comment = comment_json(200, body["content"].as_str().unwrap_or(""), None, vec![]);
    comment["author"] = alice();
    (StatusCode::CREATED, Json(comment)).into_response()
}

async fn create_reply(headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if !has_alice_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut reply = comment_json(201, body["content"].as_str().unwrap_or(""), Some(id), vec![]);
    reply["author"] = alice();
    (StatusCode::CREATED, Json(reply)).into_response()
}

async fn update_comment(Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    let parent = if id > 100 && id < 200 { Some(100) } else { None };
    Json(comment_json(
        id,
        body["content"].as_str().unwrap_or(""),
        parent,
        vec![],
    ))
    .into_response()
}

async fn delete_comment() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn like_post(headers: HeaderMap) -> Response {
    if !has_alice_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    (StatusCode::CREATED, Json(json!({"detail": "Liked"}))).into_response()
}

async fn unlike_post(headers: HeaderMap) -> Response {
    if !has_alice_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn my_posts(headers: HeaderMap) -> Response {
    if !has_alice_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([post_json(1, "Standing desk", false)])).into_response()
}

async fn liked_posts(headers: HeaderMap) -> Response {
    if !has_alice_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([post_json(3, "Monitor arm", false)])).into_response()
}

async fn list_tags() -> Response {
    Json(json!([tag(1, "furniture"), tag(2, "electronics")])).into_response()
}

async fn create_tag(Json(body): Json<Value>) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({"id": 3, "name": body["name"], "created_at": "2025-01-01T00:00:00Z"})),
    )
        .into_response()
}

async fn delete_tag() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn stub_router(state: StubState) -> Router {
    let api = Router::new()
        .route("/auth/user/", get(current_user))
        .route("/auth/login/", post(login))
        .route("/auth/signup/", post(signup))
        .route("/auth/logout/", post(logout))
        .route("/posts/", get(list_posts))
        .route("/posts/my_posts/", get(my_posts))
        .route("/posts/liked_posts/", get(liked_posts))
        .route("/posts/{id}/", get(get_post))
        .route("/posts/{id}/like/", post(like_post).delete(unlike_post))
        .route(
            "/posts/{id}/comments/",
            get(list_comments).post(create_comment),
        )
        .route("/posts/{id}/comments/count/", get(comment_count))
        .route("/comments/{id}/reply/", post(create_reply))
        .route(
            "/comments/{id}/",
            axum::routing::put(update_comment).delete(delete_comment),
        )
        .route("/tags/", get(list_tags).post(create_tag))
        .route("/tags/{id}/", axum::routing::delete(delete_tag))
        .with_state(state);
    Router::new().nest("/api", api)
}

/// Serve the stub backend on an ephemeral port and return its API base URL.
pub async fn spawn_stub_backend() -> StubBackend {
    let state = StubState::default();
    let router = stub_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub backend addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve stub");
    });
    StubBackend {
        base_url: format!("http://{addr}/api"),
        state,
    }
}

/// The frontend router under test, pointed at the given backend.
pub fn frontend(api_base: &str) -> Router {
    let mut config = Config::default();
    config.api.base_url = api_base.to_string();
    let state = AppState::new(config).expect("frontend state");
    routes::router(state)
}

/// A frontend whose backend does not exist; fine for gate-only tests.
pub fn frontend_without_backend() -> Router {
    frontend("http://127.0.0.1:9/api")
}
