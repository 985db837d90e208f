use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub author: User,
    pub tags: Vec<Tag>,
    pub likes_count: i64,
    pub is_liked: bool,
    pub is_published: bool,
    // The backend omits this on older revisions; treat missing as available.
    #[serde(default)]
    pub is_sold_out: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields submitted when creating or editing a post. The image travels as a
/// multipart file part next to these.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub title: String,
    pub description: String,
    pub tag_ids: Vec<i64>,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// A comment as served by the backend. Top-level comments carry their replies
/// inline; replies have `parent` set and an empty `replies` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub author: CommentAuthor,
    pub parent: Option<i64>,
    #[serde(default)]
    pub replies: Vec<Comment>,
    #[serde(default)]
    pub reply_count: i64,
    #[serde(default)]
    pub is_reply: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentCount {
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}
