use serde::{Deserialize, Serialize};

/// A blog post with the ordered ids of its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub extract: String,
    pub author_name: String,
    pub author_email: String,
    pub comments: Vec<String>,
}

/// A post as stored in the `posts` table, without its comment references.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PostRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub extract: String,
    pub author_name: String,
    pub author_email: String,
}

impl PostRow {
    pub(crate) fn with_comments(self, comments: Vec<String>) -> Post {
        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            extract: self.extract,
            author_name: self.author_name,
            author_email: self.author_email,
            comments,
        }
    }
}

/// A reader comment. Owned by at most one post through `post_comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
}

/// Data for inserting a new post. Every field has already been validated.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub extract: String,
    pub author_name: String,
    pub author_email: String,
}

/// Data for inserting a new comment. Every field has already been validated.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_name: String,
    pub author_email: String,
    pub content: String,
}

/// Fields of a post that can be changed after creation.
///
/// `extract` is fixed at creation; an `extract` key in the request body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

/// Fields of a comment that can be changed after creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentUpdate {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub content: Option<String>,
}

/// Result of removing a comment from a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentRemoval {
    Removed,
    PostNotFound,
    CommentNotFound,
}
