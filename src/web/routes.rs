use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use super::comments;
use super::error::{require_id, update_body, ApiError, POST_NOT_FOUND};
use super::AppState;
use crate::db::{self, Post, PostUpdate};
use crate::validation::{validate_new_post, PostInput};

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route(
            "/posts/:id/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/posts/:id/comments/:comment_id",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/healthz", get(health))
}

/// Body returned after deleting a post.
#[derive(Debug, Serialize)]
pub struct DeletedPost {
    pub message: &'static str,
    pub post: Post,
}

async fn health() -> &'static str {
    "OK"
}

// ========== Posts ==========

async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = db::list_posts(state.db.pool()).await?;
    Ok(Json(posts))
}

async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let Json(input) = payload?;
    let new_post = validate_new_post(&input)?;

    let post = db::insert_post(state.db.pool(), &new_post).await?;
    info!(post_id = %post.id, "Post created");

    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let id = require_id(&id, POST_NOT_FOUND)?;

    db::get_post(state.db.pool(), id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(POST_NOT_FOUND))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PostUpdate>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
    let id = require_id(&id, POST_NOT_FOUND)?;
    let update = update_body(payload)?;

    let post = db::update_post(state.db.pool(), id, &update)
        .await?
        .ok_or(ApiError::NotFound(POST_NOT_FOUND))?;
    info!(post_id = %post.id, "Post updated");

    Ok(Json(post))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedPost>, ApiError> {
    let id = require_id(&id, POST_NOT_FOUND)?;

    let post = db::delete_post_cascade(state.db.pool(), id)
        .await?
        .ok_or(ApiError::NotFound(POST_NOT_FOUND))?;
    info!(
        post_id = %post.id,
        comments = post.comments.len(),
        "Post and its comments deleted"
    );

    Ok(Json(DeletedPost {
        message: "Post and associated comments deleted successfully",
        post,
    }))
}
