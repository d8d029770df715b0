//! Handlers for comments nested under a post (`/posts/:id/comments`).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::error::{
    require_id, update_body, ApiError, COMMENT_NOT_FOUND, POST_NOT_FOUND,
};
use super::AppState;
use crate::db::{self, Comment, CommentRemoval, CommentUpdate};
use crate::ids::is_valid_id;
use crate::validation::{validate_new_comment, CommentInput};

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// `GET /posts/:id/comments`: the post's comments, in the order they were added.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let post_id = require_id(&post_id, POST_NOT_FOUND)?;

    if !db::post_exists(state.db.pool(), post_id).await? {
        return Err(ApiError::NotFound(POST_NOT_FOUND));
    }
    let comments = db::get_comments_for_post(state.db.pool(), post_id).await?;

    Ok(Json(comments))
}

/// `POST /posts/:id/comments`: create a comment and attach it to the post.
pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<CommentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let post_id = require_id(&post_id, POST_NOT_FOUND)?;
    let Json(input) = payload?;
    let new_comment = validate_new_comment(&input)?;

    let comment = db::add_comment_to_post(state.db.pool(), post_id, &new_comment)
        .await?
        .ok_or(ApiError::NotFound(POST_NOT_FOUND))?;
    info!(post_id, comment_id = %comment.id, "Comment added");

    Ok((StatusCode::CREATED, Json(comment)))
}

/// `PUT /posts/:id/comments/:comment_id`.
///
/// The post must exist, but the comment is not required to belong to it.
pub async fn update_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
    payload: Result<Json<CommentUpdate>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let post_id = require_id(&post_id, POST_NOT_FOUND)?;
    let update = update_body(payload)?;

    if !db::post_exists(state.db.pool(), post_id).await? {
        return Err(ApiError::NotFound(POST_NOT_FOUND));
    }
    let comment_id = require_id(&comment_id, COMMENT_NOT_FOUND)?;

    let comment = db::update_comment(state.db.pool(), comment_id, &update)
        .await?
        .ok_or(ApiError::NotFound(COMMENT_NOT_FOUND))?;
    info!(post_id, comment_id, "Comment updated");

    Ok(Json(comment))
}

/// `DELETE /posts/:id/comments/:comment_id`: delete the comment and detach it
/// from the post.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Message>, ApiError> {
    let post_id = require_id(&post_id, POST_NOT_FOUND)?;

    // The post is checked before the comment, even when the comment id is malformed
    if !is_valid_id(&comment_id) {
        return if db::post_exists(state.db.pool(), post_id).await? {
            Err(ApiError::NotFound(COMMENT_NOT_FOUND))
        } else {
            Err(ApiError::NotFound(POST_NOT_FOUND))
        };
    }

    match db::delete_comment_from_post(state.db.pool(), post_id, &comment_id).await? {
        CommentRemoval::Removed => {
            info!(post_id, comment_id = %comment_id, "Comment deleted");
            Ok(Json(Message {
                message: "Comment deleted",
            }))
        }
        CommentRemoval::PostNotFound => Err(ApiError::NotFound(POST_NOT_FOUND)),
        CommentRemoval::CommentNotFound => Err(ApiError::NotFound(COMMENT_NOT_FOUND)),
    }
}
