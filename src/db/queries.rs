use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

use super::models::{
    Comment, CommentRemoval, CommentUpdate, NewComment, NewPost, Post, PostRow, PostUpdate,
};
use crate::ids::generate_id;

/// Bound ids per `IN (...)` query.
const ID_CHUNK_SIZE: usize = 500;

// ========== Internal Helpers ==========

async fn fetch_post_row(conn: &mut SqliteConnection, id: &str) -> Result<Option<PostRow>> {
    sqlx::query_as(
        r"
        SELECT id, title, content, extract, author_name, author_email
        FROM posts
        WHERE id = ?
        ",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .context("Failed to fetch post")
}

async fn fetch_comment_ids(conn: &mut SqliteConnection, post_id: &str) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT comment_id FROM post_comments WHERE post_id = ? ORDER BY position",
    )
    .bind(post_id)
    .fetch_all(&mut *conn)
    .await
    .context("Failed to fetch comment ids for post")?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn fetch_post(conn: &mut SqliteConnection, id: &str) -> Result<Option<Post>> {
    let Some(row) = fetch_post_row(conn, id).await? else {
        return Ok(None);
    };
    let comments = fetch_comment_ids(conn, id).await?;
    Ok(Some(row.with_comments(comments)))
}

async fn fetch_comment(conn: &mut SqliteConnection, id: &str) -> Result<Option<Comment>> {
    sqlx::query_as("SELECT id, author_name, author_email, content FROM comments WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to fetch comment")
}

async fn post_row_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to check post existence")?;
    Ok(row.is_some())
}

// ========== Posts ==========

/// List every post in insertion order, each with its comment ids.
pub async fn list_posts(pool: &SqlitePool) -> Result<Vec<Post>> {
    let rows: Vec<PostRow> = sqlx::query_as(
        r"
        SELECT id, title, content, extract, author_name, author_email
        FROM posts
        ORDER BY rowid
        ",
    )
    .fetch_all(pool)
    .await
    .context("Failed to fetch posts")?;

    let links: Vec<(String, String)> = sqlx::query_as(
        "SELECT post_id, comment_id FROM post_comments ORDER BY post_id, position",
    )
    .fetch_all(pool)
    .await
    .context("Failed to fetch post comments")?;

    let mut comments_by_post: HashMap<String, Vec<String>> = HashMap::new();
    for (post_id, comment_id) in links {
        comments_by_post.entry(post_id).or_default().push(comment_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let comments = comments_by_post.remove(&row.id).unwrap_or_default();
            row.with_comments(comments)
        })
        .collect())
}

/// Insert a new post and return it with its generated id and no comments.
pub async fn insert_post(pool: &SqlitePool, post: &NewPost) -> Result<Post> {
    let id = generate_id();

    sqlx::query(
        r"
        INSERT INTO posts (id, title, content, extract, author_name, author_email)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(&id)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.extract)
    .bind(&post.author_name)
    .bind(&post.author_email)
    .execute(pool)
    .await
    .context("Failed to insert post")?;

    Ok(Post {
        id,
        title: post.title.clone(),
        content: post.content.clone(),
        extract: post.extract.clone(),
        author_name: post.author_name.clone(),
        author_email: post.author_email.clone(),
        comments: Vec::new(),
    })
}

/// Get a post by id.
pub async fn get_post(pool: &SqlitePool, id: &str) -> Result<Option<Post>> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    fetch_post(&mut conn, id).await
}

/// Check whether a post exists.
pub async fn post_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    post_row_exists(&mut conn, id).await
}

/// Replace the provided fields of a post, returning the post after the update.
///
/// Fields left as `None` keep their stored value. Returns `None` if the post
/// does not exist.
pub async fn update_post(pool: &SqlitePool, id: &str, update: &PostUpdate) -> Result<Option<Post>> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin post update transaction")?;

    let result = sqlx::query(
        r"
        UPDATE posts
        SET title = COALESCE(?, title),
            content = COALESCE(?, content),
            author_name = COALESCE(?, author_name),
            author_email = COALESCE(?, author_email)
        WHERE id = ?
        ",
    )
    .bind(&update.title)
    .bind(&update.content)
    .bind(&update.author_name)
    .bind(&update.author_email)
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update post")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    let post = fetch_post(&mut tx, id).await?;
    tx.commit().await.context("Failed to commit post update")?;

    Ok(post)
}

/// Delete a post together with every comment it references.
///
/// Returns the post as it was before deletion, or `None` if it does not exist
/// (in which case nothing is deleted). Both steps share one transaction, so a
/// failed post deletion leaves the comments in place.
pub async fn delete_post_cascade(pool: &SqlitePool, id: &str) -> Result<Option<Post>> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin delete transaction")?;

    let Some(post) = fetch_post(&mut tx, id).await? else {
        return Ok(None);
    };

    // Comments first: the post_comments rows still name them
    let removed = sqlx::query(
        r"
        DELETE FROM comments
        WHERE id IN (SELECT comment_id FROM post_comments WHERE post_id = ?)
        ",
    )
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete comments")?
    .rows_affected();

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete post")?;

    tx.commit().await.context("Failed to commit delete")?;

    tracing::debug!(post_id = id, comments_removed = removed, "Post deleted");

    Ok(Some(post))
}

// ========== Comments ==========

/// List a post's comments in the order they were added.
pub async fn get_comments_for_post(pool: &SqlitePool, post_id: &str) -> Result<Vec<Comment>> {
    sqlx::query_as(
        r"
        SELECT c.id, c.author_name, c.author_email, c.content
        FROM post_comments pc
        JOIN comments c ON c.id = pc.comment_id
        WHERE pc.post_id = ?
        ORDER BY pc.position
        ",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch comments for post")
}

/// Expand a list of comment ids into full comments.
///
/// The result follows the order of `ids`; ids without a stored comment are
/// skipped. Ids are bound in chunks to stay under SQLite's variable limit.
pub async fn get_comments_by_ids(pool: &SqlitePool, ids: &[String]) -> Result<Vec<Comment>> {
    let mut by_id: HashMap<String, Comment> = HashMap::with_capacity(ids.len());

    for chunk in ids.chunks(ID_CHUNK_SIZE) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, author_name, author_email, content FROM comments WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let found: Vec<Comment> = builder
            .build_query_as()
            .fetch_all(pool)
            .await
            .context("Failed to fetch comments by id")?;

        by_id.extend(found.into_iter().map(|c| (c.id.clone(), c)));
    }

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Get a comment by id.
pub async fn get_comment(pool: &SqlitePool, id: &str) -> Result<Option<Comment>> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    fetch_comment(&mut conn, id).await
}

/// Create a comment and append it to the post's comment list.
///
/// Returns `None` if the post does not exist, in which case no comment is created.
pub async fn add_comment_to_post(
    pool: &SqlitePool,
    post_id: &str,
    comment: &NewComment,
) -> Result<Option<Comment>> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin add comment transaction")?;

    if !post_row_exists(&mut tx, post_id).await? {
        return Ok(None);
    }

    let id = generate_id();

    sqlx::query(
        r"
        INSERT INTO comments (id, author_name, author_email, content)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(&id)
    .bind(&comment.author_name)
    .bind(&comment.author_email)
    .bind(&comment.content)
    .execute(&mut *tx)
    .await
    .context("Failed to insert comment")?;

    sqlx::query(
        r"
        INSERT INTO post_comments (post_id, comment_id, position)
        SELECT ?, ?, COALESCE(MAX(position), -1) + 1
        FROM post_comments
        WHERE post_id = ?
        ",
    )
    .bind(post_id)
    .bind(&id)
    .bind(post_id)
    .execute(&mut *tx)
    .await
    .context("Failed to attach comment to post")?;

    tx.commit().await.context("Failed to commit add comment")?;

    Ok(Some(Comment {
        id,
        author_name: comment.author_name.clone(),
        author_email: comment.author_email.clone(),
        content: comment.content.clone(),
    }))
}

/// Replace the provided fields of a comment, returning the comment after the update.
///
/// Returns `None` if the comment does not exist.
pub async fn update_comment(
    pool: &SqlitePool,
    id: &str,
    update: &CommentUpdate,
) -> Result<Option<Comment>> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin comment update transaction")?;

    let result = sqlx::query(
        r"
        UPDATE comments
        SET author_name = COALESCE(?, author_name),
            author_email = COALESCE(?, author_email),
            content = COALESCE(?, content)
        WHERE id = ?
        ",
    )
    .bind(&update.author_name)
    .bind(&update.author_email)
    .bind(&update.content)
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update comment")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    let comment = fetch_comment(&mut tx, id).await?;
    tx.commit()
        .await
        .context("Failed to commit comment update")?;

    Ok(comment)
}

/// Detach a comment from its post and delete it, in one transaction.
pub async fn delete_comment_from_post(
    pool: &SqlitePool,
    post_id: &str,
    comment_id: &str,
) -> Result<CommentRemoval> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin delete comment transaction")?;

    if !post_row_exists(&mut tx, post_id).await? {
        return Ok(CommentRemoval::PostNotFound);
    }

    sqlx::query("DELETE FROM post_comments WHERE comment_id = ?")
        .bind(comment_id)
        .execute(&mut *tx)
        .await
        .context("Failed to detach comment from post")?;

    let deleted = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(comment_id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete comment")?;

    // Dropping the transaction rolls the detach back
    if deleted.rows_affected() == 0 {
        return Ok(CommentRemoval::CommentNotFound);
    }

    tx.commit()
        .await
        .context("Failed to commit delete comment")?;

    Ok(CommentRemoval::Removed)
}
