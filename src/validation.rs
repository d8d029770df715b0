//! Required-field checks for incoming posts and comments.
//!
//! Requests are validated here, before anything touches the store, so the
//! store only ever sees complete records.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::db::{NewComment, NewPost};

/// Body of a create-post request. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub extract: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

/// Body of a create-comment request. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub content: Option<String>,
}

/// Kind of record being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Post,
    Comment,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => f.write_str("Post"),
            Self::Comment => f.write_str("Comment"),
        }
    }
}

/// One or more required fields were missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} validation failed: {}", describe_missing(.missing))]
pub struct ValidationError {
    pub entity: Entity,
    /// Missing fields, named as they appear in the request body.
    pub missing: Vec<&'static str>,
}

fn describe_missing(missing: &[&'static str]) -> String {
    missing
        .iter()
        .map(|field| format!("{field} is required"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects required values, remembering which ones were missing.
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    const fn new() -> Self {
        Self {
            missing: Vec::new(),
        }
    }

    fn take(&mut self, name: &'static str, value: Option<&String>) -> String {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => v.clone(),
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn finish<T>(self, entity: Entity, value: T) -> Result<T, ValidationError> {
        if self.missing.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError {
                entity,
                missing: self.missing,
            })
        }
    }
}

/// Validate a create-post request.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming every missing or blank field.
pub fn validate_new_post(input: &PostInput) -> Result<NewPost, ValidationError> {
    let mut required = Required::new();
    let post = NewPost {
        title: required.take("title", input.title.as_ref()),
        content: required.take("content", input.content.as_ref()),
        extract: required.take("extract", input.extract.as_ref()),
        author_name: required.take("authorName", input.author_name.as_ref()),
        author_email: required.take("authorEmail", input.author_email.as_ref()),
    };
    required.finish(Entity::Post, post)
}

/// Validate a create-comment request.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming every missing or blank field.
pub fn validate_new_comment(input: &CommentInput) -> Result<NewComment, ValidationError> {
    let mut required = Required::new();
    let comment = NewComment {
        author_name: required.take("authorName", input.author_name.as_ref()),
        author_email: required.take("authorEmail", input.author_email.as_ref()),
        content: required.take("content", input.content.as_ref()),
    };
    required.finish(Entity::Comment, comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_post() -> PostInput {
        PostInput {
            title: Some("A".to_string()),
            content: Some("B".to_string()),
            extract: Some("C".to_string()),
            author_name: Some("x".to_string()),
            author_email: Some("y@z.com".to_string()),
        }
    }

    #[test]
    fn test_valid_post() {
        let post = validate_new_post(&full_post()).unwrap();
        assert_eq!(post.title, "A");
        assert_eq!(post.content, "B");
        assert_eq!(post.extract, "C");
        assert_eq!(post.author_name, "x");
        assert_eq!(post.author_email, "y@z.com");
    }

    #[test]
    fn test_post_missing_fields_are_all_reported() {
        let input = PostInput {
            title: None,
            extract: Some("   ".to_string()),
            ..full_post()
        };
        let err = validate_new_post(&input).unwrap_err();
        assert_eq!(err.entity, Entity::Post);
        assert_eq!(err.missing, vec!["title", "extract"]);
        assert_eq!(
            err.to_string(),
            "Post validation failed: title is required, extract is required"
        );
    }

    #[test]
    fn test_empty_post_body() {
        let err = validate_new_post(&PostInput::default()).unwrap_err();
        assert_eq!(
            err.missing,
            vec!["title", "content", "extract", "authorName", "authorEmail"]
        );
    }

    #[test]
    fn test_valid_comment_keeps_original_text() {
        let input = CommentInput {
            author_name: Some("Reader".to_string()),
            author_email: Some("reader@example.com".to_string()),
            content: Some("  Nice post!  ".to_string()),
        };
        let comment = validate_new_comment(&input).unwrap();
        assert_eq!(comment.content, "  Nice post!  ");
    }

    #[test]
    fn test_comment_missing_content() {
        let input = CommentInput {
            author_name: Some("Reader".to_string()),
            author_email: Some("reader@example.com".to_string()),
            content: Some(String::new()),
        };
        let err = validate_new_comment(&input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Comment validation failed: content is required"
        );
    }
}
