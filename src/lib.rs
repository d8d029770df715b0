//! Blog backend library.
//!
//! A REST service over blog posts and their comments, stored in SQLite.
//! Posts own an ordered list of comment ids; deleting a post deletes its
//! comments, and deleting a comment detaches it from its post.

pub mod config;
pub mod db;
pub mod ids;
pub mod validation;
pub mod web;
