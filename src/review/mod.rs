//! Hosted code-review system: pull request file lists and comments.

mod github;

use crate::error::{ApiError, CommentPostError};

pub use github::GitHub;

/// Review system collaborator
pub trait ReviewSystem {
    /// Paths touched by pull request `pr`; renames report old and new path
    fn list_files(&self, pr: u64) -> Result<Vec<String>, ApiError>;

    /// Post `body` as a comment on pull request `pr`
    fn post_comment(&self, pr: u64, body: &str) -> Result<(), CommentPostError>;
}
