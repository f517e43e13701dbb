use std::path::Path;

use git2::{Commit, DiffOptions, Repository};
use tracing::debug;

use crate::error::ResolutionError;
use crate::types::ChangeSet;

/// Open the repository containing `path`
pub fn open_repo(path: &Path) -> Result<Repository, ResolutionError> {
    Repository::discover(path).map_err(|source| ResolutionError::OpenRepo {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve a revision (sha, branch, tag, `HEAD~2`, ...) to a commit
pub fn resolve_commit<'r>(repo: &'r Repository, rev: &str) -> Result<Commit<'r>, ResolutionError> {
    repo.revparse_single(rev)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(|source| ResolutionError::Revision {
            rev: rev.to_string(),
            source,
        })
}

/// Files changed between `base` and `head`, limited to `prefixes`
///
/// Without a base the first parent of `head` is used. Renames contribute
/// both their old and new path.
pub fn changed_paths(
    repo: &Repository,
    base: Option<&str>,
    head: &str,
    prefixes: &[String],
) -> Result<ChangeSet, ResolutionError> {
    let head_commit = resolve_commit(repo, head)?;
    let base_commit = match base {
        Some(rev) => resolve_commit(repo, rev)?,
        None => head_commit
            .parent(0)
            .map_err(|_| ResolutionError::NoParent(head.to_string()))?,
    };

    debug!(base = %base_commit.id(), head = %head_commit.id(), "diffing commits");

    let diff_err = |source: git2::Error| ResolutionError::Diff {
        base: base_commit.id().to_string(),
        head: head_commit.id().to_string(),
        source,
    };

    let base_tree = base_commit.tree().map_err(diff_err)?;
    let head_tree = head_commit.tree().map_err(diff_err)?;

    let mut opts = DiffOptions::new();
    for prefix in prefixes {
        opts.pathspec(prefix.trim_end_matches('/'));
    }

    let diff = repo
        .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), Some(&mut opts))
        .map_err(diff_err)?;

    let mut paths = Vec::new();
    for delta in diff.deltas() {
        for file in [delta.old_file(), delta.new_file()] {
            if let Some(path) = file.path() {
                paths.push(path.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    Ok(ChangeSet::new(paths))
}
