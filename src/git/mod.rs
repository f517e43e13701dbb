pub mod history;

pub use history::{changed_paths, open_repo, resolve_commit};
