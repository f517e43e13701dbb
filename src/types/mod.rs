mod change_set;
mod config;
mod member;
mod verdict;

pub use change_set::ChangeSet;
pub use config::{Config, CONFIG_FILE};
pub use member::{MemberId, WorkspaceMember};
pub use verdict::{BumpVerdict, Verdict, contains_release, latest};
