use std::collections::{BTreeSet, HashSet};

use super::MemberId;

/// Files touched between a base and a head, in the order the source reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    paths: Vec<String>,
}

impl ChangeSet {
    /// Build a change set, collapsing duplicate paths (first occurrence wins)
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .map(Into::into)
            .filter(|p| seen.insert(p.clone()))
            .collect();
        Self { paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Workspace members containing at least one changed path
    ///
    /// A path belongs to a member when it lies inside a directory directly
    /// below one of `prefixes`. Files sitting at the prefix level itself
    /// (e.g. `crates/README.md`) belong to no member.
    pub fn members(&self, prefixes: &[String]) -> BTreeSet<MemberId> {
        self.paths
            .iter()
            .filter_map(|path| member_of(path, prefixes))
            .collect()
    }
}

fn member_of(path: &str, prefixes: &[String]) -> Option<MemberId> {
    prefixes.iter().find_map(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        let rest = path.strip_prefix(prefix)?.strip_prefix('/')?;
        let (dir, _) = rest.split_once('/')?;
        if dir.is_empty() {
            return None;
        }
        Some(MemberId::new(prefix, dir))
    })
}
