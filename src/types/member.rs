use std::fmt;
use std::path::PathBuf;

use semver::Version;

/// Location of a workspace member: `<prefix>/<dir>`
///
/// Ordering is by prefix, then directory, so sets of members iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId {
    /// Root grouping directory (e.g. "crates", "credential")
    pub prefix: String,
    /// Directory name directly below the prefix
    pub dir: String,
}

impl MemberId {
    pub fn new(prefix: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dir: dir.into(),
        }
    }

    /// Path of the member directory relative to the workspace root
    pub fn rel_path(&self) -> PathBuf {
        PathBuf::from(&self.prefix).join(&self.dir)
    }

    /// Path of the member's Cargo.toml relative to the workspace root
    pub fn manifest_path(&self) -> PathBuf {
        self.rel_path().join("Cargo.toml")
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.dir)
    }
}

/// A publishable unit of the workspace, as declared by its manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMember {
    pub id: MemberId,
    /// `package.name`
    pub name: String,
    /// `package.version`, after workspace inheritance
    pub version: Version,
    /// False for `publish = false` or `publish = []`
    pub publish: bool,
}
