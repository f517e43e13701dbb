use std::cmp::Ordering;

use semver::Version;
use serde::Serialize;

/// Outcome of comparing a member's declared version with the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Declared version is not ahead of what is already published
    NeedsBump,
    Satisfied,
}

impl Verdict {
    /// A member needs a bump unless its declared version is strictly greater
    /// than the latest published one. A first publish never needs a bump.
    ///
    /// Build metadata is ignored: `0.3.0+patched` and `0.3.0` are the same
    /// release to the registry.
    pub fn decide(declared: &Version, published: Option<&Version>) -> Self {
        match published {
            Some(published) if declared.cmp_precedence(published) != Ordering::Greater => {
                Verdict::NeedsBump
            }
            _ => Verdict::Satisfied,
        }
    }
}

/// Highest version by semver precedence, build metadata ignored
pub fn latest(versions: &[Version]) -> Option<&Version> {
    versions.iter().max_by(|a, b| a.cmp_precedence(b))
}

/// Whether `version` is among `versions`, build metadata ignored
pub fn contains_release(versions: &[Version], version: &Version) -> bool {
    versions
        .iter()
        .any(|v| v.cmp_precedence(version) == Ordering::Equal)
}

/// Verdict for one member together with the versions it was derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpVerdict {
    /// Package name
    pub name: String,
    /// Member directory relative to the workspace root
    pub path: String,
    /// Version declared in the member's manifest
    pub local: Version,
    /// Highest version on the registry, if any was ever published
    pub published: Option<Version>,
    /// Whether exactly the local version exists on the registry
    pub local_published: bool,
    pub verdict: Verdict,
}

impl BumpVerdict {
    pub fn needs_bump(&self) -> bool {
        self.verdict == Verdict::NeedsBump
    }
}
