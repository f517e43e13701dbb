//! Read-only view of what a package registry has published.

mod sparse;

use semver::Version;

use crate::error::RegistryQueryError;
use crate::types;

pub use sparse::{SparseIndex, index_path};

/// Package registry collaborator
///
/// The evaluator asks for `published_versions` because it also reports
/// whether the local version itself is taken; `latest_published` serves
/// callers that only need the newest release.
pub trait Registry {
    /// Every version ever published under `package`, yanked ones included
    ///
    /// An empty list means the package was never published.
    fn published_versions(&self, package: &str) -> Result<Vec<Version>, RegistryQueryError>;

    /// Highest published version, or `None` for a package never published
    ///
    /// Ordered by semver precedence, so build metadata never ranks a
    /// version above its plain release.
    fn latest_published(&self, package: &str) -> Result<Option<Version>, RegistryQueryError> {
        let versions = self.published_versions(package)?;
        Ok(types::latest(&versions).cloned())
    }
}
