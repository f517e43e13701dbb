use std::fs;
use std::path::Path;

use semver::Version;
use serde::Deserialize;

use crate::error::ManifestError;

/// A field that is either given inline or inherited with `field.workspace = true`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MaybeWorkspace<T> {
    Inherited { workspace: bool },
    Defined(T),
}

/// `publish = false` or `publish = ["registry", ...]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Publish {
    Flag(bool),
    Registries(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
    version: Option<MaybeWorkspace<String>>,
    publish: Option<MaybeWorkspace<Publish>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWorkspacePackage {
    version: Option<String>,
    publish: Option<Publish>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWorkspace {
    #[serde(default)]
    package: RawWorkspacePackage,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    package: Option<RawPackage>,
    workspace: Option<RawWorkspace>,
}

/// Values a member may inherit from `[workspace.package]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceDefaults {
    pub version: Option<Version>,
    pub publish: Option<bool>,
}

/// The parts of a package manifest the bump check cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: Version,
    pub publish: bool,
}

fn read(path: &Path) -> Result<RawManifest, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_version(path: &Path, version: &str) -> Result<Version, ManifestError> {
    Version::parse(version.trim()).map_err(|source| ManifestError::InvalidVersion {
        path: path.to_path_buf(),
        version: version.to_string(),
        source,
    })
}

impl Publish {
    fn allowed(&self) -> bool {
        match self {
            Publish::Flag(flag) => *flag,
            Publish::Registries(registries) => !registries.is_empty(),
        }
    }
}

impl WorkspaceDefaults {
    /// Read `[workspace.package]` from the workspace root manifest
    pub fn load(root_manifest: &Path) -> Result<Self, ManifestError> {
        let package = read(root_manifest)?.workspace.unwrap_or_default().package;
        let version = package
            .version
            .map(|v| parse_version(root_manifest, &v))
            .transpose()?;
        Ok(Self {
            version,
            publish: package.publish.map(|p| p.allowed()),
        })
    }
}

impl PackageManifest {
    /// Read a member manifest, resolving inherited fields against `defaults`
    ///
    /// A package without a version is `0.0.0` and unpublishable, matching
    /// how Cargo treats an omitted `package.version`.
    pub fn load(path: &Path, defaults: &WorkspaceDefaults) -> Result<Self, ManifestError> {
        let package = read(path)?
            .package
            .ok_or_else(|| ManifestError::NotAPackage(path.to_path_buf()))?;

        let (version, default_publish) = match package.version {
            None => (Version::new(0, 0, 0), false),
            Some(MaybeWorkspace::Defined(v)) => (parse_version(path, &v)?, true),
            Some(MaybeWorkspace::Inherited { workspace }) => {
                let inherited = defaults.version.clone().filter(|_| workspace);
                let version =
                    inherited.ok_or_else(|| ManifestError::NoWorkspaceVersion(path.to_path_buf()))?;
                (version, true)
            }
        };

        let publish = match package.publish {
            None => default_publish,
            Some(MaybeWorkspace::Defined(p)) => p.allowed(),
            Some(MaybeWorkspace::Inherited { .. }) => defaults.publish.unwrap_or(default_publish),
        };

        Ok(Self {
            name: package.name,
            version,
            publish,
        })
    }
}
