use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{trace, warn};
use walkdir::WalkDir;

use super::manifest::{PackageManifest, WorkspaceDefaults};
use crate::error::ManifestError;
use crate::types::{Config, MemberId, WorkspaceMember};

/// Find the workspace root by walking up from the current directory
/// Returns the directory whose Cargo.toml has a `[workspace]` table
pub fn find_workspace_root() -> Result<PathBuf> {
    let current = env::current_dir().context("failed to get current directory")?;
    find_workspace_root_from(&current)
}

/// Find the workspace root starting from a specific directory
pub fn find_workspace_root_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let manifest = current.join("Cargo.toml");
        if manifest.is_file() && declares_workspace(&manifest)? {
            return Ok(current);
        }

        if !current.pop() {
            bail!(
                "not a cargo workspace (no Cargo.toml with [workspace] found in {} or any parent)",
                start.display()
            );
        }
    }
}

fn declares_workspace(manifest: &Path) -> Result<bool> {
    let content = fs::read_to_string(manifest)
        .with_context(|| format!("failed to read {}", manifest.display()))?;
    let table: toml::Table = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", manifest.display()))?;
    Ok(table.contains_key("workspace"))
}

/// Workspace context holding the root and loaded configuration
#[derive(Debug)]
pub struct Workspace {
    /// Directory containing the workspace Cargo.toml
    pub root: PathBuf,
    /// Bump check config
    pub config: Config,
    /// Inheritable `[workspace.package]` values
    pub defaults: WorkspaceDefaults,
}

impl Workspace {
    /// Load workspace from the current directory
    pub fn load() -> Result<Self> {
        let root = find_workspace_root()?;
        Self::load_from(root)
    }

    /// Load workspace from a specific root
    pub fn load_from(root: PathBuf) -> Result<Self> {
        let config = Config::load_or_default(&root)?;
        let defaults = WorkspaceDefaults::load(&root.join("Cargo.toml"))
            .context("failed to load workspace manifest")?;

        Ok(Self {
            root,
            config,
            defaults,
        })
    }

    /// Read a member's manifest
    ///
    /// Returns `None` when the directory has no Cargo.toml, which is the
    /// case for members deleted by the change under review.
    pub fn load_member(&self, id: &MemberId) -> Result<Option<WorkspaceMember>, ManifestError> {
        let path = self.root.join(id.manifest_path());
        if !path.is_file() {
            warn!(member = %id, "no Cargo.toml, skipping");
            return Ok(None);
        }

        let manifest = PackageManifest::load(&path, &self.defaults)?;
        trace!(member = %id, name = %manifest.name, version = %manifest.version, "loaded manifest");

        Ok(Some(WorkspaceMember {
            id: id.clone(),
            name: manifest.name,
            version: manifest.version,
            publish: manifest.publish,
        }))
    }

    /// Every member directory below the configured prefixes, sorted
    pub fn member_ids(&self) -> Vec<MemberId> {
        let mut ids = Vec::new();

        for prefix in &self.config.prefixes {
            let prefix = prefix.trim_end_matches('/');
            let dir = self.root.join(prefix);
            if !dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .follow_links(false)
                .into_iter()
                .flatten()
            {
                if entry.file_type().is_dir() && entry.path().join("Cargo.toml").is_file() {
                    let name = entry.file_name().to_string_lossy().to_string();
                    ids.push(MemberId::new(prefix, name));
                }
            }
        }

        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_find_workspace_root() {
        let fx = Fixture::new();
        let root = find_workspace_root_from(fx.path()).unwrap();
        assert_eq!(root, fx.path());
    }

    #[test]
    fn test_find_workspace_root_from_member() {
        let fx = Fixture::new();
        fx.member("crates/foo", "foo", "1.0.0");
        let root = find_workspace_root_from(&fx.path().join("crates/foo/src")).unwrap();
        assert_eq!(root, fx.path());
    }

    #[test]
    fn test_find_workspace_root_skips_package_manifests() {
        let fx = Fixture::new();
        fx.write(
            "tests/nested/Cargo.toml",
            "[package]\nname = \"nested\"\nversion = \"0.1.0\"\n",
        );
        let root = find_workspace_root_from(&fx.path().join("tests/nested")).unwrap();
        assert_eq!(root, fx.path());
    }

    #[test]
    fn test_member_ids() {
        let fx = Fixture::new();
        fx.member("crates/foo", "foo", "1.0.0");
        fx.member("credential/bar", "bar", "0.3.0");
        fx.write("crates/not-a-member/README.md", "no manifest here\n");
        fx.write("tests/fixture/Cargo.toml", "[package]\nname = \"t\"\n");

        let ws = fx.workspace();
        let ids: Vec<String> = ws.member_ids().iter().map(|m| m.to_string()).collect();
        assert_eq!(ids, ["crates/foo", "credential/bar"]);
    }

    #[test]
    fn test_load_member_inherits_version() {
        let fx = Fixture::new();
        fx.write(
            "crates/inherit/Cargo.toml",
            "[package]\nname = \"inherit\"\nversion.workspace = true\n",
        );

        let ws = fx.workspace();
        let member = ws
            .load_member(&MemberId::new("crates", "inherit"))
            .unwrap()
            .unwrap();
        assert_eq!(member.version.to_string(), "0.9.0");
        assert!(member.publish);
    }

    #[test]
    fn test_load_member_missing_manifest() {
        let fx = Fixture::new();
        let ws = fx.workspace();
        assert!(ws.load_member(&MemberId::new("crates", "gone")).unwrap().is_none());
    }
}
