use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Config file name, looked up at the workspace root
pub const CONFIG_FILE: &str = ".bumpcheck.yaml";

/// Workspace configuration (.bumpcheck.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directories whose immediate subdirectories are publishable members
    pub prefixes: Vec<String>,

    /// Base URL of the sparse registry index
    pub index_url: String,

    /// Base URL of the review system's REST API
    pub api_url: String,

    /// Repository slug (owner/name) pull requests belong to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefixes: vec!["crates".into(), "credential".into(), "benches".into()],
            index_url: "https://index.crates.io".into(),
            api_url: "https://api.github.com".into(),
            repository: None,
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Config = serde_yml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Load `.bumpcheck.yaml` from the workspace root, or defaults if absent
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    fn validate(&self) -> Result<()> {
        if self.prefixes.is_empty() {
            bail!("`prefixes` must name at least one directory");
        }
        for prefix in &self.prefixes {
            let trimmed = prefix.trim_matches('/');
            if trimmed.is_empty() || trimmed.split('/').any(|s| s == ".." || s == ".") {
                bail!("prefix must be a plain relative directory, got '{}'", prefix);
            }
        }
        Ok(())
    }
}
