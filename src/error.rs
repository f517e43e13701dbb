use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A commit or pull request reference could not be turned into a change set
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("not a git repository: {path}")]
    OpenRepo {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },
    #[error("cannot resolve revision '{rev}' to a commit")]
    Revision {
        rev: String,
        #[source]
        source: git2::Error,
    },
    #[error("commit '{0}' has no parent to compare against; pass a base revision")]
    NoParent(String),
    #[error("failed to diff {base}..{head}")]
    Diff {
        base: String,
        head: String,
        #[source]
        source: git2::Error,
    },
    #[error("cannot list files of pull request #{pr}")]
    PullRequest {
        pr: u64,
        #[source]
        source: ApiError,
    },
}

/// Failure talking to an HTTP collaborator (registry index, review system)
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("malformed response from {url}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid version '{version}' in response from {url}")]
    InvalidVersion {
        url: String,
        version: String,
        #[source]
        source: semver::Error,
    },
}

/// The registry could not answer which versions of a package exist
#[derive(Error, Debug)]
#[error("failed to query registry for `{package}`")]
pub struct RegistryQueryError {
    pub package: String,
    #[source]
    pub source: ApiError,
}

/// Posting the report to the review system failed
#[derive(Error, Debug)]
#[error("failed to post comment on pull request #{pr}")]
pub struct CommentPostError {
    pub pr: u64,
    #[source]
    pub source: ApiError,
}

/// A member's Cargo.toml could not be read or understood
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse manifest: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("manifest has no [package] section: {0}")]
    NotAPackage(PathBuf),
    #[error("invalid version '{version}' in {path}")]
    InvalidVersion {
        path: PathBuf,
        version: String,
        #[source]
        source: semver::Error,
    },
    #[error("{0} inherits its version but the workspace declares none")]
    NoWorkspaceVersion(PathBuf),
}

/// Evaluating a set of changed members failed
#[derive(Error, Debug)]
pub enum EvaluateError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Registry(#[from] RegistryQueryError),
}
