mod discovery;
pub mod manifest;

pub use discovery::{Workspace, find_workspace_root, find_workspace_root_from};
pub use manifest::{PackageManifest, WorkspaceDefaults};
