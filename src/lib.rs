//! Version-bump gate for Cargo workspaces.
//!
//! Finds the workspace members touched by a change, compares each member's
//! declared version with the highest version already on the registry, and
//! reports the members that must be bumped before merge.

pub mod commands;
pub mod error;
pub mod evaluate;
pub mod git;
pub mod http;
pub mod output;
pub mod registry;
pub mod report;
pub mod review;
pub mod types;
pub mod workspace;

#[cfg(test)]
mod testing;
