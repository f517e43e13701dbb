pub mod check;
pub mod status;

pub use check::check;
pub use status::status;

/// How a command finished when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed, or every changed member is ahead of the registry
    Passed,
    /// At least one member needs a version bump
    BumpRequired,
}
