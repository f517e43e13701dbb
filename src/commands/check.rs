use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::debug;

use super::Outcome;
use crate::error::ResolutionError;
use crate::evaluate::Evaluator;
use crate::git;
use crate::output::Output;
use crate::registry::Registry;
use crate::report::Report;
use crate::review::ReviewSystem;
use crate::types::{BumpVerdict, ChangeSet};
use crate::workspace::Workspace;

/// Message printed when the change touches no member
pub const NO_MEMBER_CHANGED: &str = "No file changed in member crates.";

/// Where the change under review comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSource {
    /// Diff between two commits; without a base, head's first parent is used
    Commits { base: Option<String>, head: String },
    /// Files of a pull request on the review system
    PullRequest(u64),
}

/// Options for check command
pub struct CheckOptions {
    pub source: ChangeSource,
    /// Post the notice on the pull request when members need a bump
    pub comment: bool,
}

/// Collaborators the check talks to
pub struct Collaborators<'a> {
    pub registry: &'a dyn Registry,
    pub review: Option<&'a dyn ReviewSystem>,
}

#[derive(Serialize)]
struct CheckSummary<'a> {
    members: Vec<String>,
    verdicts: &'a [BumpVerdict],
    needs_bump: bool,
}

/// Check that every changed member is ahead of its published version
pub fn check(
    ws: &Workspace,
    with: Collaborators<'_>,
    opts: CheckOptions,
    out: &Output,
) -> Result<Outcome> {
    let changes = collect_changes(ws, with.review, &opts.source)?;
    let members = changes.members(&ws.config.prefixes);
    debug!(paths = changes.paths().len(), members = members.len(), "collected change set");

    for member in &members {
        out.verbose(&format!("changed member: {}", member));
    }

    if members.is_empty() {
        out.success(NO_MEMBER_CHANGED);
        out.json(&CheckSummary {
            members: Vec::new(),
            verdicts: &[],
            needs_bump: false,
        })?;
        return Ok(Outcome::Passed);
    }

    out.status("Checking", &format!("{} changed member(s)", members.len()));

    let verdicts = Evaluator::new(with.registry)
        .evaluate_changed(ws, &members)
        .context("version bump check aborted")?;
    let report = Report::new(verdicts);

    out.json(&CheckSummary {
        members: members.iter().map(ToString::to_string).collect(),
        verdicts: report.verdicts(),
        needs_bump: !report.passed(),
    })?;

    let Some(notice) = report.notice() else {
        out.success(&format!(
            "No version bump needed for {} checked member(s).",
            report.verdicts().len()
        ));
        return Ok(Outcome::Passed);
    };

    out.report(&notice);

    if let (true, ChangeSource::PullRequest(pr), Some(review)) =
        (opts.comment, &opts.source, with.review)
    {
        match review.post_comment(*pr, &notice) {
            Ok(()) => out.status("Commented", &format!("on pull request #{}", pr)),
            Err(e) => out.warn(&format!("{:#}", anyhow::Error::from(e))),
        }
    }

    Ok(Outcome::BumpRequired)
}

fn collect_changes(
    ws: &Workspace,
    review: Option<&dyn ReviewSystem>,
    source: &ChangeSource,
) -> Result<ChangeSet> {
    match source {
        ChangeSource::Commits { base, head } => {
            let repo = git::open_repo(&ws.root)?;
            Ok(git::changed_paths(
                &repo,
                base.as_deref(),
                head,
                &ws.config.prefixes,
            )?)
        }
        ChangeSource::PullRequest(pr) => {
            let review = review.ok_or_else(|| {
                anyhow!("pull request #{} given but no review repository is configured", pr)
            })?;
            let files = review
                .list_files(*pr)
                .map_err(|source| ResolutionError::PullRequest { pr: *pr, source })?;
            Ok(ChangeSet::new(files))
        }
    }
}
