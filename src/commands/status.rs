use anyhow::{Context, Result, bail};

use crate::evaluate::Evaluator;
use crate::output::Output;
use crate::registry::Registry;
use crate::report::{Report, TableMode, render_table};
use crate::workspace::Workspace;

/// Options for status command
pub struct StatusOptions {
    /// Package names to inspect (all publishable members if empty)
    pub packages: Vec<String>,
}

/// Show registry vs. local version of publishable members
pub fn status(
    ws: &Workspace,
    registry: &dyn Registry,
    opts: StatusOptions,
    out: &Output,
) -> Result<()> {
    let mut members = Vec::new();
    for id in ws.member_ids() {
        if let Some(member) = ws.load_member(&id)? {
            members.push(member);
        }
    }

    for wanted in &opts.packages {
        if !members.iter().any(|m| &m.name == wanted) {
            bail!(
                "package `{}` is not a member below {}",
                wanted,
                ws.config.prefixes.join(", ")
            );
        }
    }

    let selected = |name: &String| opts.packages.is_empty() || opts.packages.contains(name);
    members.retain(|m| m.publish && selected(&m.name));
    if members.is_empty() {
        out.success("No publishable members found.");
        out.json(&Vec::<()>::new())?;
        return Ok(());
    }

    out.status("Querying", &format!("registry for {} member(s)", members.len()));

    let verdicts = Evaluator::new(registry)
        .evaluate(&members)
        .context("failed to read publish status")?;
    let report = Report::new(verdicts);

    out.json(&report.verdicts())?;
    let rows: Vec<_> = report.verdicts().iter().collect();
    out.report(&render_table(&rows, TableMode::Published));

    Ok(())
}
