//! Human readable rendering of bump verdicts.
//!
//! Rendering is a pure function of the verdicts, so re-running the check on
//! the same inputs produces a byte-identical comment body.

use std::fmt::Write;

use crate::types::BumpVerdict;

/// Heading of the comment posted when members need a bump
pub const NOTICE_HEADING: &str =
    "### :warning: Require at least a patch version bump for each of the following packages:";

/// Which question the last table column answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// "is the local version already on the registry?"
    Published,
    /// "does this member need a version bump?"
    NeedsBump,
}

/// Verdicts of one run, sorted by package name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    verdicts: Vec<BumpVerdict>,
}

impl Report {
    pub fn new(mut verdicts: Vec<BumpVerdict>) -> Self {
        verdicts.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        Self { verdicts }
    }

    pub fn verdicts(&self) -> &[BumpVerdict] {
        &self.verdicts
    }

    /// Members whose declared version is not ahead of the registry
    pub fn needing_bump(&self) -> Vec<&BumpVerdict> {
        self.verdicts.iter().filter(|v| v.needs_bump()).collect()
    }

    /// True when no member needs a bump
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| !v.needs_bump())
    }

    /// Comment body listing members that need a bump, `None` if there are none
    pub fn notice(&self) -> Option<String> {
        let flagged = self.needing_bump();
        if flagged.is_empty() {
            return None;
        }

        let mut out = String::new();
        out.push_str(NOTICE_HEADING);
        out.push_str("\n\n");
        for v in &flagged {
            match &v.published {
                Some(published) => {
                    let _ = writeln!(out, "* {} ({} <= {})", v.name, v.local, published);
                }
                None => {
                    let _ = writeln!(out, "* {}", v.name);
                }
            }
        }
        out.push('\n');
        out.push_str(&render_table(&flagged, TableMode::NeedsBump));
        Some(out)
    }
}

/// Markdown table of registry vs. local versions
///
/// ```text
/// | name       | crates.io | local  | published? |
/// | ----       | --------- | -----  | ---------- |
/// | cargo-util | 0.2.3     | 0.2.4  | no         |
/// | home       | 0.5.5     | 0.5.5  | yes        |
/// ```
pub fn render_table(rows: &[&BumpVerdict], mode: TableMode) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let last = match mode {
        TableMode::Published => "published?",
        TableMode::NeedsBump => "need version bump?",
    };
    let header = ["name", "crates.io", "local", last].map(String::from);
    let separator = header.clone().map(|h| "-".repeat(h.len()));

    let body = rows.iter().map(|v| {
        let flag = match mode {
            TableMode::Published => v.local_published,
            TableMode::NeedsBump => v.needs_bump(),
        };
        [
            v.name.clone(),
            v.published
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            v.local.to_string(),
            if flag { "yes" } else { "no" }.to_string(),
        ]
    });

    let lines: Vec<[String; 4]> = [header, separator].into_iter().chain(body).collect();

    let mut widths = [0usize; 4];
    for line in &lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for line in &lines {
        for (cell, width) in line.iter().zip(widths) {
            let _ = write!(out, "| {cell:<width$} ");
        }
        out.push_str("|\n");
    }
    out
}
