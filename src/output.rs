use std::cell::RefCell;

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Output handler for consistent formatting
///
/// Progress and diagnostics go to stderr; reports go to stdout so they can
/// be piped or captured by CI.
#[derive(Debug, Default)]
pub struct Output {
    pub format: OutputFormat,
    pub verbose: bool,
    /// Suppress the "nothing to do" acknowledgments
    pub quiet: bool,
    /// Collects stdout text instead of printing it
    buffer: Option<RefCell<String>>,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool, quiet: bool) -> Self {
        Self {
            format,
            verbose,
            quiet,
            buffer: None,
        }
    }

    /// Like `new`, but stdout text is kept for `take_stdout` instead of printed
    pub fn buffered(format: OutputFormat, quiet: bool) -> Self {
        Self {
            buffer: Some(RefCell::new(String::new())),
            ..Self::new(format, false, quiet)
        }
    }

    /// Drain what a buffered handler would have printed on stdout
    pub fn take_stdout(&self) -> String {
        self.buffer
            .as_ref()
            .map(|buffer| buffer.take())
            .unwrap_or_default()
    }

    fn stdout(&self, text: &str) {
        match &self.buffer {
            Some(buffer) => buffer.borrow_mut().push_str(text),
            None => print!("{}", text),
        }
    }

    /// Print a status message (action: target)
    pub fn status(&self, action: &str, target: &str) {
        if self.format == OutputFormat::Human && !self.quiet {
            // Right-align action in 12 chars, like cargo does
            eprintln!("{:>12} {}", action, target);
        }
    }

    /// Print a success acknowledgment on stdout (suppressed by --quiet)
    pub fn success(&self, message: &str) {
        if self.format == OutputFormat::Human && !self.quiet {
            self.stdout(&format!("{}\n", message));
        }
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        if self.format == OutputFormat::Human {
            eprintln!("{:>12} {}", "Warning", message);
        }
    }

    /// Print a verbose message (only if verbose mode is on)
    pub fn verbose(&self, message: &str) {
        if self.verbose && self.format == OutputFormat::Human {
            eprintln!("{}", message);
        }
    }

    /// Print report text on stdout in human mode
    pub fn report(&self, text: &str) {
        if self.format == OutputFormat::Human {
            self.stdout(text);
        }
    }

    /// Print a value as pretty JSON on stdout in JSON mode
    pub fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            self.stdout(&format!("{}\n", serde_json::to_string_pretty(value)?));
        }
        Ok(())
    }
}

/// Print an error message to stderr
pub fn print_error(err: &anyhow::Error) {
    eprintln!("error: {}", err);

    // Print cause chain
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {}", cause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_printed_by_default() {
        let out = Output::buffered(OutputFormat::Human, false);
        out.success("all good");
        assert_eq!(out.take_stdout(), "all good\n");
        assert_eq!(out.take_stdout(), "");
    }

    #[test]
    fn test_quiet_suppresses_success_but_not_report() {
        let out = Output::buffered(OutputFormat::Human, true);
        out.success("all good");
        out.report("### notice\n");
        assert_eq!(out.take_stdout(), "### notice\n");
    }

    #[test]
    fn test_json_mode_prints_only_json() {
        let out = Output::buffered(OutputFormat::Json, false);
        out.success("all good");
        out.report("### notice\n");
        out.json(&serde_json::json!({ "needs_bump": false })).unwrap();
        assert_eq!(out.take_stdout(), "{\n  \"needs_bump\": false\n}\n");
    }
}
