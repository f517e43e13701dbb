use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use bumpcheck::commands::{self, Outcome};
use bumpcheck::commands::check::{ChangeSource, CheckOptions, Collaborators};
use bumpcheck::commands::status::StatusOptions;
use bumpcheck::output::{print_error, Output, OutputFormat};
use bumpcheck::registry::SparseIndex;
use bumpcheck::review::{GitHub, ReviewSystem};
use bumpcheck::workspace::{find_workspace_root_from, Workspace};

#[derive(Parser)]
#[command(name = "bumpcheck")]
#[command(about = "Flag changed workspace members whose version is already published")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Run as if started in DIR
    #[arg(short = 'C', value_name = "DIR", global = true)]
    directory: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that changed members need no version bump
    Check {
        /// Pull request number; its file list replaces the commit diff
        pr: Option<u64>,

        /// Base revision (default: first parent of head)
        #[arg(long, env = "BASE_SHA")]
        base: Option<String>,

        /// Head revision
        #[arg(long, env = "HEAD_SHA", default_value = "HEAD")]
        head: String,

        /// Repository slug (owner/name) of the pull request
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repository: Option<String>,

        /// API token for the review system
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Print the report but do not comment on the pull request
        #[arg(long)]
        no_comment: bool,

        /// Stay silent when no bump is needed
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show registry and local versions of publishable members
    Status {
        /// Package to inspect (repeatable; default: all)
        #[arg(short, long = "package", value_name = "NAME")]
        packages: Vec<String>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let quiet = matches!(cli.command, Commands::Check { quiet: true, .. });
    let out = Output::new(format, cli.verbose, quiet);

    match run(cli, &out) {
        Ok(Outcome::Passed) => ExitCode::SUCCESS,
        Ok(Outcome::BumpRequired) => ExitCode::FAILURE,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "bumpcheck=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, out: &Output) -> anyhow::Result<Outcome> {
    if let Commands::Completion { shell } = cli.command {
        generate_completions(shell);
        return Ok(Outcome::Passed);
    }

    let ws = match &cli.directory {
        Some(dir) => Workspace::load_from(find_workspace_root_from(dir)?)?,
        None => Workspace::load()?,
    };
    let registry =
        SparseIndex::new(&ws.config.index_url).context("failed to set up registry client")?;

    match cli.command {
        Commands::Check {
            pr,
            base,
            head,
            repository,
            token,
            no_comment,
            quiet: _,
        } => {
            let source = match pr {
                Some(pr) => ChangeSource::PullRequest(pr),
                None => ChangeSource::Commits {
                    // CI exports BASE_SHA="" on push events
                    base: base.filter(|b| !b.is_empty()),
                    head,
                },
            };

            let review = match repository.or_else(|| ws.config.repository.clone()) {
                Some(repo) if !repo.is_empty() => Some(
                    GitHub::new(&ws.config.api_url, &repo, token)
                        .context("failed to set up review client")?,
                ),
                _ => None,
            };

            let with = Collaborators {
                registry: &registry,
                review: review.as_ref().map(|r| r as &dyn ReviewSystem),
            };
            let opts = CheckOptions {
                source,
                comment: !no_comment,
            };
            commands::check(&ws, with, opts, out)
        }

        Commands::Status { packages } => {
            commands::status(&ws, &registry, StatusOptions { packages }, out)?;
            Ok(Outcome::Passed)
        }

        Commands::Completion { .. } => unreachable!(),
    }
}

fn generate_completions(shell: Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
