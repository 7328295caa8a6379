// src/cli.rs

use crate::model::TimestampSource;
use crate::remote::DEFAULT_HOST;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Commit history reports for hosted git repositories",
    long_about = None
)]
pub struct Args {
    /// Directory holding `repositories/` and `reports/`
    #[arg(long, global = true, default_value = ".")]
    pub workdir: PathBuf,

    /// More diagnostics on stderr (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Write a flat, newest-first log of a branch's commits
    Log {
        #[command(flatten)]
        source: SourceArgs,

        /// Log file to write (default: <workdir>/reports/commits_log_<name>_<time>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a monthly Markdown report with a bar chart
    Monthly {
        #[command(flatten)]
        source: SourceArgs,

        /// Directory for the report and chart (default: <workdir>/reports)
        #[arg(long)]
        reports_dir: Option<PathBuf>,
    },
    /// Clone or update the working copy without reporting
    Sync {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Repository URL; asked for interactively when omitted
    #[arg(long)]
    pub url: Option<String>,

    /// Hosting domain the URL has to point at
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Authentication method; a menu is shown when omitted
    #[arg(long, value_enum)]
    pub auth: Option<AuthMethod>,

    /// Username for password authentication
    #[arg(long)]
    pub username: Option<String>,

    /// Environment variable holding a personal access token
    #[arg(long, default_value = "GITHUB_TOKEN")]
    pub token_env: String,

    /// Branch or revision to analyse (default: the checked-out branch)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Use the existing working copy without contacting the remote
    #[arg(long)]
    pub offline: bool,

    /// Timestamp used for dates and month buckets
    #[arg(long, value_enum, default_value_t = TimestampSource::Committer)]
    pub date: TimestampSource,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Personal access token
    Token,
    /// Username and password
    Password,
    /// No credentials (public repositories)
    #[value(name = "none")]
    Anonymous,
}
