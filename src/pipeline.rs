// src/pipeline.rs

use crate::analyzer::History;
use crate::cli::{Args, Command};
use crate::config::RunConfig;
use crate::model::MonthlyAggregate;
use crate::prompt::TermPrompt;
use crate::renderer::render_chart;
use crate::report::{self, MarkdownReport};
use crate::sync::{synchronize, SyncOutcome};
use anyhow::{bail, Context};
use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut prompt = TermPrompt::new();
    match args.command {
        Command::Log { source, output } => {
            let config = RunConfig::from_args(&source, &args.workdir, &mut prompt)?;
            run_log(&config, output).map(|_| ())
        }
        Command::Monthly { source, reports_dir } => {
            let config = RunConfig::from_args(&source, &args.workdir, &mut prompt)?;
            let reports_dir = reports_dir.unwrap_or_else(|| config.reports_dir());
            run_monthly(&config, &reports_dir).map(|_| ())
        }
        Command::Sync { source } => {
            let config = RunConfig::from_args(&source, &args.workdir, &mut prompt)?;
            sync_working_copy(&config)?;
            println!("Working copy: {}", display_path(&config.checkout_path()));
            Ok(())
        }
    }
}

/// Clones or updates the working copy, or just checks it exists when offline.
pub fn sync_working_copy(config: &RunConfig) -> anyhow::Result<()> {
    let path = config.checkout_path();
    if config.offline {
        if !path.exists() {
            bail!("no working copy at {} to use offline", path.display());
        }
        info!("offline, using {} as is", path.display());
        return Ok(());
    }

    let outcome = synchronize(config.url.as_str(), &path, &config.credentials)
        .with_context(|| format!("Failed to clone or update {}", config.url))?;
    let message = match outcome {
        SyncOutcome::Cloned => "Repository cloned successfully!".to_string(),
        SyncOutcome::UpToDate { branch } => format!("Repository already up to date on {branch}."),
        SyncOutcome::Updated { branch, new_commits, .. } => {
            format!("Repository updated successfully: {new_commits} new commits on {branch}.")
        }
    };
    println!("{}", style(message).green());
    Ok(())
}

/// Writes the flat commit log. On failure the error text is written to the
/// log file in place of commits, then the error is returned.
pub fn run_log(config: &RunConfig, output: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let now = Local::now();
    let output = output
        .unwrap_or_else(|| report::log_path(&config.reports_dir(), config.url.name(), &now));
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let rendered = sync_working_copy(config).and_then(|()| {
        let history = History::open(&config.checkout_path(), config.date)?;
        let branch = history.resolve(config.branch.as_deref())?;
        let commits = history.commits_from(branch.target)?;
        Ok(report::render_log(&branch.name, commits, &Local)?)
    });

    match rendered {
        Ok((text, count)) => {
            fs::write(&output, &text)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print!("{text}");
            println!("\n{count} commits logged to: {}", display_path(&output));
            Ok(output)
        }
        Err(e) => {
            let message = format!("Error accessing the repository: {e:#}");
            if let Err(write_err) = fs::write(&output, &message) {
                warn!("could not record the error in {}: {write_err}", output.display());
            }
            Err(e)
        }
    }
}

pub struct MonthlyOutput {
    pub report: PathBuf,
    pub chart: Option<PathBuf>,
}

pub fn run_monthly(config: &RunConfig, reports_dir: &Path) -> anyhow::Result<MonthlyOutput> {
    sync_working_copy(config)?;
    let repo_name = config.url.name();

    let history = History::open(&config.checkout_path(), config.date)
        .context("Failed to open the working copy")?;
    let branch = history.resolve(config.branch.as_deref())?;

    println!("\nAnalyzing commits on {}...", branch.name);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {pos} commits read")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    let commits = history.commits_from(branch.target)?.inspect(|_| spinner.inc(1));
    let aggregate = MonthlyAggregate::from_commits(commits, &Local);
    spinner.finish_and_clear();
    let aggregate = aggregate?;

    fs::create_dir_all(reports_dir)
        .with_context(|| format!("Failed to create {}", reports_dir.display()))?;

    let chart_name = report::chart_file_name(repo_name);
    let chart = if aggregate.is_empty() {
        warn!("{} has no commits, skipping the chart", branch.name);
        None
    } else {
        println!("Generating chart...");
        let path = reports_dir.join(&chart_name);
        render_chart(
            &aggregate.monthly_counts(),
            &format!("Commits per month - {repo_name}"),
            &path,
        )
        .context("Failed to draw the chart")?;
        Some(path)
    };

    println!("Generating report...");
    let now = Local::now();
    let markdown = MarkdownReport {
        repo_name,
        branch: &branch.name,
        generated_at: now,
        chart: chart.as_ref().map(|_| chart_name.as_str()),
    }
    .render(&aggregate)?;

    let report_path = report::report_path(reports_dir, repo_name, &now);
    fs::write(&report_path, markdown)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    println!("\n{}", style("Report generated successfully!").green());
    println!("Report: {}", display_path(&report_path));
    if let Some(chart) = &chart {
        println!("Chart: {}", display_path(chart));
    }

    Ok(MonthlyOutput {
        report: report_path,
        chart,
    })
}

fn display_path(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
