// src/report/mod.rs

pub mod log;
pub mod markdown;

pub use self::log::render_log;
pub use markdown::MarkdownReport;

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn log_path(reports_dir: &Path, repo_name: &str, now: &DateTime<Local>) -> PathBuf {
    reports_dir.join(format!("commits_log_{repo_name}_{}.txt", now.format(STAMP_FORMAT)))
}

pub fn report_path(reports_dir: &Path, repo_name: &str, now: &DateTime<Local>) -> PathBuf {
    reports_dir.join(format!("commit_report_{repo_name}_{}.md", now.format(STAMP_FORMAT)))
}

pub fn chart_file_name(repo_name: &str) -> String {
    format!("commits_monthly_{repo_name}.png")
}
