// src/report/log.rs

use crate::error::Result;
use crate::model::CommitRecord;
use chrono::TimeZone;
use std::fmt::Write;

pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Renders the flat commit log for `branch`, newest first as the walk yields.
///
/// Stops at the first commit that fails to load so a half-written log is
/// never mistaken for a complete one. Returns the text and the commit count.
pub fn render_log<I, Tz>(branch: &str, commits: I, tz: &Tz) -> Result<(String, usize)>
where
    I: IntoIterator<Item = Result<CommitRecord>>,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    writeln!(out, "\nCommit log for branch {branch}\n")?;
    writeln!(out, "{}", "=".repeat(50))?;

    let mut count = 0;
    for commit in commits {
        let commit = commit?;
        writeln!(out, "Commit: {}", commit.id)?;
        writeln!(out, "Author: {}", commit.author)?;
        writeln!(out, "Date: {}", commit.time.with_timezone(tz).format(DATE_FORMAT))?;
        writeln!(out, "Message: {}", commit.message.trim())?;
        writeln!(out, "{}\n", "-".repeat(50))?;
        count += 1;
    }

    Ok((out, count))
}
