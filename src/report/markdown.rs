// src/report/markdown.rs

use crate::error::Result;
use crate::model::{AuthorTally, MonthlyAggregate};
use chrono::{DateTime, Local};
use std::fmt::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Commits")]
    commits: usize,
}

#[derive(Tabled)]
struct AuthorRow {
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Commits")]
    commits: usize,
}

fn markdown_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    table.to_string()
}

/// A bare `|` would start a new column.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn author_table(tally: &AuthorTally) -> String {
    let rows = tally
        .ranked()
        .into_iter()
        .map(|(author, commits)| AuthorRow {
            author: escape_cell(author),
            commits,
        })
        .collect();
    markdown_table::<AuthorRow>(rows)
}

pub struct MarkdownReport<'a> {
    pub repo_name: &'a str,
    pub branch: &'a str,
    pub generated_at: DateTime<Local>,
    /// Chart file name relative to the report, when one was drawn.
    pub chart: Option<&'a str>,
}

impl MarkdownReport<'_> {
    pub fn render(&self, aggregate: &MonthlyAggregate) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "# Commit report - {}\n", self.repo_name)?;
        writeln!(
            out,
            "Generated at: {}\n",
            self.generated_at.format(super::log::DATE_FORMAT)
        )?;
        writeln!(out, "Branch: `{}`\n", self.branch)?;

        let summary = aggregate.summary();
        writeln!(out, "## Summary\n")?;
        writeln!(out, "- Total commits: {}", summary.total_commits)?;
        match (summary.first_month, summary.last_month) {
            (Some(first), Some(last)) => writeln!(out, "- Period analysed: {first} to {last}")?,
            _ => writeln!(out, "- Period analysed: n/a")?,
        }
        writeln!(out, "- Total contributors: {}\n", summary.contributors)?;

        if aggregate.is_empty() {
            writeln!(out, "No commits found on this branch.")?;
            return Ok(out);
        }

        writeln!(out, "## Commits per month\n")?;
        let months = aggregate
            .months()
            .map(|(month, bucket)| MonthRow {
                month: month.long_label(),
                commits: bucket.commits,
            })
            .collect();
        writeln!(out, "{}\n", markdown_table::<MonthRow>(months))?;

        writeln!(out, "## Commits per author\n")?;
        writeln!(out, "{}\n", author_table(aggregate.authors()))?;

        writeln!(out, "## Monthly breakdown by author\n")?;
        for (month, bucket) in aggregate.months() {
            writeln!(out, "### {}\n", month.long_label())?;
            writeln!(out, "{}\n", author_table(&bucket.authors))?;
        }

        if let Some(chart) = self.chart {
            writeln!(out, "## Chart\n")?;
            writeln!(out, "![Commits per month]({chart})")?;
        }

        Ok(out)
    }
}
