// src/model.rs

use chrono::{DateTime, Datelike, Month, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Which of a commit's two timestamps drives dates and month buckets.
#[derive(clap::ValueEnum, Clone, Debug, Copy, Default, PartialEq, Eq)]
pub enum TimestampSource {
    /// When the commit was recorded (what `git log` sorts on)
    #[default]
    Committer,
    /// When the change was originally authored
    Author,
}

/// A single commit as read from the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub author: String,
    pub email: String,
    pub time: DateTime<Utc>,
    pub message: String,
}

impl CommitRecord {
    pub fn month_in<Tz: TimeZone>(&self, tz: &Tz) -> YearMonth {
        YearMonth::of(&self.time.with_timezone(tz))
    }
}

/// A calendar month; orders chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        Self::new(time.year(), time.month())
    }

    fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("Unknown", |m| m.name())
    }

    /// "January 2024"
    pub fn long_label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    /// "Jan 2024"
    pub fn short_label(&self) -> String {
        format!("{} {}", &self.month_name()[..3], self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Per-author counts that remember first-seen order, so rankings break ties stably.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorTally {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl AuthorTally {
    pub fn record(&mut self, author: &str) {
        let slot = match self.index.get(author) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(author.to_string(), slot);
                self.entries.push((author.to_string(), 0));
                slot
            }
        };
        self.entries[slot].1 += 1;
    }

    pub fn get(&self, author: &str) -> usize {
        self.index.get(author).map_or(0, |&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descending by count; equal counts keep first-seen order.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .entries
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthBucket {
    pub commits: usize,
    pub authors: AuthorTally,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_commits: usize,
    pub first_month: Option<YearMonth>,
    pub last_month: Option<YearMonth>,
    pub contributors: usize,
}

/// Commit counts per month, per author, and per (month, author).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyAggregate {
    total: usize,
    months: BTreeMap<YearMonth, MonthBucket>,
    authors: AuthorTally,
}

impl MonthlyAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_in<Tz: TimeZone>(&mut self, commit: &CommitRecord, tz: &Tz) {
        let bucket = self.months.entry(commit.month_in(tz)).or_default();
        bucket.commits += 1;
        bucket.authors.record(&commit.author);
        self.authors.record(&commit.author);
        self.total += 1;
    }

    pub fn from_commits<I, E, Tz>(commits: I, tz: &Tz) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<CommitRecord, E>>,
        Tz: TimeZone,
    {
        let mut aggregate = Self::new();
        for commit in commits {
            aggregate.record_in(&commit?, tz);
        }
        Ok(aggregate)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn authors(&self) -> &AuthorTally {
        &self.authors
    }

    pub fn month(&self, month: YearMonth) -> Option<&MonthBucket> {
        self.months.get(&month)
    }

    /// Months in chronological order.
    pub fn months(&self) -> impl Iterator<Item = (YearMonth, &MonthBucket)> {
        self.months.iter().map(|(month, bucket)| (*month, bucket))
    }

    pub fn monthly_counts(&self) -> Vec<(YearMonth, usize)> {
        self.months().map(|(month, bucket)| (month, bucket.commits)).collect()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_commits: self.total,
            first_month: self.months.keys().next().copied(),
            last_month: self.months.keys().next_back().copied(),
            contributors: self.authors.len(),
        }
    }
}
