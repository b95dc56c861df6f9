// src/domain/task.rs

use crate::domain::listing::{ListingRecord, Section};
use chrono::NaiveDate;
use std::fmt;

/// One (county, date) pair, scraped independently of every other task.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScrapeTask {
    pub county: String,
    pub date: NaiveDate,
}

impl ScrapeTask {
    pub fn new(county: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            county: county.into(),
            date,
        }
    }
}

impl fmt::Display for ScrapeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.county, self.date.format("%m/%d/%Y"))
    }
}

/// Cartesian product of counties and the inclusive day range `from..=to`.
/// Counties are deduplicated and kept in the order given.
pub fn plan_tasks(counties: &[String], from: NaiveDate, to: NaiveDate) -> Vec<ScrapeTask> {
    let mut seen = Vec::new();
    for county in counties {
        let county = county.trim().to_ascii_lowercase();
        if !county.is_empty() && !seen.contains(&county) {
            seen.push(county);
        }
    }

    let days: Vec<NaiveDate> = from.iter_days().take_while(|d| *d <= to).collect();

    seen.iter()
        .flat_map(|county| days.iter().map(move |day| ScrapeTask::new(county.clone(), *day)))
        .collect()
}

/// How one section of a preview page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    /// The page-count indicator was absent or unreadable.
    IndicatorMissing,
    /// The indicator was present but the first page had no listing blocks.
    NoListings,
    /// `pages_read < max_pages` means the walk stopped early.
    Paged { pages_read: u32, max_pages: u32 },
}

/// Outcome of a whole task, keeping "nothing listed" apart from
/// "nothing recognizable on the page".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Listings,
    NoListings,
    LayoutUnrecognized,
    Failed(String),
}

impl TaskStatus {
    pub fn label(&self) -> &str {
        match self {
            TaskStatus::Listings => "ok",
            TaskStatus::NoListings => "no listings",
            TaskStatus::LayoutUnrecognized => "layout not recognized",
            TaskStatus::Failed(_) => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskStatus::Failed(_))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Failed(msg) => write!(f, "failed: {msg}"),
            other => f.write_str(other.label()),
        }
    }
}

/// What a runner reports for a task that got as far as reading the page.
#[derive(Debug, Clone, Default)]
pub struct TaskReport {
    pub sections: Vec<(Section, SectionStatus)>,
    pub records: Vec<ListingRecord>,
}

impl TaskReport {
    pub fn status(&self) -> TaskStatus {
        if !self.records.is_empty() {
            return TaskStatus::Listings;
        }
        let any_indicator = self
            .sections
            .iter()
            .any(|(_, status)| *status != SectionStatus::IndicatorMissing);
        if any_indicator {
            TaskStatus::NoListings
        } else {
            TaskStatus::LayoutUnrecognized
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub task: ScrapeTask,
    pub status: TaskStatus,
    pub sections: Vec<(Section, SectionStatus)>,
    pub records: Vec<ListingRecord>,
}

impl ScrapeResult {
    pub fn from_report(task: ScrapeTask, report: TaskReport) -> Self {
        let status = report.status();
        Self {
            task,
            status,
            sections: report.sections,
            records: report.records,
        }
    }

    pub fn failed(task: ScrapeTask, message: impl Into<String>) -> Self {
        Self {
            task,
            status: TaskStatus::Failed(message.into()),
            sections: Vec::new(),
            records: Vec::new(),
        }
    }
}
