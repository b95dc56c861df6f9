pub mod listing;
pub mod task;

pub use listing::{ListingFields, ListingRecord, Section};
pub use task::{plan_tasks, ScrapeResult, ScrapeTask, SectionStatus, TaskReport, TaskStatus};
