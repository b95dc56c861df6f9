// coordinator.rs
//
// Fans (county, date) tasks out over a fixed pool of worker threads. Workers
// share nothing but the task queue and the aggregate; progress leaves through
// a channel so the presentation layer never touches worker state.

use crate::domain::{ListingRecord, ScrapeResult, ScrapeTask, TaskReport, TaskStatus};
use crate::scraper::ScraperError;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, info, warn};

/// Anything that can execute one task. Implementations must tolerate being
/// called from several threads at once.
pub trait TaskRunner: Send + Sync {
    fn run(&self, task: &ScrapeTask) -> Result<TaskReport, ScraperError>;
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { total: usize },
    TaskFinished {
        task: ScrapeTask,
        status: TaskStatus,
        records: usize,
        completed: usize,
        total: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Sorted by county, then date.
    pub results: Vec<ScrapeResult>,
}

impl RunSummary {
    /// All records of successful tasks, in result order.
    pub fn records(&self) -> Vec<ListingRecord> {
        self.results
            .iter()
            .filter(|r| r.status == TaskStatus::Listings)
            .flat_map(|r| r.records.iter().cloned())
            .collect()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failure()).count()
    }
}

#[derive(Default)]
struct Aggregate {
    completed: usize,
    results: Vec<ScrapeResult>,
}

pub struct Coordinator<R: TaskRunner + ?Sized> {
    runner: Arc<R>,
    concurrency: usize,
}

impl<R: TaskRunner + ?Sized> Coordinator<R> {
    pub fn new(runner: Arc<R>, concurrency: usize) -> Self {
        Self {
            runner,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs every task exactly once and blocks until all are done.
    /// A failing or panicking task is recorded and never stops its siblings.
    pub fn run(&self, tasks: Vec<ScrapeTask>, progress: Option<Sender<ProgressEvent>>) -> RunSummary {
        let total = tasks.len();
        let workers = self.concurrency.min(total);
        info!(total, workers, "Starting scrape run");
        emit(&progress, ProgressEvent::Started { total });

        let queue = Mutex::new(VecDeque::from(tasks));
        let aggregate = Mutex::new(Aggregate::default());

        thread::scope(|scope| {
            for worker in 0..workers {
                let queue = &queue;
                let aggregate = &aggregate;
                let progress = progress.clone();
                let runner = Arc::clone(&self.runner);

                scope.spawn(move || loop {
                    let next = lock(queue).pop_front();
                    let Some(task) = next else {
                        break;
                    };
                    debug!(worker, task = %task, "Worker picked up task");

                    let result = execute(runner.as_ref(), task);

                    let mut agg = lock(aggregate);
                    agg.completed += 1;
                    emit(
                        &progress,
                        ProgressEvent::TaskFinished {
                            task: result.task.clone(),
                            status: result.status.clone(),
                            records: result.records.len(),
                            completed: agg.completed,
                            total,
                        },
                    );
                    agg.results.push(result);
                    drop(agg);
                });
            }
        });

        let mut results = aggregate
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .results;
        results.sort_by(|a, b| a.task.cmp(&b.task));

        let summary = RunSummary { results };
        info!(
            total,
            failed = summary.failed(),
            records = summary.records().len(),
            "Scrape run finished"
        );
        summary
    }
}

fn execute<R: TaskRunner + ?Sized>(runner: &R, task: ScrapeTask) -> ScrapeResult {
    match panic::catch_unwind(AssertUnwindSafe(|| runner.run(&task))) {
        Ok(Ok(report)) => ScrapeResult::from_report(task, report),
        Ok(Err(e)) => {
            warn!(task = %task, "Task failed: {e}");
            ScrapeResult::failed(task, e.to_string())
        }
        Err(_) => {
            warn!(task = %task, "Task panicked");
            ScrapeResult::failed(task, "task panicked")
        }
    }
}

fn emit(progress: &Option<Sender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = progress {
        // A consumer that went away only loses progress, not results.
        let _ = tx.send(event);
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
