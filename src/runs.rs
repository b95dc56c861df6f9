// runs.rs
//
// Background scrape runs started from the web UI. Each run gets a driver
// thread that owns the coordinator's progress channel; it is the only writer
// of that run's view, request handlers only read snapshots. Only the most
// recent finished runs are kept; running ones are never dropped.

use crate::config::clamp_concurrency;
use crate::counties;
use crate::domain::{plan_tasks, ListingRecord, ScrapeTask};
use crate::errors::ServerError;
use crate::scraper::{Coordinator, ProgressEvent, RunSummary, ScraperError, Strategy, TaskRunner};
use crate::spreadsheets::OutputMode;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use tracing::{error, info};

pub const MAX_RANGE_DAYS: i64 = 31;
const LOG_LINES: usize = 50;
const MAX_FINISHED_RUNS: usize = 20;

/// Builds the task runner for a run, given the extraction strategy picked in the form.
pub type RunnerFactory = dyn Fn(Strategy) -> Result<Arc<dyn TaskRunner>, ScraperError> + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub counties: Vec<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub concurrency: usize,
    pub strategy: Strategy,
}

impl RunRequest {
    /// Checks the request and normalizes county names to site slugs.
    pub fn validated(mut self) -> Result<Self, ServerError> {
        if self.counties.is_empty() {
            return Err(ServerError::BadRequest("Select at least one county".into()));
        }
        self.counties = counties::resolve_all(&self.counties)
            .map_err(|county| ServerError::BadRequest(format!("Unknown county: {county}")))?;

        if self.from > self.to {
            return Err(ServerError::BadRequest("Start date is after end date".into()));
        }
        let days = (self.to - self.from).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(ServerError::BadRequest(format!(
                "Date range is {days} days; at most {MAX_RANGE_DAYS} allowed"
            )));
        }
        self.concurrency = clamp_concurrency(self.concurrency);
        Ok(self)
    }

    pub fn output_mode(&self) -> OutputMode {
        OutputMode::for_run(self.counties.len(), self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Finished,
    /// The coordinator itself died; no results are available.
    Crashed,
}

/// Snapshot of one run, as the run page renders it.
#[derive(Debug, Clone)]
pub struct RunView {
    pub id: u64,
    pub request: RunRequest,
    pub state: RunState,
    pub total: usize,
    pub completed: usize,
    pub log: VecDeque<String>,
    pub summary: Option<RunSummary>,
}

impl RunView {
    fn new(id: u64, request: RunRequest, total: usize) -> Self {
        Self {
            id,
            request,
            state: RunState::Running,
            total,
            completed: 0,
            log: VecDeque::new(),
            summary: None,
        }
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() == LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }

    fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                self.total = total;
                self.push_log(format!("Started {total} tasks"));
            }
            ProgressEvent::TaskFinished {
                task,
                status,
                records,
                completed,
                total,
            } => {
                self.completed = self.completed.max(completed);
                self.total = total;
                self.push_log(format!("{task}: {status} ({records} records)"));
            }
        }
    }

    pub fn records(&self) -> Vec<ListingRecord> {
        self.summary.as_ref().map(RunSummary::records).unwrap_or_default()
    }
}

#[derive(Default)]
struct RunTable {
    views: HashMap<u64, RunView>,
    /// Ids of runs that left `Running`, oldest first.
    finished: VecDeque<u64>,
}

impl RunTable {
    fn retire(&mut self, id: u64, history: usize) {
        self.finished.push_back(id);
        while self.finished.len() > history {
            if let Some(old) = self.finished.pop_front() {
                self.views.remove(&old);
                info!(run = old, "Run dropped from history");
            }
        }
    }
}

#[derive(Clone)]
pub struct RunRegistry {
    next_id: Arc<AtomicU64>,
    runs: Arc<Mutex<RunTable>>,
    factory: Arc<RunnerFactory>,
    history: usize,
}

impl RunRegistry {
    pub fn new(factory: Arc<RunnerFactory>) -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(1)),
            runs: Arc::new(Mutex::new(RunTable::default())),
            factory,
            history: MAX_FINISHED_RUNS,
        }
    }

    /// Keeps at most `history` finished runs (at least one).
    #[cfg(test)]
    pub fn with_history(mut self, history: usize) -> Self {
        self.history = history.max(1);
        self
    }

    fn runs(&self) -> MutexGuard<'_, RunTable> {
        self.runs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, id: u64) -> Option<RunView> {
        self.runs().views.get(&id).cloned()
    }

    /// Starts the run in the background and returns its id immediately.
    pub fn start(&self, request: RunRequest) -> Result<u64, ServerError> {
        let runner = (self.factory)(request.strategy).map_err(|e| {
            error!("Could not build scraper: {e}");
            ServerError::InternalError
        })?;

        let tasks = plan_tasks(&request.counties, request.from, request.to);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let concurrency = request.concurrency;
        info!(run = id, tasks = tasks.len(), concurrency, "Run queued");
        self.runs().views.insert(id, RunView::new(id, request, tasks.len()));

        let registry = self.clone();
        thread::Builder::new()
            .name(format!("run-{id}"))
            .spawn(move || registry.drive(id, runner, tasks, concurrency))
            .map_err(|e| {
                error!("Could not spawn run thread: {e}");
                ServerError::InternalError
            })?;

        Ok(id)
    }

    fn drive(&self, id: u64, runner: Arc<dyn TaskRunner>, tasks: Vec<ScrapeTask>, concurrency: usize) {
        let (tx, rx) = mpsc::channel();
        let coordinator = Coordinator::new(runner, concurrency);
        let worker = thread::spawn(move || coordinator.run(tasks, Some(tx)));

        for event in rx {
            if let Some(view) = self.runs().views.get_mut(&id) {
                view.apply(event);
            }
        }

        let outcome = worker.join();
        let mut runs = self.runs();
        let Some(view) = runs.views.get_mut(&id) else {
            return;
        };
        match outcome {
            Ok(summary) => {
                view.push_log(format!(
                    "Finished: {} records, {} failed tasks",
                    summary.records().len(),
                    summary.failed()
                ));
                view.summary = Some(summary);
                view.state = RunState::Finished;
            }
            Err(_) => {
                error!(run = id, "Coordinator thread panicked");
                view.push_log("Run crashed".to_string());
                view.state = RunState::Crashed;
            }
        }
        runs.retire(id, self.history);
    }

    /// Blocks until the run leaves `Running`.
    #[cfg(test)]
    pub fn wait(&self, id: u64) -> Option<RunView> {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        loop {
            let view = self.get(id)?;
            if view.state != RunState::Running || std::time::Instant::now() > deadline {
                return Some(view);
            }
            thread::sleep(std::time::Duration::from_millis(10));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListingFields, Section, SectionStatus, TaskReport};
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    struct OneRecord;

    impl TaskRunner for OneRecord {
        fn run(&self, task: &ScrapeTask) -> Result<TaskReport, ScraperError> {
            if task.county == "lake" {
                return Err(ScraperError::Blocked("Access Denied".into()));
            }
            Ok(TaskReport {
                sections: vec![(Section::Waiting, SectionStatus::Paged { pages_read: 1, max_pages: 1 })],
                records: vec![ListingRecord::new(&task.county, task.date, Section::Waiting, ListingFields::default())],
            })
        }
    }

    /// Holds every "lake" task until released; other tasks finish at once.
    struct HeldLake(Arc<AtomicBool>);

    impl TaskRunner for HeldLake {
        fn run(&self, task: &ScrapeTask) -> Result<TaskReport, ScraperError> {
            while task.county == "lake" && !self.0.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(5));
            }
            OneRecord.run(&ScrapeTask::new("franklin", task.date))
        }
    }

    fn one_record(_: Strategy) -> Result<Arc<dyn TaskRunner>, ScraperError> {
        Ok(Arc::new(OneRecord))
    }

    fn registry() -> RunRegistry {
        RunRegistry::new(Arc::new(one_record))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
    }

    fn request(counties: &[&str], from: u32, to: u32) -> RunRequest {
        RunRequest {
            counties: counties.iter().map(|c| c.to_string()).collect(),
            from: day(from),
            to: day(to),
            concurrency: 2,
            strategy: Strategy::Auto,
        }
    }

    #[test]
    fn validation_rejects_bad_requests() {
        assert!(request(&[], 1, 1).validated().is_err());
        assert!(request(&["franklin"], 5, 4).validated().is_err());
        assert!(request(&["narnia"], 1, 1).validated().is_err());

        let long = RunRequest {
            to: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            ..request(&["franklin"], 1, 1)
        };
        assert!(long.validated().is_err());
    }

    #[test]
    fn validation_normalizes_counties() {
        let ok = request(&["Van Wert", "vanwert", "FRANKLIN"], 1, 31).validated().unwrap();
        assert_eq!(ok.counties, vec!["vanwert", "franklin"]);
        assert_eq!(ok.output_mode(), OutputMode::Multi);
    }

    #[test]
    fn run_completes_and_keeps_partial_results() {
        let registry = registry();
        let id = registry
            .start(request(&["franklin", "lake", "summit"], 1, 2).validated().unwrap())
            .unwrap();

        let view = registry.wait(id).unwrap();

        assert_eq!(view.state, RunState::Finished);
        assert_eq!(view.total, 6);
        assert_eq!(view.completed, 6);
        assert_eq!(view.records().len(), 4);
        assert_eq!(view.summary.as_ref().unwrap().failed(), 2);
        assert!(view.log.iter().any(|l| l.starts_with("lake 10/01/2024: failed")));
    }

    #[test]
    fn finished_runs_are_dropped_oldest_first() {
        let released = Arc::new(AtomicBool::new(false));
        let runner: Arc<dyn TaskRunner> = Arc::new(HeldLake(released.clone()));
        let factory = move |_: Strategy| -> Result<Arc<dyn TaskRunner>, ScraperError> { Ok(runner.clone()) };
        let registry = RunRegistry::new(Arc::new(factory)).with_history(2);

        let held = registry.start(request(&["lake"], 1, 1)).unwrap();
        let quick: Vec<u64> = (0..3)
            .map(|_| {
                let id = registry.start(request(&["franklin"], 1, 1)).unwrap();
                assert_eq!(registry.wait(id).unwrap().state, RunState::Finished);
                id
            })
            .collect();

        assert!(registry.get(quick[0]).is_none());
        assert!(registry.get(quick[1]).is_some());
        assert!(registry.get(quick[2]).is_some());
        assert_eq!(registry.get(held).unwrap().state, RunState::Running);

        released.store(true, Ordering::SeqCst);
        assert_eq!(registry.wait(held).unwrap().state, RunState::Finished);

        assert!(registry.get(quick[1]).is_none());
        assert!(registry.get(quick[2]).is_some());
        assert_eq!(registry.runs().views.len(), 2);
    }

    #[test]
    fn unknown_run_is_none() {
        assert!(registry().get(42).is_none());
    }
}
