use crate::config::{clamp_concurrency, ScrapeSettings};
use crate::domain::{plan_tasks, ScrapeTask};
use crate::responses::error_response;
use crate::router::{handle, AppState};
use crate::runs::{RunRegistry, RunnerFactory};
use crate::scraper::{
    AuctionScraper, ChromeBrowser, Coordinator, ProgressEvent, RunSummary, ScraperError, Strategy, TaskRunner,
};
use crate::spreadsheets::{export_filename, save_listings_csv, save_listings_xlsx, OutputMode};
use astra::Server;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::{error, info, warn};

mod config;
mod counties;
mod domain;
mod errors;
mod responses;
mod router;
mod runs;
mod scraper;
mod spreadsheets;
mod templates;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "auction_scraper", about = "Ohio sheriff-sale auction scraper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web UI.
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Scrape from the command line and write a spreadsheet.
    Scrape(ScrapeArgs),
}

#[derive(Args)]
struct ScrapeArgs {
    /// County slug or name; repeat for several counties.
    #[arg(long = "county", required = true)]
    counties: Vec<String>,

    /// First auction date, YYYY-MM-DD.
    #[arg(long)]
    from: NaiveDate,

    /// Last auction date (inclusive); defaults to --from.
    #[arg(long)]
    to: Option<NaiveDate>,

    #[arg(long)]
    concurrency: Option<usize>,

    /// auto, labeled or positional.
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Output file; defaults to auction_details_<dates>.<format>.
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Show the browser window.
    #[arg(long)]
    headful: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

fn main() -> ExitCode {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chromiumoxide=warn,tungstenite=warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let settings = match ScrapeSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Serve { bind } => serve(settings, bind),
        Command::Scrape(args) => scrape(settings, args),
    }
}

fn runner_for(settings: &ScrapeSettings) -> Result<Arc<dyn TaskRunner>, ScraperError> {
    let browser = ChromeBrowser::new(settings.headless, settings.chrome_executable.clone());
    let scraper = AuctionScraper::from_settings(browser, settings)?;
    Ok(Arc::new(scraper))
}

fn serve(settings: ScrapeSettings, bind: Option<String>) -> ExitCode {
    let bind = bind.unwrap_or_else(|| settings.bind_addr.clone());
    let addr: SocketAddr = match bind.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(%bind, "Invalid bind address: {e}");
            return ExitCode::FAILURE;
        }
    };

    let default_concurrency = settings.concurrency;
    let default_strategy = settings.strategy;
    let factory: Arc<RunnerFactory> =
        Arc::new(move |strategy: Strategy| -> Result<Arc<dyn TaskRunner>, ScraperError> {
            let mut settings = settings.clone();
            settings.strategy = strategy;
            runner_for(&settings)
        });
    let state = AppState {
        runs: RunRegistry::new(factory),
        default_concurrency,
        default_strategy,
    };

    info!("Starting server at http://{addr}");
    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => error_response(err),
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Server shut down cleanly.");
    ExitCode::SUCCESS
}

fn scrape(mut settings: ScrapeSettings, args: ScrapeArgs) -> ExitCode {
    let from = args.from;
    let to = args.to.unwrap_or(from);
    if from > to {
        error!(%from, %to, "--from is after --to");
        return ExitCode::FAILURE;
    }

    let counties = match counties::resolve_all(&args.counties) {
        Ok(slugs) => slugs,
        Err(county) => {
            error!(%county, "Unknown Ohio county");
            return ExitCode::FAILURE;
        }
    };

    if let Some(n) = args.concurrency {
        settings.concurrency = clamp_concurrency(n);
    }
    if let Some(strategy) = args.strategy {
        settings.strategy = strategy;
    }
    if args.headful {
        settings.headless = false;
    }

    let runner = match runner_for(&settings) {
        Ok(runner) => runner,
        Err(e) => {
            error!("Could not set up scraper: {e}");
            return ExitCode::FAILURE;
        }
    };

    let tasks = plan_tasks(&counties, from, to);
    let summary = run_with_progress(runner, tasks, settings.concurrency);

    let records = summary.records();
    let mode = OutputMode::for_run(counties.len(), from, to);
    let path = args
        .out
        .unwrap_or_else(|| PathBuf::from(export_filename(from, to, args.format.extension())));

    let saved = match args.format {
        ExportFormat::Csv => save_listings_csv(&path, &records, mode),
        ExportFormat::Xlsx => save_listings_xlsx(&path, &records, mode),
    };
    if let Err(e) = saved {
        error!(path = %path.display(), "{e}");
        return ExitCode::FAILURE;
    }

    info!(
        path = %path.display(),
        records = records.len(),
        failed = summary.failed(),
        "Export written"
    );
    ExitCode::SUCCESS
}

/// Runs the coordinator on its own thread and logs progress events as they arrive.
fn run_with_progress(runner: Arc<dyn TaskRunner>, tasks: Vec<ScrapeTask>, concurrency: usize) -> RunSummary {
    let (tx, rx) = mpsc::channel();
    let coordinator = Coordinator::new(runner, concurrency);
    let worker = thread::spawn(move || coordinator.run(tasks, Some(tx)));

    for event in rx {
        match event {
            ProgressEvent::Started { total } => info!(total, "Scraping"),
            ProgressEvent::TaskFinished {
                task,
                status,
                records,
                completed,
                total,
            } => {
                if status.is_failure() {
                    warn!("[{completed}/{total}] {task}: {status}");
                } else {
                    info!("[{completed}/{total}] {task}: {status} ({records} records)");
                }
            }
        }
    }

    worker.join().unwrap_or_else(|_| {
        error!("Coordinator thread panicked");
        RunSummary::default()
    })
}
