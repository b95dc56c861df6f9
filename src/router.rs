use crate::errors::ServerError;
use crate::responses::{csv_response, html_response, redirect_response, xlsx_response, ResultResp};
use crate::runs::{RunRegistry, RunRequest, RunState, RunView};
use crate::scraper::Strategy;
use crate::spreadsheets::{export_filename, export_listings_csv, export_listings_xlsx};
use crate::templates;
use astra::Request;
use chrono::{Local, NaiveDate};
use std::io::Read;

/// What every request handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub runs: RunRegistry,
    pub default_concurrency: usize,
    pub default_strategy: Strategy,
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", [""]) => html_response(templates::pages::home_page(
            state.default_concurrency,
            state.default_strategy,
            Local::now().date_naive(),
        )),
        ("POST", ["runs"]) => start_run(req, state),
        ("GET", ["runs", id]) => {
            let view = find_run(state, id)?;
            html_response(templates::pages::run_page(&view))
        }
        ("GET", ["runs", id, "export.csv"]) => {
            let view = finished_run(state, id)?;
            let buffer = export_listings_csv(&view.records(), view.request.output_mode())?;
            csv_response(buffer, &export_filename(view.request.from, view.request.to, "csv"))
        }
        ("GET", ["runs", id, "export.xlsx"]) => {
            let view = finished_run(state, id)?;
            let buffer = export_listings_xlsx(&view.records(), view.request.output_mode())?;
            xlsx_response(buffer, &export_filename(view.request.from, view.request.to, "xlsx"))
        }
        _ => Err(ServerError::NotFound),
    }
}

fn start_run(req: Request, state: &AppState) -> ResultResp {
    let form = read_form(req)?;
    let request = parse_run_form(&form, state.default_concurrency, state.default_strategy)?.validated()?;
    let id = state.runs.start(request)?;
    redirect_response(&format!("/runs/{id}"))
}

fn find_run(state: &AppState, id: &str) -> Result<RunView, ServerError> {
    let id: u64 = id.parse().map_err(|_| ServerError::NotFound)?;
    state.runs.get(id).ok_or(ServerError::NotFound)
}

fn finished_run(state: &AppState, id: &str) -> Result<RunView, ServerError> {
    let view = find_run(state, id)?;
    if view.state != RunState::Finished {
        return Err(ServerError::BadRequest("Run has not finished yet".into()));
    }
    Ok(view)
}

fn read_form(req: Request) -> Result<Vec<(String, String)>, ServerError> {
    let mut body = Vec::new();
    req.into_body()
        .reader()
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("Unreadable form body: {e}")))?;

    Ok(url::form_urlencoded::parse(&body).into_owned().collect())
}

/// Form fields: `from`, `to` (YYYY-MM-DD), repeated `county`, `concurrency`, `strategy`.
/// Missing `concurrency` and `strategy` fall back to the server's configured defaults.
fn parse_run_form(
    form: &[(String, String)],
    default_concurrency: usize,
    default_strategy: Strategy,
) -> Result<RunRequest, ServerError> {
    let field = |name: &str| {
        form.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    };
    let date = |name: &str| -> Result<NaiveDate, ServerError> {
        let raw = field(name).ok_or_else(|| ServerError::BadRequest(format!("Missing {name} date")))?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ServerError::BadRequest(format!("Invalid {name} date: {raw}")))
    };

    let from = date("from")?;
    let to = match field("to") {
        Some(_) => date("to")?,
        None => from,
    };

    let counties = form
        .iter()
        .filter(|(k, v)| k == "county" && !v.trim().is_empty())
        .map(|(_, v)| v.trim().to_string())
        .collect();

    let concurrency = match field("concurrency") {
        Some(raw) => raw
            .parse()
            .map_err(|_| ServerError::BadRequest(format!("Invalid concurrency: {raw}")))?,
        None => default_concurrency,
    };
    let strategy = match field("strategy") {
        Some(raw) => raw
            .parse::<Strategy>()
            .map_err(|_| ServerError::BadRequest(format!("Invalid strategy: {raw}")))?,
        None => default_strategy,
    };

    Ok(RunRequest {
        counties,
        from,
        to,
        concurrency,
        strategy,
    })
}
