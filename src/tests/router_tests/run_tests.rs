use crate::errors::ServerError;
use crate::router::handle;
use crate::runs::RunState;
use crate::scraper::testing::FakeBrowser;
use crate::scraper::Strategy;
use crate::tests::utils::{fake_site, read_body, test_state, test_state_with};
use astra::Body;
use http::{Method, Request};

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/runs")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body.as_bytes().to_vec()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[test]
fn home_page_offers_run_form() {
    let state = test_state(FakeBrowser::new(fake_site()));

    let resp = handle(get("/"), &state).expect("Failed to handle request");

    assert_eq!(resp.status(), 200);
    let body = read_body(resp);
    assert!(body.contains("<form action=\"/runs\" method=\"post\">"));
    assert!(body.contains("value=\"vanwert\""));
    assert!(body.contains("Van Wert"));
    assert!(body.contains("name=\"concurrency\""));
}

#[test]
fn configured_strategy_is_the_form_default() {
    let state = test_state_with(FakeBrowser::new(fake_site()), Strategy::PositionalLines);

    let home = read_body(handle(get("/"), &state).unwrap());
    assert!(home.contains("<option value=\"positional\" selected>"));
    assert!(!home.contains("<option value=\"auto\" selected>"));

    handle(post_form("from=2024-10-18&county=lake"), &state).unwrap();
    let view = state.runs.wait(1).unwrap();
    assert_eq!(view.request.strategy, Strategy::PositionalLines);
    assert!(read_body(handle(get("/runs/1"), &state).unwrap()).contains(" · positional"));
}

#[test]
fn unknown_path_is_not_found() {
    let state = test_state(FakeBrowser::default());
    let err = handle(get("/nope"), &state).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));
}

#[test]
fn unknown_run_is_not_found() {
    let state = test_state(FakeBrowser::default());
    assert!(matches!(handle(get("/runs/99"), &state), Err(ServerError::NotFound)));
    assert!(matches!(handle(get("/runs/abc"), &state), Err(ServerError::NotFound)));
}

#[test]
fn invalid_forms_are_bad_requests() {
    let state = test_state(FakeBrowser::default());

    for body in [
        "from=2024-10-18&to=2024-10-18",
        "from=2024-10-19&to=2024-10-18&county=franklin",
        "from=2024-10-01&to=2024-11-15&county=franklin",
        "from=2024-10-18&county=atlantis",
        "county=franklin",
    ] {
        let err = handle(post_form(body), &state).unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)), "{body}: {err}");
    }
}

#[test]
fn run_redirects_then_shows_results() {
    let browser = FakeBrowser::new(fake_site());
    let state = test_state(browser.clone());

    let resp = handle(
        post_form("from=2024-10-18&to=2024-10-19&county=franklin&county=Van+Wert&concurrency=2&strategy=auto"),
        &state,
    )
    .expect("Failed to start run");

    assert_eq!(resp.status(), 303);
    let location = resp
        .headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert_eq!(location, "/runs/1");

    let view = state.runs.wait(1).unwrap();
    assert_eq!(view.state, RunState::Finished);
    assert_eq!(view.total, 4);
    assert_eq!(view.completed, 4);
    assert_eq!(view.records().len(), 16);

    let log = browser.log();
    assert_eq!(log.opened, 4);
    assert_eq!(log.closed, 4);
    assert!(log
        .urls
        .iter()
        .any(|u| u.starts_with("https://vanwert.sheriffsaleauction.ohio.gov/") && u.ends_with("AUCTIONDATE=10/19/2024")));
    drop(log);

    let page = read_body(handle(get(&location), &state).unwrap());
    assert!(page.contains("Finished."));
    assert!(page.contains("Franklin, Van Wert"));
    assert!(page.contains("<td>Van Wert</td>"));
    assert!(page.contains("W-2-0"));
    assert!(page.contains("/runs/1/export.xlsx"));
    assert!(!page.contains("http-equiv=\"refresh\""));
}

#[test]
fn empty_site_reports_layout_not_recognized() {
    let state = test_state(FakeBrowser::default());

    handle(post_form("from=2024-10-18&county=lake"), &state).unwrap();
    let view = state.runs.wait(1).unwrap();

    let summary = view.summary.unwrap();
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].status.label(), "layout not recognized");

    let page = read_body(handle(get("/runs/1"), &state).unwrap());
    assert!(page.contains("No listings found."));
}
