use crate::errors::ServerError;
use crate::router::handle;
use crate::scraper::testing::FakeBrowser;
use crate::tests::utils::{fake_site, read_body, read_bytes, test_state};
use astra::Body;
use http::{Method, Request};

fn request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body.as_bytes().to_vec()))
        .unwrap()
}

fn header(resp: &astra::Response, name: &str) -> String {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[test]
fn single_county_single_date_exports_single_columns() {
    let state = test_state(FakeBrowser::new(fake_site()));
    handle(request(Method::POST, "/runs", "from=2024-10-18&county=franklin"), &state).unwrap();
    state.runs.wait(1).unwrap();

    let resp = handle(request(Method::GET, "/runs/1/export.csv", ""), &state).unwrap();

    assert_eq!(resp.status(), 200);
    assert!(header(&resp, "Content-Type").starts_with("text/csv"));
    assert_eq!(
        header(&resp, "Content-Disposition"),
        "attachment; filename=\"auction_details_20241018.csv\""
    );

    let csv = read_body(resp);
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Case Status,Case #,Parcel ID,Property Address,City,ZIP,Appraised Value,Opening Bid,Deposit Requirement"
    );
    let first = lines.next().unwrap();
    assert!(first.starts_with("ACTIVE,W-1-0,000000010,123 MAIN ST,COLUMBUS,43215,"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn multi_county_run_exports_xlsx_with_range_name() {
    let state = test_state(FakeBrowser::new(fake_site()));
    handle(
        request(Method::POST, "/runs", "from=2024-10-18&to=2024-10-20&county=franklin&county=summit"),
        &state,
    )
    .unwrap();
    state.runs.wait(1).unwrap();

    let resp = handle(request(Method::GET, "/runs/1/export.xlsx", ""), &state).unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        header(&resp, "Content-Type"),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        header(&resp, "Content-Disposition"),
        "attachment; filename=\"auction_details_20241018_20241020.xlsx\""
    );
    assert!(read_bytes(resp).starts_with(b"PK"));
}

#[test]
fn multi_run_csv_carries_context_columns() {
    let state = test_state(FakeBrowser::new(fake_site()));
    handle(
        request(Method::POST, "/runs", "from=2024-10-18&county=franklin&county=lake"),
        &state,
    )
    .unwrap();
    state.runs.wait(1).unwrap();

    let csv = read_body(handle(request(Method::GET, "/runs/1/export.csv", ""), &state).unwrap());
    let mut lines = csv.lines();

    assert!(lines
        .next()
        .unwrap()
        .ends_with("Deposit Requirement,Auction Starts,County,Section,Auction Date"));
    let first = lines.next().unwrap();
    assert!(first.ends_with("10/18/2024 09:00 AM ET,franklin,Waiting,10/18/2024"));
    assert_eq!(lines.count(), 7);
}

#[test]
fn export_of_unknown_run_is_not_found() {
    let state = test_state(FakeBrowser::default());
    let err = handle(request(Method::GET, "/runs/7/export.csv", ""), &state).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));
}
