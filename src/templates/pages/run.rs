// templates/pages/run.rs

use crate::counties;
use crate::domain::{ScrapeResult, SectionStatus};
use crate::runs::{RunState, RunView};
use crate::templates::components::progress_bar;
use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

const REFRESH_SECS: u32 = 2;

pub fn run_page(view: &RunView) -> Markup {
    let refresh = (view.state == RunState::Running).then_some(REFRESH_SECS);
    let req = &view.request;
    let names: Vec<&str> = req.counties.iter().map(|slug| county_name(slug)).collect();

    desktop_layout(
        &format!("Run #{}", view.id),
        refresh,
        html! {
            h1 { "Run #" (view.id) }
            p {
                (names.join(", ")) " · "
                (req.from.format("%m/%d/%Y")) " – " (req.to.format("%m/%d/%Y"))
                " · " (req.concurrency) " browsers · " (req.strategy)
            }

            (card("Progress", html! {
                (progress_bar(view.completed, view.total))
                @match view.state {
                    RunState::Running => p { "Running…" },
                    RunState::Finished => p { "Finished." },
                    RunState::Crashed => p class="status-failed" { "The run stopped unexpectedly. No results are available." },
                }
                div class="log" {
                    @for line in &view.log {
                        div { (line) }
                    }
                }
            }))

            @if let Some(summary) = &view.summary {
                (card("Tasks", task_table(&summary.results)))
                (results_card(view))
            }
        },
    )
}

fn task_table(results: &[ScrapeResult]) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "County" }
                    th { "Date" }
                    th { "Status" }
                    th { "Records" }
                    th { "Sections" }
                }
            }
            tbody {
                @for result in results {
                    tr {
                        td { (county_name(&result.task.county)) }
                        td { (result.task.date.format("%m/%d/%Y")) }
                        @if result.status.is_failure() {
                            td class="status-failed" { (result.status) }
                        } @else {
                            td { (result.status) }
                        }
                        td { (result.records.len()) }
                        td {
                            @for (section, status) in &result.sections {
                                (section) ": " (section_status(status)) " "
                            }
                        }
                    }
                }
            }
        }
    }
}

fn county_name(slug: &str) -> &str {
    counties::display_name(slug).unwrap_or(slug)
}

fn section_status(status: &SectionStatus) -> String {
    match status {
        SectionStatus::IndicatorMissing => "none".to_string(),
        SectionStatus::NoListings => "0 listings".to_string(),
        SectionStatus::Paged { pages_read, max_pages } => format!("{pages_read}/{max_pages} pages"),
    }
}

fn results_card(view: &RunView) -> Markup {
    let mode = view.request.output_mode();
    let records = view.records();

    card(
        "Results",
        html! {
            p {
                strong { (records.len()) } " listings. Download: "
                a href=(format!("/runs/{}/export.csv", view.id)) { "CSV" }
                " · "
                a href=(format!("/runs/{}/export.xlsx", view.id)) { "Excel" }
            }
            @if records.is_empty() {
                p { "No listings found." }
            } @else {
                div style="overflow-x: auto;" {
                    table {
                        thead {
                            tr {
                                @for column in mode.columns() {
                                    th { (column) }
                                }
                            }
                        }
                        tbody {
                            @for record in &records {
                                tr {
                                    @for value in mode.row(record) {
                                        td { (value) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
