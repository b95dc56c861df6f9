// templates/pages/home.rs

use crate::counties::OHIO_COUNTIES;
use crate::scraper::Strategy;
use crate::templates::{card, desktop_layout};
use chrono::NaiveDate;
use maud::{html, Markup};

pub const UI_MAX_CONCURRENCY: usize = 16;

const STRATEGY_CHOICES: [(Strategy, &str); 3] = [
    (Strategy::Auto, "Auto"),
    (Strategy::LabeledRows, "Labeled rows"),
    (Strategy::PositionalLines, "Positional lines"),
];

pub fn home_page(default_concurrency: usize, default_strategy: Strategy, today: NaiveDate) -> Markup {
    let today = today.format("%Y-%m-%d").to_string();
    let concurrency = default_concurrency.clamp(1, UI_MAX_CONCURRENCY);

    desktop_layout(
        "Sheriff Sale Auctions",
        None,
        html! {
            h1 { "Scrape auction listings" }

            (card("New run", html! {
                form action="/runs" method="post" {
                    p {
                        label for="from" { "From " }
                        input type="date" id="from" name="from" value=(today) required;
                        label for="to" { " To " }
                        input type="date" id="to" name="to" value=(today) required;
                    }
                    p {
                        label for="county" { "Counties" }
                        br;
                        select id="county" name="county" multiple size="12" required {
                            @for (slug, name) in OHIO_COUNTIES {
                                option value=(slug) { (name) }
                            }
                        }
                    }
                    p {
                        label for="concurrency" { "Parallel browsers: " }
                        input type="range" id="concurrency" name="concurrency"
                            min="1" max=(UI_MAX_CONCURRENCY) value=(concurrency)
                            oninput="this.nextElementSibling.value = this.value";
                        output { (concurrency) }
                    }
                    p {
                        label for="strategy" { "Extraction: " }
                        select id="strategy" name="strategy" {
                            @for (strategy, label) in STRATEGY_CHOICES {
                                option value=(strategy) selected[strategy == default_strategy] { (label) }
                            }
                        }
                    }
                    button type="submit" class="btn" { "Run" }
                }
            }))

            p { "Date ranges are limited to 31 days. Each county and date is scraped in its own browser." }
        },
    )
}
