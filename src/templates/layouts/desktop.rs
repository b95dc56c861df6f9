use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }
header { display: flex; align-items: center; gap: 1rem; padding: 0.75rem 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
header nav a { color: #524ed2; text-decoration: none; }
main { max-width: 1200px; margin: 1.5rem auto; padding: 0 1rem; }
.card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1rem; }
.progress { background: #e5e7eb; border-radius: 6px; height: 12px; overflow: hidden; }
.progress-fill { background: #524ed2; height: 100%; }
table { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
th, td { border-bottom: 1px solid #e5e7eb; padding: 0.35rem 0.5rem; text-align: left; white-space: nowrap; }
th { background: #f9fafb; }
.status-failed { color: #dc2626; }
.log { background: #f4f4f4; padding: 0.5rem; border-radius: 6px; max-height: 240px; overflow-y: auto; font-size: 0.8rem; }
"#;

/// Page shell. `refresh_secs` adds a meta refresh while a run is in progress.
pub fn desktop_layout(title: &str, refresh_secs: Option<u32>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(secs) = refresh_secs {
                    meta http-equiv="refresh" content=(secs);
                }
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    h3 { "Sheriff Sale Auctions" }
                    nav {
                        a href="/" { "New run" }
                    }
                }
                main {
                    (content)
                }
            }
        }
    }
}
