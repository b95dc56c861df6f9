use maud::{html, Markup};

pub mod error;

pub use error::error_page;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

pub fn progress_bar(completed: usize, total: usize) -> Markup {
    let percent = if total == 0 { 100 } else { completed * 100 / total };
    html! {
        div class="progress" {
            div class="progress-fill" style=(format!("width: {percent}%")) {}
        }
        p { strong { (completed) } " / " (total) " tasks done" }
    }
}
