use crate::db::runs::ScrapeRun;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn runs_page(runs: &[ScrapeRun]) -> Markup {
    desktop_layout(
        "Run history",
        html! {
            main class="container" {
                h1 { "Recent runs" }

                @if runs.is_empty() {
                    p { "No searches have been run yet." }
                } @else {
                    section class="card" {
                        table {
                            thead {
                                tr {
                                    th { "#" }
                                    th { "Started" }
                                    th { "Sites" }
                                    th { "Pages/site" }
                                    th { "Pages fetched" }
                                    th { "Found" }
                                    th { "Outcome" }
                                }
                            }
                            tbody {
                                @for run in runs {
                                    tr {
                                        td { (run.id) }
                                        td { (run.started_at.format("%Y-%m-%d %H:%M UTC").to_string()) }
                                        td { (run.sites) }
                                        td { (run.pages_per_site) }
                                        td { (run.pages_fetched.map(|n| n.to_string()).unwrap_or_else(|| "-".into())) }
                                        td { (run.properties_found.map(|n| n.to_string()).unwrap_or_else(|| "-".into())) }
                                        td title=[run.error_message.as_deref()] { (run.outcome) }
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
