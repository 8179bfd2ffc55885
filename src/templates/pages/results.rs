use crate::domain::CanonicalListing;
use crate::templates::{desktop_layout, import_form, listing_card};
use maud::{html, Markup};

pub fn results_page(listings: &[CanonicalListing]) -> Markup {
    let preferred = listings.iter().filter(|l| l.is_preferred_builder).count();

    desktop_layout(
        "Results",
        html! {
            main class="container" {
                h1 { "Property search results" }
                p {
                    strong { (listings.len()) } " properties, "
                    strong { (preferred) } " from preferred builders."
                }
                p {
                    a class="btn secondary" href="/" { "Back to search" }
                    " "
                    a class="btn" href="/export" { "Export CSV" }
                    " "
                    a class="btn" href="/export.xlsx" { "Export XLSX" }
                }

                (import_form())

                div class="property-list" {
                    @for listing in listings {
                        (listing_card(listing))
                    }
                }
            }
        },
    )
}
