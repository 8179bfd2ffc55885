use crate::domain::CanonicalListing;
use crate::domain::criteria::LAKH;
use maud::{html, Markup};

const CRORE: f64 = 100.0 * LAKH;

/// Indian-style short form: "₹1.25 Cr", "₹78 L", or plain rupees.
pub fn format_rupees(amount: f64) -> String {
    if amount >= CRORE {
        format!("₹{} Cr", trim_decimals(amount / CRORE))
    } else if amount >= LAKH {
        format!("₹{} L", trim_decimals(amount / LAKH))
    } else {
        format!("₹{}", amount.round())
    }
}

fn trim_decimals(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn listing_card(listing: &CanonicalListing) -> Markup {
    let price = listing
        .price_text
        .clone()
        .or_else(|| listing.price_numeric.map(format_rupees))
        .unwrap_or_else(|| "Price on Request".to_string());

    html! {
        div.card.property-card.preferred[listing.is_preferred_builder] {
            div class="card-header" {
                span class="source-badge" { (listing.source.label()) }
                @if listing.is_preferred_builder {
                    span class="preferred-tag" { "⭐ PREFERRED BUILDER" }
                }
            }
            h3 class="property-title" { (listing.display_title()) }
            div class="property-builder" {
                (listing.builder.as_deref().unwrap_or("Builder Not Specified"))
            }
            div class="price" { (price) }
            div class="details-grid" {
                div { span class="detail-label" { "Type" } (listing.bhk.as_str()) " BHK" }
                div {
                    span class="detail-label" { "Area" }
                    (listing.area_text.as_deref().unwrap_or("-"))
                }
                div { span class="detail-label" { "RERA" } (listing.rera.as_str()) }
                div {
                    span class="detail-label" { "Per sq.ft" }
                    @match listing.price_per_sqft {
                        Some(p) => { "₹" (p) },
                        None => "-",
                    }
                }
            }
            @if let Some(url) = &listing.property_url {
                p { a class="btn" href=(url) target="_blank" rel="noopener" { "View Property" } }
            }
        }
    }
}
