// src/domain/validate.rs

use crate::domain::criteria::SearchCriteria;
use crate::domain::listing::CanonicalListing;

/// Decides whether a scraped listing satisfies the run's criteria.
///
/// Unknown prices and unmentioned bedroom counts pass: cards often omit them and the
/// listing is still worth showing. RERA is not checked even when
/// `rera_required` is set, because most cards never print their registration.
pub fn validate(listing: &CanonicalListing, criteria: &SearchCriteria) -> bool {
    if let (Some(budget), Some(price)) = (criteria.budget_max, listing.price_numeric) {
        if price > budget {
            return false;
        }
    }

    if let Some(count) = listing.bedroom_count() {
        if !criteria.bhk_wanted.is_empty() && !criteria.bhk_wanted.contains(&count) {
            return false;
        }
    }

    if criteria.preferred_only && !listing.is_preferred_builder {
        return false;
    }

    true
}
