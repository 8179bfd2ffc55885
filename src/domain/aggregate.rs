// src/domain/aggregate.rs

use crate::domain::listing::CanonicalListing;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Dedups by (title, price text), keeping the first one seen, then ranks
/// preferred builders first and cheaper listings ahead of dearer ones.
/// Listings without a parsed price go last within their tier.
pub fn aggregate(listings: &[CanonicalListing]) -> Vec<CanonicalListing> {
    let mut seen = HashSet::new();
    let mut out: Vec<CanonicalListing> = listings
        .iter()
        .filter(|l| seen.insert((l.title.as_deref(), l.price_text.as_deref())))
        .cloned()
        .collect();

    // sort_by is stable, so equal keys keep adapter order
    out.sort_by(rank);
    out
}

fn rank(a: &CanonicalListing, b: &CanonicalListing) -> Ordering {
    b.is_preferred_builder
        .cmp(&a.is_preferred_builder)
        .then_with(|| match (a.price_numeric, b.price_numeric) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
