// MagicBricks search results (`mb-srp__card` cards).

use crate::domain::{CanonicalListing, RawListing, Source};
use crate::scraper::pacing::DelayRange;
use crate::scraper::selectors::{
    element_text, find_fragments, first_text, mentions_rera, resolve_url, selector, selector_list,
};
use crate::scraper::sites::{origin_of, paged_url, FetchPlan, SiteAdapter};
use crate::scraper::ScraperError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const FRAGMENTS: &[&str] = &["div.mb-srp__card", "div.mb-srp__list > div[id^='cardid']"];
const TITLE: &[&str] = &["h2.mb-srp__card--title", ".mb-srp__card--title", "h2"];
const PROJECT: &[&str] = &[
    "a.mb-srp__card__society--name",
    ".mb-srp__card__society--name",
    ".mb-srp__card__developer--name",
];
const PRICE: &[&str] = &["div.mb-srp__card__price--amount", ".mb-srp__card__price--amount"];
const DESCRIPTION: &[&str] = &[".mb-srp__card--desc--text", ".mb-srp__card--desc"];

const SUMMARY_VALUE: &str = "div.mb-srp__card__summary--value";
const SUMMARY_LABEL_CLASS: &str = "mb-srp__card__summary--label";

pub struct MagicBricksAdapter {
    base: Url,
    origin: Url,
    fragments: Vec<Selector>,
    title: Vec<Selector>,
    project: Vec<Selector>,
    price: Vec<Selector>,
    description: Vec<Selector>,
    summary_value: Selector,
    anchor: Selector,
}

impl MagicBricksAdapter {
    pub fn new(base: &str) -> Result<Self, ScraperError> {
        let base = Url::parse(base)?;
        Ok(Self {
            origin: origin_of(&base)?,
            base,
            fragments: selector_list(FRAGMENTS)?,
            title: selector_list(TITLE)?,
            project: selector_list(PROJECT)?,
            price: selector_list(PRICE)?,
            description: selector_list(DESCRIPTION)?,
            summary_value: selector(SUMMARY_VALUE)?,
            anchor: selector("a[href]")?,
        })
    }

    /// The summary grid holds carpet/super area, status, floor, etc. The
    /// area cell is recognized by its `data-summary` wrapper or its label.
    fn summary_area(&self, card: ElementRef<'_>) -> Option<String> {
        card.select(&self.summary_value).find_map(|value| {
            let wrapper_says_area = value
                .parent()
                .and_then(ElementRef::wrap)
                .and_then(|p| p.value().attr("data-summary"))
                .is_some_and(|s| s.to_ascii_lowercase().contains("area"));

            let label_says_area = value
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().classes().any(|c| c == SUMMARY_LABEL_CLASS))
                .is_some_and(|label| element_text(label).to_ascii_lowercase().contains("area"));

            if wrapper_says_area || label_says_area {
                Some(element_text(value)).filter(|t| !t.is_empty())
            } else {
                None
            }
        })
    }

    /// Prefers links to the property detail page; the society link is a
    /// project page and only used when nothing better exists.
    fn property_link(&self, card: ElementRef<'_>) -> Option<String> {
        let hrefs: Vec<&str> = card
            .select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
            .collect();

        hrefs
            .iter()
            .find(|h| h.contains("property-detail") || h.contains("/buy/"))
            .or_else(|| hrefs.first())
            .and_then(|href| resolve_url(&self.origin, href))
    }
}

impl SiteAdapter for MagicBricksAdapter {
    fn source(&self) -> Source {
        Source::MagicBricks
    }

    fn search_url(&self, page: u32) -> Result<Url, ScraperError> {
        Ok(paged_url(&self.base, page))
    }

    fn fetch_plan(&self) -> FetchPlan {
        FetchPlan {
            wait_for: ".mb-srp__card",
            settle: DelayRange::secs(4, 7),
            ..FetchPlan::default()
        }
    }

    fn extract_listings(&self, markup: &str) -> Result<Vec<CanonicalListing>, ScraperError> {
        let document = Html::parse_document(markup);

        let listings = find_fragments(&document, &self.fragments)
            .into_iter()
            .map(|card| {
                let raw = RawListing {
                    title: first_text(card, &self.title),
                    project: first_text(card, &self.project),
                    builder: None,
                    price_text: first_text(card, &self.price),
                    area_text: self.summary_area(card),
                    description: first_text(card, &self.description),
                    property_url: self.property_link(card),
                    rera_mentioned: mentions_rera(card),
                };
                CanonicalListing::from_raw(Source::MagicBricks, raw)
            })
            .collect();

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bhk, ReraStatus};
    use crate::scraper::sites::MAGICBRICKS_SEARCH_URL;

    const PAGE: &str = r#"
    <html><body><div class="mb-srp__list">
      <div class="mb-srp__card" id="cardid1">
        <h2 class="mb-srp__card--title">2 BHK Flat for Sale in Sobha Dream Acres, Panathur</h2>
        <a class="mb-srp__card__society--name" href="/sobha-dream-acres-pdpid-4d4235">Sobha Dream Acres</a>
        <div class="mb-srp__card__summary">
          <div data-summary="carpet-area">
            <div class="mb-srp__card__summary--label">Carpet Area</div>
            <div class="mb-srp__card__summary--value">1,050 sqft</div>
          </div>
          <div data-summary="status">
            <div class="mb-srp__card__summary--label">Status</div>
            <div class="mb-srp__card__summary--value">Ready to Move</div>
          </div>
        </div>
        <div class="mb-srp__card__price--amount">₹76 Lac</div>
        <a href="/propertyDetails/2-BHK-1050-Sq-ft-property-detail-id=abc">details</a>
        <span>RERA ID: PRM/KA/RERA/1251</span>
      </div>
      <div class="mb-srp__card" id="cardid2">
        <h2 class="mb-srp__card--title">Studio Apartment in Koramangala</h2>
        <div class="mb-srp__card__summary">
          <div>
            <div class="mb-srp__card__summary--label">Super Area</div>
            <div class="mb-srp__card__summary--value">480 sqft</div>
          </div>
        </div>
        <a href="/koramangala-overview">area</a>
      </div>
    </div></body></html>
    "#;

    fn adapter() -> MagicBricksAdapter {
        MagicBricksAdapter::new(MAGICBRICKS_SEARCH_URL).unwrap()
    }

    #[test]
    fn paginates_with_query_param() {
        let a = adapter();
        assert_eq!(a.search_url(1).unwrap().as_str(), MAGICBRICKS_SEARCH_URL);
        assert_eq!(
            a.search_url(4).unwrap().as_str(),
            format!("{MAGICBRICKS_SEARCH_URL}?page=4")
        );
    }

    #[test]
    fn extracts_card_fields() {
        let listings = adapter().extract_listings(PAGE).unwrap();
        assert_eq!(listings.len(), 2);

        let card = &listings[0];
        assert_eq!(card.project.as_deref(), Some("Sobha Dream Acres"));
        assert!(card.is_preferred_builder);
        assert_eq!(card.bhk, Bhk::Two);
        assert_eq!(card.price_numeric, Some(7_600_000.0));
        assert_eq!(card.area_text.as_deref(), Some("1,050 sqft"));
        assert_eq!(card.rera, ReraStatus::Yes);
        assert_eq!(
            card.property_url.as_deref(),
            Some("https://www.magicbricks.com/propertyDetails/2-BHK-1050-Sq-ft-property-detail-id=abc")
        );
    }

    #[test]
    fn area_found_by_label_and_link_falls_back() {
        let listings = adapter().extract_listings(PAGE).unwrap();
        let studio = &listings[1];

        assert_eq!(studio.area_text.as_deref(), Some("480 sqft"));
        assert_eq!(studio.bhk, Bhk::Unknown);
        assert_eq!(studio.price_numeric, None);
        assert_eq!(
            studio.property_url.as_deref(),
            Some("https://www.magicbricks.com/koramangala-overview")
        );
    }
}
