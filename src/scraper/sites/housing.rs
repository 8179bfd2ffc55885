// Housing.com search results. Fields are tagged with `data-q` attributes,
// which have been steadier than the class names.

use crate::domain::{CanonicalListing, RawListing, Source};
use crate::scraper::selectors::{
    find_fragments, first_href, first_text, mentions_rera, resolve_url, selector_list,
};
use crate::scraper::sites::{origin_of, paged_url, FetchPlan, SiteAdapter};
use crate::scraper::ScraperError;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

const FRAGMENTS: &[&str] = &[
    "article[data-testid='card-container']",
    "div[data-testid='card-container']",
    "article[data-testid*='card']",
];
const TITLE: &[&str] = &["h2.title-style", "[data-q='title'] h2", "h2"];
const SUBTITLE: &[&str] = &["div[data-q='subtitle']", "[data-q='subtitle']"];
const PRICE: &[&str] = &["div[data-q='price']", "[data-q='price']"];
const AREA: &[&str] = &["div[data-q='builtup-area']", "[data-q='builtup-area']", "[data-q='area']"];
const DESCRIPTION: &[&str] = &["[data-q='desc']", "[data-q='description']"];
const LINK: &[&str] = &["a[data-q='title']", "a[href*='/buy-']", "a[href]"];

pub struct HousingAdapter {
    base: Url,
    origin: Url,
    fragments: Vec<Selector>,
    title: Vec<Selector>,
    subtitle: Vec<Selector>,
    price: Vec<Selector>,
    area: Vec<Selector>,
    description: Vec<Selector>,
    link: Vec<Selector>,
}

impl HousingAdapter {
    pub fn new(base: &str) -> Result<Self, ScraperError> {
        let base = Url::parse(base)?;
        Ok(Self {
            origin: origin_of(&base)?,
            base,
            fragments: selector_list(FRAGMENTS)?,
            title: selector_list(TITLE)?,
            subtitle: selector_list(SUBTITLE)?,
            price: selector_list(PRICE)?,
            area: selector_list(AREA)?,
            description: selector_list(DESCRIPTION)?,
            link: selector_list(LINK)?,
        })
    }
}

impl SiteAdapter for HousingAdapter {
    fn source(&self) -> Source {
        Source::Housing
    }

    fn search_url(&self, page: u32) -> Result<Url, ScraperError> {
        Ok(paged_url(&self.base, page))
    }

    fn fetch_plan(&self) -> FetchPlan {
        FetchPlan {
            wait_for: "article[data-testid='card-container']",
            page_load_timeout: Some(Duration::from_secs(30)),
            ..FetchPlan::default()
        }
    }

    fn extract_listings(&self, markup: &str) -> Result<Vec<CanonicalListing>, ScraperError> {
        let document = Html::parse_document(markup);

        let listings = find_fragments(&document, &self.fragments)
            .into_iter()
            .map(|card| {
                // the subtitle names the project, usually with its developer
                let subtitle = first_text(card, &self.subtitle);
                let raw = RawListing {
                    title: first_text(card, &self.title),
                    project: subtitle.clone(),
                    builder: subtitle,
                    price_text: first_text(card, &self.price),
                    area_text: first_text(card, &self.area),
                    description: first_text(card, &self.description),
                    property_url: first_href(card, &self.link)
                        .and_then(|href| resolve_url(&self.origin, &href)),
                    rera_mentioned: mentions_rera(card),
                };
                CanonicalListing::from_raw(Source::Housing, raw)
            })
            .collect();

        Ok(listings)
    }
}
