pub mod acres99;
pub mod housing;
pub mod magicbricks;

use crate::domain::{CanonicalListing, SearchCriteria, Source};
use crate::scraper::pacing::DelayRange;
use crate::scraper::ScraperError;
use std::time::Duration;
use url::Url;

pub use acres99::Acres99Adapter;
pub use housing::HousingAdapter;
pub use magicbricks::MagicBricksAdapter;

pub const ACRES99_SEARCH_URL: &str = "https://www.99acres.com/property-in-bangalore-ffid";
pub const MAGICBRICKS_SEARCH_URL: &str =
    "https://www.magicbricks.com/2-bhk-flats-in-bangalore-for-sale-price-70-lakhs-to-80-lakhs-pppfs";
pub const HOUSING_SEARCH_URL: &str = "https://housing.com/in/buy/searches/CcP38f9yfbk7p3m2h1fU526n4";

/// Search entry points per site. MagicBricks and Housing.com URLs are
/// pre-tuned searches that already encode budget and BHK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchUrls {
    pub acres99: String,
    pub magicbricks: String,
    pub housing: String,
}

impl Default for SearchUrls {
    fn default() -> Self {
        Self {
            acres99: ACRES99_SEARCH_URL.to_string(),
            magicbricks: MAGICBRICKS_SEARCH_URL.to_string(),
            housing: HOUSING_SEARCH_URL.to_string(),
        }
    }
}

/// How a site's result page should be loaded before extraction.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub wait_for: &'static str,
    pub wait_timeout: Duration,
    pub page_load_timeout: Option<Duration>,
    /// Pause after load, before the first scroll.
    pub settle: DelayRange,
    pub scroll_steps: usize,
    pub scroll_px: i32,
    pub screenshot: bool,
}

impl Default for FetchPlan {
    fn default() -> Self {
        Self {
            wait_for: "body",
            wait_timeout: Duration::from_secs(10),
            page_load_timeout: None,
            settle: DelayRange::secs(3, 5),
            scroll_steps: 3,
            scroll_px: 1500,
            screenshot: false,
        }
    }
}

/// Everything the orchestrator needs to know about one listing site.
pub trait SiteAdapter {
    fn source(&self) -> Source;

    fn search_url(&self, page: u32) -> Result<Url, ScraperError>;

    fn fetch_plan(&self) -> FetchPlan;

    /// Maps every listing fragment on a rendered results page. An empty
    /// vec means the site has no more pages.
    fn extract_listings(&self, markup: &str) -> Result<Vec<CanonicalListing>, ScraperError>;
}

/// Adapters for the enabled sources, in fixed run order.
pub fn adapters_for(
    criteria: &SearchCriteria,
    urls: &SearchUrls,
) -> Result<Vec<Box<dyn SiteAdapter>>, ScraperError> {
    let mut adapters: Vec<Box<dyn SiteAdapter>> = Vec::new();
    for source in Source::ALL {
        if !criteria.enabled_sources.contains(&source) {
            continue;
        }
        let adapter: Box<dyn SiteAdapter> = match source {
            Source::Acres99 => Box::new(Acres99Adapter::new(&urls.acres99, criteria.bhk_list())?),
            Source::MagicBricks => Box::new(MagicBricksAdapter::new(&urls.magicbricks)?),
            Source::Housing => Box::new(HousingAdapter::new(&urls.housing)?),
        };
        adapters.push(adapter);
    }
    Ok(adapters)
}

/// `base?page=N`, leaving page 1 bare.
pub(crate) fn paged_url(base: &Url, page: u32) -> Url {
    let mut url = base.clone();
    if page > 1 {
        url.query_pairs_mut().append_pair("page", &page.to_string());
    }
    url
}

/// Scheme and host of a search URL, for resolving relative hrefs.
pub(crate) fn origin_of(url: &Url) -> Result<Url, ScraperError> {
    Ok(Url::parse(&url.origin().ascii_serialization())?)
}
