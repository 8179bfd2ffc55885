// 99acres search results.
//
// Cards are "tuples" whose class names carry version suffixes, so each
// field has a list of legacy and current selectors.

use crate::domain::{CanonicalListing, RawListing, Source};
use crate::scraper::pacing::DelayRange;
use crate::scraper::selectors::{
    find_fragments, first_href, first_text, mentions_rera, resolve_url, selector_list,
};
use crate::scraper::sites::{origin_of, FetchPlan, SiteAdapter};
use crate::scraper::ScraperError;
use scraper::{Html, Selector};
use url::Url;

const FRAGMENTS: &[&str] = &[
    ".srpTuple__tuple",
    ".projectTuple__tuple",
    "[class*='outerTupleWrap']",
    "[class*='tupleWrap']",
    "div[class*='tuple']",
];
const TITLE: &[&str] = &[
    ".srpTuple__propertyName",
    ".projectTuple__projectName",
    "[class*='propertyHeading']",
    "[class*='projectHeading']",
    "h2",
];
const PROJECT: &[&str] = &[
    ".srpTuple__builderName",
    "[class*='locationName']",
    "[class*='tupleHeading']",
];
const PRICE: &[&str] = &[
    "#srp_tuple_price",
    ".srpTuple__price",
    "[class*='priceVal']",
    "[class*='priceWrap']",
    "[class*='ccl2']",
];
const AREA: &[&str] = &[
    "#srp_tuple_primary_area",
    ".srpTuple__primaryArea",
    "[class*='totolAreaWrap']",
    "[class*='area1Type']",
    "[class*='areaVal']",
];
const DESCRIPTION: &[&str] = &[".srpTuple__bedroomNum", ".srpTuple__configuration"];
const LINK: &[&str] = &[
    "a.body_med",
    "a#srp_tuple_property_title",
    "a.srpTuple__propertyName",
    "[class*='tuple'] a",
    "a[href]",
];

pub struct Acres99Adapter {
    base: Url,
    origin: Url,
    bedrooms: String,
    fragments: Vec<Selector>,
    title: Vec<Selector>,
    project: Vec<Selector>,
    price: Vec<Selector>,
    area: Vec<Selector>,
    description: Vec<Selector>,
    link: Vec<Selector>,
}

impl Acres99Adapter {
    pub fn new(base: &str, bhk: Vec<&str>) -> Result<Self, ScraperError> {
        let base = Url::parse(base)?;
        Ok(Self {
            origin: origin_of(&base)?,
            base,
            bedrooms: bhk.join(","),
            fragments: selector_list(FRAGMENTS)?,
            title: selector_list(TITLE)?,
            project: selector_list(PROJECT)?,
            price: selector_list(PRICE)?,
            area: selector_list(AREA)?,
            description: selector_list(DESCRIPTION)?,
            link: selector_list(LINK)?,
        })
    }
}

impl SiteAdapter for Acres99Adapter {
    fn source(&self) -> Source {
        Source::Acres99
    }

    /// Budget is left out of the query: the site's budget codes drop valid
    /// results, so price is filtered after extraction instead.
    fn search_url(&self, page: u32) -> Result<Url, ScraperError> {
        let mut params = vec!["city=20".to_string()];
        if !self.bedrooms.is_empty() {
            params.push(format!("bedroom_num={}", self.bedrooms));
        }
        params.extend(
            ["preference=S", "area_unit=1", "res_com=R"]
                .into_iter()
                .map(String::from),
        );
        if page > 1 {
            params.push(format!("page={page}"));
        }

        let mut url = self.base.clone();
        url.set_query(Some(&params.join("&")));
        Ok(url)
    }

    fn fetch_plan(&self) -> FetchPlan {
        FetchPlan {
            wait_for: "[class*='tuple'], [class*='Tuple']",
            settle: DelayRange::secs(3, 5),
            scroll_steps: 5,
            screenshot: true,
            ..FetchPlan::default()
        }
    }

    fn extract_listings(&self, markup: &str) -> Result<Vec<CanonicalListing>, ScraperError> {
        let document = Html::parse_document(markup);

        let listings = find_fragments(&document, &self.fragments)
            .into_iter()
            .map(|fragment| {
                let raw = RawListing {
                    title: first_text(fragment, &self.title),
                    project: first_text(fragment, &self.project),
                    builder: None,
                    price_text: first_text(fragment, &self.price),
                    area_text: first_text(fragment, &self.area),
                    description: first_text(fragment, &self.description),
                    property_url: first_href(fragment, &self.link)
                        .and_then(|href| resolve_url(&self.origin, &href)),
                    rera_mentioned: mentions_rera(fragment),
                };
                CanonicalListing::from_raw(Source::Acres99, raw)
            })
            .collect();

        Ok(listings)
    }
}
