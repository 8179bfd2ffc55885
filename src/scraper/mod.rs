pub mod fetch;
pub mod orchestrator;
pub mod pacing;
mod scraper_error;
pub mod selectors;
pub mod sites;

pub use fetch::{FetcherFactory, PageFetcher};
pub use orchestrator::{run_search, RunSummary, ScrapeSettings};
pub use scraper_error::ScraperError;
