use crate::domain::{validate, SearchCriteria, Source};
use crate::run::RunHandle;
use crate::scraper::fetch::{FetchOptions, PageFetcher, ScrollStep};
use crate::scraper::pacing::Pacing;
use crate::scraper::sites::{FetchPlan, SiteAdapter};
use std::path::{Path, PathBuf};

/// Per-run knobs that come from configuration rather than the search form.
#[derive(Debug, Clone, Default)]
pub struct ScrapeSettings {
    pub pacing: Pacing,
    /// Rendered pages (and screenshots, where the site asks for them) land here.
    pub debug_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub failed_pages: u32,
    pub cancelled: bool,
    /// Sources where every attempted page failed to load.
    pub unreachable: Vec<Source>,
}

/// Walks every adapter in order, page by page, pushing validated listings
/// into the run as they arrive. Page failures are logged and skipped.
pub fn run_search(
    criteria: &SearchCriteria,
    adapters: &[Box<dyn SiteAdapter>],
    fetcher: &mut dyn PageFetcher,
    run: &RunHandle,
    settings: &ScrapeSettings,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let pages = criteria.pages_per_site;
    let pacing = &settings.pacing;

    if let Some(dir) = &settings.debug_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), "cannot create debug dir: {e}");
        }
    }

    for (i, adapter) in adapters.iter().enumerate() {
        if i > 0 {
            pacing.pause(pacing.between_sources);
        }
        if run.is_cancelled() {
            summary.cancelled = true;
            return summary;
        }

        let source = adapter.source();
        let plan = adapter.fetch_plan();
        run.set_source(source);
        tracing::info!(site = %source, pages, "starting site");
        let mut attempted = 0u32;
        let mut loaded = 0u32;

        for page in 1..=pages {
            if run.is_cancelled() {
                summary.cancelled = true;
                return summary;
            }
            if page > 1 {
                pacing.pause(pacing.between_pages);
            }
            run.set_message(format!("Scraping {source} page {page}/{pages}"));
            attempted += 1;

            let url = match adapter.search_url(page) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(site = %source, page, "cannot build search url: {e}");
                    summary.failed_pages += 1;
                    run.pages_done(1);
                    continue;
                }
            };

            let screenshot = debug_path(settings, plan.screenshot, source.key(), page, "png");
            let opts = fetch_options(&plan, pacing, screenshot);

            let markup = match fetcher.fetch(url.as_str(), &opts) {
                Ok(markup) => markup,
                Err(e) => {
                    tracing::warn!(site = %source, page, %url, "page fetch failed: {e}");
                    summary.failed_pages += 1;
                    run.pages_done(1);
                    continue;
                }
            };
            summary.pages_fetched += 1;
            loaded += 1;

            if let Some(path) = debug_path(settings, true, source.key(), page, "html") {
                if let Err(e) = std::fs::write(&path, &markup) {
                    tracing::warn!(path = %path.display(), "debug dump failed: {e}");
                }
            }

            let listings = match adapter.extract_listings(&markup) {
                Ok(listings) => listings,
                Err(e) => {
                    tracing::warn!(site = %source, page, "extraction failed: {e}");
                    summary.failed_pages += 1;
                    run.pages_done(1);
                    continue;
                }
            };

            if listings.is_empty() {
                tracing::info!(site = %source, page, "no listings, end of results");
                run.pages_done(pages - page + 1);
                break;
            }

            let found = listings.len();
            let mut kept = 0;
            for listing in listings.into_iter().filter(|l| validate(l, criteria)) {
                run.push_listing(listing);
                kept += 1;
            }
            tracing::info!(site = %source, page, found, kept, "page scraped");
            run.pages_done(1);
        }

        if attempted > 0 && loaded == 0 {
            tracing::warn!(site = %source, attempted, "no page of this site could be loaded");
            summary.unreachable.push(source);
        }
    }

    summary
}

fn debug_path(
    settings: &ScrapeSettings,
    wanted: bool,
    key: &str,
    page: u32,
    ext: &str,
) -> Option<PathBuf> {
    let dir: &Path = settings.debug_dir.as_deref().filter(|_| wanted)?;
    Some(dir.join(format!("{key}_page_{page}.{ext}")))
}

fn fetch_options(plan: &FetchPlan, pacing: &Pacing, screenshot: Option<PathBuf>) -> FetchOptions {
    FetchOptions {
        wait_for: Some(plan.wait_for.to_string()),
        wait_timeout: plan.wait_timeout,
        page_load_timeout: plan.page_load_timeout,
        settle: pacing.sample(plan.settle),
        scroll: (0..plan.scroll_steps)
            .map(|_| ScrollStep {
                dy: plan.scroll_px,
                pause: pacing.sample(pacing.scroll_pause),
            })
            .collect(),
        screenshot,
    }
}
