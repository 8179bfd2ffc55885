use crate::db::{runs, Database};
use crate::domain::SearchCriteria;
use crate::errors::ServerError;
use crate::run::state::{source_labels, RunHandle, RunManager, RunOutcome};
use crate::scraper::fetch::{FetcherFactory, PageFetcher};
use crate::scraper::sites::{adapters_for, SearchUrls};
use crate::scraper::{run_search, RunSummary, ScrapeSettings, ScraperError};
use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

/// What a background run needs besides its criteria.
#[derive(Clone)]
pub struct RunEnv {
    pub db: Database,
    pub fetchers: FetcherFactory,
    pub settings: ScrapeSettings,
    pub urls: SearchUrls,
}

/// Claims the run slot and starts the search on its own thread.
pub fn spawn_run(
    runs: &RunManager,
    criteria: SearchCriteria,
    env: RunEnv,
) -> Result<JoinHandle<()>, ServerError> {
    let pages_total = criteria
        .pages_per_site
        .saturating_mul(criteria.enabled_sources.len() as u32);
    let handle = runs.begin(pages_total)?;

    thread::Builder::new()
        .name("scrape-run".to_string())
        .spawn(move || execute(handle, criteria, env))
        .map_err(|e| {
            tracing::error!("cannot spawn run thread: {e}");
            runs.abort(&e.to_string());
            ServerError::InternalError
        })
}

/// Closes the fetch session on every exit path, unwinding included.
struct SessionGuard(Box<dyn PageFetcher>);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

fn execute(handle: RunHandle, criteria: SearchCriteria, env: RunEnv) {
    let started_at = Utc::now();
    let sites = criteria
        .enabled_sources
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(",");

    let run_id = env
        .db
        .with_conn(|conn| runs::start_run(conn, started_at, &sites, criteria.pages_per_site))
        .map_err(|e| tracing::warn!("run history unavailable: {e}"))
        .ok();

    tracing::info!(
        sites = %sites,
        pages = criteria.pages_per_site,
        budget = ?criteria.budget_max,
        "search started"
    );

    let result = panic::catch_unwind(AssertUnwindSafe(|| scrape(&handle, &criteria, &env)));

    let (outcome, pages_fetched) = match result {
        Ok(Ok(summary)) if summary.cancelled => (RunOutcome::Cancelled, summary.pages_fetched),
        Ok(Ok(summary)) => {
            if summary.failed_pages > 0 {
                tracing::warn!(failed_pages = summary.failed_pages, "some pages were skipped");
            }
            let unreachable = summary.unreachable;
            (RunOutcome::Completed { unreachable }, summary.pages_fetched)
        }
        Ok(Err(e)) => {
            tracing::error!("search failed: {e}");
            (RunOutcome::Failed(e.to_string()), 0)
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!("search panicked: {reason}");
            (RunOutcome::Failed(reason), 0)
        }
    };

    let (label, error) = match &outcome {
        RunOutcome::Completed { unreachable } if unreachable.is_empty() => ("completed", None),
        RunOutcome::Completed { unreachable } => (
            "completed",
            Some(format!("unreachable: {}", source_labels(unreachable))),
        ),
        RunOutcome::Cancelled => ("cancelled", None),
        RunOutcome::Failed(e) => ("failed", Some(e.clone())),
    };

    let found = handle.finish(outcome);
    tracing::info!(outcome = label, found, pages_fetched, "search finished");

    if let Some(id) = run_id {
        let recorded = env.db.with_conn(|conn| {
            runs::end_run(conn, id, Utc::now(), pages_fetched, found, label, error.as_deref())
        });
        if let Err(e) = recorded {
            tracing::warn!(run_id = id, "could not record run end: {e}");
        }
    }
}

fn scrape(
    handle: &RunHandle,
    criteria: &SearchCriteria,
    env: &RunEnv,
) -> Result<RunSummary, ScraperError> {
    let adapters = adapters_for(criteria, &env.urls)?;
    let mut session = SessionGuard((env.fetchers)()?);

    Ok(run_search(
        criteria,
        &adapters,
        session.0.as_mut(),
        handle,
        &env.settings,
    ))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_string())
}
