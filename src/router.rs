use crate::config::AppConfig;
use crate::db::{runs, Database};
use crate::domain::StartRequest;
use crate::errors::ServerError;
use crate::responses::{csv_response, html_response, json_response, redirect, xlsx_response, ResultResp};
use crate::run::{spawn_run, RunEnv, RunManager};
use crate::scraper::FetcherFactory;
use crate::spreadsheets::{listings_from_csv, listings_to_csv, listings_to_xlsx};
use crate::templates;
use crate::uploads::{read_body, uploaded_file};
use astra::Request;
use chrono::Local;
use serde_json::json;

const MAX_JSON_BYTES: u64 = 64 * 1024;
const RUN_HISTORY_LIMIT: u32 = 50;

/// Everything a request handler can reach. Shared by all astra workers.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub db: Database,
    pub runs: RunManager,
    pub fetchers: FetcherFactory,
}

impl AppContext {
    pub fn new(config: AppConfig, db: Database, fetchers: FetcherFactory) -> Self {
        Self {
            config,
            db,
            runs: RunManager::new(),
            fetchers,
        }
    }

    fn run_env(&self) -> RunEnv {
        RunEnv {
            db: self.db.clone(),
            fetchers: self.fetchers.clone(),
            settings: self.config.scrape_settings(),
            urls: self.config.search_urls.clone(),
        }
    }
}

pub fn handle(mut req: Request, ctx: &AppContext) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    tracing::debug!(%method, %path, "request");

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => html_response(templates::pages::home_page()),
        ("POST", "/start_scraping") => start_scraping(&mut req, ctx),
        ("GET", "/status") => json_response(200, &ctx.runs.status()),
        ("POST", "/stop_scraping") => {
            let status = if ctx.runs.request_stop() {
                tracing::info!("stop requested");
                "stopped"
            } else {
                "not_running"
            };
            json_response(200, &json!({ "status": status }))
        }
        ("GET", "/results") => match ctx.runs.results() {
            Some(listings) => html_response(templates::pages::results_page(&listings)),
            None => redirect("/"),
        },
        ("GET", "/export") => {
            let listings = ctx.runs.results().ok_or(ServerError::NoResults)?;
            csv_response(listings_to_csv(&listings)?, &export_filename("csv"))
        }
        ("GET", "/export.xlsx") => {
            let listings = ctx.runs.results().ok_or(ServerError::NoResults)?;
            xlsx_response(listings_to_xlsx(&listings)?, &export_filename("xlsx"))
        }
        ("POST", "/import_csv") => import_csv(&mut req, ctx),
        ("GET", "/runs") => {
            let history = ctx
                .db
                .with_conn(|conn| runs::recent_runs(conn, RUN_HISTORY_LIMIT))?;
            html_response(templates::pages::runs_page(&history))
        }
        _ => Err(ServerError::NotFound),
    }
}

fn start_scraping(req: &mut Request, ctx: &AppContext) -> ResultResp {
    let body = read_body(req, MAX_JSON_BYTES)?;
    let request: StartRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ServerError::BadRequest(format!("Invalid request: {e}")))?
    };

    let criteria = request.into_criteria(ctx.config.max_pages_per_site)?;
    spawn_run(&ctx.runs, criteria, ctx.run_env())?;

    json_response(200, &json!({ "status": "started" }))
}

fn import_csv(req: &mut Request, ctx: &AppContext) -> ResultResp {
    if ctx.runs.is_running() {
        return Err(ServerError::RunConflict);
    }

    let bytes = uploaded_file(req, ctx.config.max_upload_bytes)?;
    let listings = listings_from_csv(&bytes)?;
    let count = listings.len();

    ctx.runs.replace_results(listings.clone())?;
    tracing::info!(count, "imported results from CSV");

    json_response(
        200,
        &json!({ "status": "success", "count": count, "results": listings }),
    )
}

fn export_filename(ext: &str) -> String {
    format!("bangalore_properties_{}.{ext}", Local::now().format("%Y%m%d_%H%M%S"))
}
