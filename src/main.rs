use crate::config::AppConfig;
use crate::db::{init_db, Database};
use crate::responses::error_to_response;
use crate::router::{handle, AppContext};
use astra::Server;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod db;
mod domain;
mod errors;
mod responses;
mod router;
mod run;
mod scraper;
mod spreadsheets;
mod templates;
mod uploads;

#[cfg(test)]
mod tests;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("property_finder=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn main() {
    // .env may set RUST_LOG, so load it before the subscriber
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let db = Database::new(config.database_path.clone());
    if let Err(e) = init_db(&db, &config.schema_path) {
        tracing::error!("database initialization failed: {e}");
        std::process::exit(1);
    }

    let addr = config.bind_addr;
    let fetchers = config.fetcher_factory();
    tracing::info!(
        %addr,
        workers = config.max_workers,
        fetch_mode = config.fetch_mode.label(),
        "starting server"
    );

    let server = Server::bind(&addr).max_workers(config.max_workers);
    let ctx = AppContext::new(config, db, fetchers);

    let result = server.serve(move |req, _info| match handle(req, &ctx) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    if let Err(e) = result {
        tracing::error!("server ended with error: {e}");
    }

    tracing::info!("server shut down cleanly");
}
