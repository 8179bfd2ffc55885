use crate::scraper::fetch::{DirectFetcher, FetcherFactory, PageFetcher, RenderingApiFetcher};
use crate::scraper::pacing::Pacing;
use crate::scraper::sites::SearchUrls;
use crate::scraper::{ScrapeSettings, ScraperError};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("FETCH_MODE=rendered needs ZENROWS_API_KEY")]
    MissingApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// Headless rendering through the API, with scrolling and screenshots.
    Rendered { api_key: String },
    Direct,
}

impl FetchMode {
    pub fn label(&self) -> &'static str {
        match self {
            FetchMode::Rendered { .. } => "rendered",
            FetchMode::Direct => "direct",
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    pub database_path: String,
    pub schema_path: String,
    pub fetch_mode: FetchMode,
    pub fetch_timeout: Duration,
    pub pacing: Pacing,
    pub debug_dir: Option<PathBuf>,
    pub max_pages_per_site: u32,
    pub max_upload_bytes: u64,
    pub search_urls: SearchUrls,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let requested = get("FETCH_MODE").map(|m| m.to_ascii_lowercase());
        let fetch_mode = match (requested, get("ZENROWS_API_KEY")) {
            (None, None) => FetchMode::Direct,
            (None, Some(api_key)) => FetchMode::Rendered { api_key },
            (Some(mode), _) if mode == "direct" => FetchMode::Direct,
            (Some(mode), api_key) if mode == "rendered" => FetchMode::Rendered {
                api_key: api_key.ok_or(ConfigError::MissingApiKey)?,
            },
            (Some(mode), _) => {
                return Err(ConfigError::Invalid { key: "FETCH_MODE", value: mode });
            }
        };

        let pacing = match get("PACING").as_deref().map(str::to_ascii_lowercase) {
            None => Pacing::default(),
            Some(v) if v == "on" => Pacing::default(),
            Some(v) if v == "off" => Pacing::off(),
            Some(v) => return Err(ConfigError::Invalid { key: "PACING", value: v }),
        };

        let defaults = SearchUrls::default();

        Ok(Self {
            bind_addr: parse_or(&get, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            max_workers: parse_or(&get, "MAX_WORKERS", 8)?,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "property_finder.sqlite3".into()),
            schema_path: get("SCHEMA_PATH").unwrap_or_else(|| "sql/schema.sql".into()),
            fetch_mode,
            fetch_timeout: Duration::from_secs(parse_or(&get, "FETCH_TIMEOUT_SECS", 120)?),
            pacing,
            debug_dir: get("DEBUG_DIR").map(PathBuf::from),
            max_pages_per_site: parse_or(&get, "MAX_PAGES_PER_SITE", 10)?.max(1),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            search_urls: SearchUrls {
                acres99: get("ACRES99_SEARCH_URL").unwrap_or(defaults.acres99),
                magicbricks: get("MAGICBRICKS_SEARCH_URL").unwrap_or(defaults.magicbricks),
                housing: get("HOUSING_SEARCH_URL").unwrap_or(defaults.housing),
            },
        })
    }

    /// Defaults with pacing off and DB paths left for the caller to point
    /// at a temp file.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let mut config = Self::from_lookup(|_| None).expect("defaults are valid");
        config.pacing = Pacing::off();
        config
    }

    pub fn scrape_settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            pacing: self.pacing.clone(),
            debug_dir: self.debug_dir.clone(),
        }
    }

    /// Builds one fetch session per run.
    pub fn fetcher_factory(&self) -> FetcherFactory {
        let mode = self.fetch_mode.clone();
        let timeout = self.fetch_timeout;
        Arc::new(move || -> Result<Box<dyn PageFetcher>, ScraperError> {
            let fetcher: Box<dyn PageFetcher> = match &mode {
                FetchMode::Rendered { api_key } => {
                    Box::new(RenderingApiFetcher::new(api_key.clone(), timeout)?)
                }
                FetchMode::Direct => Box::new(DirectFetcher::new(timeout)?),
            };
            Ok(fetcher)
        })
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}
