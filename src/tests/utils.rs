use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use crate::router::AppContext;
use crate::run::RunManager;
use crate::scraper::fetch::{FetchOptions, FetcherFactory, PageFetcher};
use crate::scraper::ScraperError;
use astra::Response;
use std::collections::HashMap;
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub const EMPTY_PAGE: &str = "<html><body><p>No matching properties</p></body></html>";

/// Initialize a fresh test DB using the production schema
pub fn init_test_db() -> Database {
    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let path = std::env::temp_dir().join(format!(
        "property_finder_test_{}_{}.sqlite",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos(),
        SEQ.fetch_add(1, Ordering::SeqCst)
    ));

    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

/// What a fixture fetcher serves for one URL.
#[derive(Clone)]
pub enum Canned {
    Page(String),
    Fail,
    Panic,
}

/// Shared record of what the fetch sessions did.
#[derive(Default)]
pub struct FetchLog {
    pub urls: Mutex<Vec<String>>,
    pub closed: AtomicUsize,
}

impl FetchLog {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

/// Serves canned markup by URL; unknown URLs get an empty results page.
pub struct FixtureFetcher {
    pages: HashMap<String, Canned>,
    log: Arc<FetchLog>,
    gate: Option<Arc<AtomicBool>>,
    on_fetch: Option<RunManager>,
}

impl PageFetcher for FixtureFetcher {
    fn fetch(&mut self, url: &str, _opts: &FetchOptions) -> Result<String, ScraperError> {
        self.log.urls.lock().unwrap().push(url.to_string());

        if let Some(gate) = &self.gate {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !gate.load(Ordering::SeqCst) && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        if let Some(runs) = &self.on_fetch {
            runs.request_stop();
        }

        match self.pages.get(url) {
            Some(Canned::Page(markup)) => Ok(markup.clone()),
            Some(Canned::Fail) => Err(ScraperError::Network("connection reset".into())),
            Some(Canned::Panic) => panic!("renderer crashed"),
            None => Ok(EMPTY_PAGE.to_string()),
        }
    }

    fn close(&mut self) {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default, Clone)]
pub struct FixtureBuilder {
    pages: HashMap<String, Canned>,
    gate: Option<Arc<AtomicBool>>,
    stop_on_fetch: Option<RunManager>,
}

impl FixtureBuilder {
    pub fn page(mut self, url: impl Into<String>, markup: &str) -> Self {
        self.pages.insert(url.into(), Canned::Page(markup.to_string()));
        self
    }

    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Canned::Fail);
        self
    }

    pub fn panicking(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Canned::Panic);
        self
    }

    /// Every fetch blocks until the returned flag is set.
    pub fn gated(mut self) -> (Self, Arc<AtomicBool>) {
        let gate = Arc::new(AtomicBool::new(false));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Every fetch asks `runs` to stop, as a user clicking Stop would.
    pub fn stopping(mut self, runs: &RunManager) -> Self {
        self.stop_on_fetch = Some(runs.clone());
        self
    }

    pub fn factory(self) -> (FetcherFactory, Arc<FetchLog>) {
        let log = Arc::new(FetchLog::default());
        let shared = Arc::clone(&log);
        let factory: FetcherFactory = Arc::new(move || {
            let fetcher: Box<dyn PageFetcher> = Box::new(FixtureFetcher {
                pages: self.pages.clone(),
                log: Arc::clone(&shared),
                gate: self.gate.clone(),
                on_fetch: self.stop_on_fetch.clone(),
            });
            Ok::<_, ScraperError>(fetcher)
        });
        (factory, log)
    }
}

pub fn test_context(fetchers: FetcherFactory) -> AppContext {
    let db = init_test_db();
    let mut config = AppConfig::for_tests();
    config.database_path = db.path().to_string();
    AppContext::new(config, db, fetchers)
}

/// Polls until the run slot leaves Running.
pub fn wait_until_idle(runs: &RunManager) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while runs.is_running() {
        assert!(Instant::now() < deadline, "run did not finish in time");
        std::thread::sleep(Duration::from_millis(10));
    }
}

pub fn read_body(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn read_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&read_body(resp)).unwrap()
}

pub const ACRES99_PAGE: &str = r#"
<html><body>
  <div class="srpTuple__tuple">
    <a class="srpTuple__propertyName" href="/3-bhk-flat-in-whitefield-r1">3 BHK Flat in Whitefield</a>
    <div class="srpTuple__builderName">Prestige Shantiniketan</div>
    <span id="srp_tuple_price">₹ 78 Lac</span>
    <span id="srp_tuple_primary_area">1,450 sq.ft</span>
    <span>RERA Registered</span>
  </div>
  <div class="srpTuple__tuple">
    <a class="srpTuple__propertyName" href="/2-bhk-apartment-in-hebbal-r2">2 BHK Apartment in Hebbal</a>
    <div class="srpTuple__builderName">Sri Lakshmi Homes</div>
    <span id="srp_tuple_price">₹ 62 Lac</span>
  </div>
  <div class="srpTuple__tuple">
    <a class="srpTuple__propertyName" href="/3-bhk-villa-r3">3 BHK Villa in Sarjapur</a>
    <span id="srp_tuple_price">₹ 2.4 Cr</span>
  </div>
</body></html>
"#;

pub const MAGICBRICKS_PAGE: &str = r#"
<html><body><div class="mb-srp__list">
  <div class="mb-srp__card">
    <h2 class="mb-srp__card--title">2 BHK Flat in Sobha Dream Acres</h2>
    <a class="mb-srp__card__society--name" href="/sobha-dream-acres-pdpid-1">Sobha Dream Acres</a>
    <div class="mb-srp__card__price--amount">₹76 Lac</div>
  </div>
</div></body></html>
"#;

pub const HOUSING_PAGE: &str = r#"
<html><body>
  <article data-testid="card-container">
    <a data-q="title" href="/in/buy/resale/page/9-2bhk"><h2 class="title-style">2 BHK Flat in Sobha Dream Acres</h2></a>
    <div data-q="subtitle">Sobha Dream Acres, Panathur</div>
    <div data-q="price">₹76 Lac</div>
  </article>
  <article data-testid="card-container">
    <h2 class="title-style">2 BHK Independent Floor</h2>
    <div data-q="subtitle">Green Nest, Bellandur</div>
    <div data-q="price">₹55 L</div>
  </article>
</body></html>
"#;
