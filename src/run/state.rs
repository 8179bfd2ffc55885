use crate::domain::{aggregate, CanonicalListing, Source};
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// How a run left the Running phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Ran to the end. `unreachable` names sources that never loaded a page.
    Completed { unreachable: Vec<Source> },
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RunState {
    pub phase: RunPhase,
    pub current_source: Option<Source>,
    pub message: String,
    pub pages_done: u32,
    pub pages_total: u32,
    /// Validated listings in arrival order, before dedup.
    pub accumulated: Vec<CanonicalListing>,
    pub results: Option<Vec<CanonicalListing>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            phase: RunPhase::Idle,
            current_source: None,
            message: "Ready".to_string(),
            pages_done: 0,
            pages_total: 0,
            accumulated: Vec::new(),
            results: None,
            started_at: None,
            finished_at: None,
        }
    }
}

impl RunState {
    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Whole percent of planned pages done. 100 once the run has ended.
    pub fn progress(&self) -> u8 {
        match self.phase {
            RunPhase::Idle => 0,
            RunPhase::Running if self.pages_total == 0 => 0,
            RunPhase::Running => {
                let pct = u64::from(self.pages_done) * 100 / u64::from(self.pages_total);
                pct.min(100) as u8
            }
            _ => 100,
        }
    }
}

/// What `GET /status` answers with.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub running: bool,
    pub phase: RunPhase,
    pub progress: u8,
    pub message: String,
    pub current_site: Option<String>,
    pub properties_found: usize,
    pub results: Option<Vec<CanonicalListing>>,
}

impl From<&RunState> for StatusView {
    fn from(state: &RunState) -> Self {
        Self {
            running: state.is_running(),
            phase: state.phase,
            progress: state.progress(),
            message: state.message.clone(),
            current_site: state.current_source.map(|s| s.label().to_string()),
            properties_found: state
                .results
                .as_ref()
                .filter(|_| !state.is_running())
                .map_or(state.accumulated.len(), Vec::len),
            results: state.results.clone(),
        }
    }
}

/// Owner of the single run slot. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct RunManager {
    state: Arc<Mutex<RunState>>,
    cancel: Arc<AtomicBool>,
}

impl RunManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        // a panicked worker leaves plain data behind, still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Idle or terminal → Running. Fails while another run is active.
    pub fn begin(&self, pages_total: u32) -> Result<RunHandle, ServerError> {
        let mut state = self.lock();
        if state.is_running() {
            return Err(ServerError::RunConflict);
        }

        *state = RunState {
            phase: RunPhase::Running,
            message: "Starting search...".to_string(),
            pages_total,
            started_at: Some(Utc::now()),
            ..RunState::default()
        };
        self.cancel.store(false, Ordering::SeqCst);

        Ok(RunHandle {
            state: Arc::clone(&self.state),
            cancel: Arc::clone(&self.cancel),
        })
    }

    /// Fails a run whose worker never started.
    pub fn abort(&self, reason: &str) {
        let handle = RunHandle {
            state: Arc::clone(&self.state),
            cancel: Arc::clone(&self.cancel),
        };
        handle.finish(RunOutcome::Failed(reason.to_string()));
    }

    pub fn snapshot(&self) -> RunState {
        self.lock().clone()
    }

    pub fn status(&self) -> StatusView {
        StatusView::from(&*self.lock())
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_running()
    }

    /// Raises the cancel flag. Returns false when nothing is running.
    pub fn request_stop(&self) -> bool {
        let mut state = self.lock();
        if !state.is_running() {
            return false;
        }
        self.cancel.store(true, Ordering::SeqCst);
        state.message = "Stopping...".to_string();
        true
    }

    /// Final results, if any exist and are non-empty.
    pub fn results(&self) -> Option<Vec<CanonicalListing>> {
        self.lock().results.clone().filter(|r| !r.is_empty())
    }

    /// Swaps in imported results. Refused while a run is active.
    pub fn replace_results(&self, listings: Vec<CanonicalListing>) -> Result<(), ServerError> {
        let mut state = self.lock();
        if state.is_running() {
            return Err(ServerError::RunConflict);
        }
        state.message = format!("Imported {} properties from CSV", listings.len());
        state.results = Some(listings);
        Ok(())
    }
}

/// The worker's side of the run slot.
pub struct RunHandle {
    state: Arc<Mutex<RunState>>,
    cancel: Arc<AtomicBool>,
}

impl RunHandle {
    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn set_source(&self, source: Source) {
        self.lock().current_source = Some(source);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let mut state = self.lock();
        // keep "Stopping..." visible once requested
        if !self.is_cancelled() {
            state.message = message.into();
        }
    }

    /// Marks `n` more planned pages as done.
    pub fn pages_done(&self, n: u32) {
        let mut state = self.lock();
        state.pages_done = state.pages_done.saturating_add(n).min(state.pages_total);
    }

    pub fn push_listing(&self, listing: CanonicalListing) {
        self.lock().accumulated.push(listing);
    }

    /// Aggregates what was collected and leaves the Running phase.
    /// Returns the number of final results.
    pub fn finish(self, outcome: RunOutcome) -> usize {
        let mut state = self.lock();
        let results = aggregate(&state.accumulated);
        let count = results.len();

        let (phase, message) = match outcome {
            RunOutcome::Completed { unreachable } if unreachable.is_empty() => (
                RunPhase::Completed,
                format!("Completed! Found {count} properties"),
            ),
            RunOutcome::Completed { unreachable } => (
                RunPhase::Completed,
                format!(
                    "Completed! Found {count} properties ({} unreachable)",
                    source_labels(&unreachable)
                ),
            ),
            RunOutcome::Cancelled => (RunPhase::Cancelled, "Search stopped by user".to_string()),
            RunOutcome::Failed(e) => (RunPhase::Failed, format!("Error: {e}")),
        };

        state.phase = phase;
        state.message = message;
        state.current_source = None;
        state.results = Some(results);
        state.finished_at = Some(Utc::now());
        count
    }
}

/// "MagicBricks, Housing.com"
pub fn source_labels(sources: &[Source]) -> String {
    sources.iter().map(|s| s.label()).collect::<Vec<_>>().join(", ")
}
