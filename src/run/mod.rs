//! The single background search run: its shared state and the worker
//! thread that drives the orchestrator.

pub mod state;
pub mod worker;

pub use state::{RunHandle, RunManager, RunOutcome, RunPhase, RunState, StatusView};
pub use worker::{spawn_run, RunEnv};
