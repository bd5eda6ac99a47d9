//! Stopped-container detection and alert scheduling.

pub mod engine;
pub mod scheduler;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{MonitorEngine, TickReport, Transition};
pub use scheduler::{Clock, POLL_INTERVAL, Scheduler, SystemClock};
pub use state::{MonitorState, StateStore};

use crate::runtime::StatusError;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Failed to list containers: {0}")]
    List(StatusError),
    #[error("Failed to inspect container '{name}': {source}")]
    Inspect { name: String, source: StatusError },
    #[error("Panicked while monitoring '{name}'")]
    Panicked { name: String },
}
