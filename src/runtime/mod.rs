//! Container runtime queries.
//!
//! The monitor only needs two things from the runtime: a snapshot of every
//! container (running or not) and, once per stop episode, the time a
//! container finished.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod docker;

pub use docker::DockerStatusSource;

/// Lifecycle state reported for a stopped container.
pub const EXITED_STATE: &str = "exited";

/// A point-in-time view of one container as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    /// Runtime names, each prefixed with `/`.
    pub names: Vec<String>,
    pub state: String,
}

impl ContainerSummary {
    /// Whether this container carries the configured `name`. Any alias may
    /// match exactly, but only the first alias is checked as a suffix.
    pub fn matches(&self, name: &str) -> bool {
        let qualified = format!("/{name}");
        self.names.iter().any(|n| *n == qualified)
            || self
                .names
                .first()
                .is_some_and(|first| first.ends_with(&qualified))
    }

    pub fn is_exited(&self) -> bool {
        self.state == EXITED_STATE
    }
}

#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Lists every container, stopped ones included.
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, StatusError>;

    /// Authoritative time the container stopped.
    async fn finished_at(&self, id: &str) -> Result<DateTime<Utc>, StatusError>;
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, StatusError> {
        (**self).list_containers().await
    }

    async fn finished_at(&self, id: &str) -> Result<DateTime<Utc>, StatusError> {
        (**self).finished_at(id).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Docker API error: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("Container {0} has no finish time")]
    MissingFinishedAt(String),
    #[error("Container {id} has an invalid finish time {value:?}: {source}")]
    InvalidTimestamp {
        id: String,
        value: String,
        source: chrono::ParseError,
    },
}
