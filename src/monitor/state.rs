use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Where a monitored container is in its stop/alert cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Running,
    StoppedPendingInitial {
        stopped_at: DateTime<Utc>,
    },
    StoppedAlerted {
        stopped_at: DateTime<Utc>,
        last_notified_at: DateTime<Utc>,
    },
}

impl MonitorState {
    pub fn stopped_at(&self) -> Option<DateTime<Utc>> {
        match self {
            MonitorState::Running => None,
            MonitorState::StoppedPendingInitial { stopped_at }
            | MonitorState::StoppedAlerted { stopped_at, .. } => Some(*stopped_at),
        }
    }

    pub fn last_notified_at(&self) -> Option<DateTime<Utc>> {
        match self {
            MonitorState::StoppedAlerted {
                last_notified_at, ..
            } => Some(*last_notified_at),
            MonitorState::Running | MonitorState::StoppedPendingInitial { .. } => None,
        }
    }

    pub fn is_stopped(&self) -> bool {
        !matches!(self, MonitorState::Running)
    }
}

/// Per-container state, keyed by configured name. The key set is fixed when
/// the store is created.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: HashMap<String, MonitorState>,
}

impl StateStore {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inner = names
            .into_iter()
            .map(|name| (name.into(), MonitorState::Running))
            .collect();
        Self { inner }
    }

    pub fn get(&self, name: &str) -> Option<MonitorState> {
        self.inner.get(name).copied()
    }

    /// Replaces the state of a known container. Unknown names are ignored.
    pub fn set(&mut self, name: &str, state: MonitorState) {
        match self.inner.get_mut(name) {
            Some(entry) => *entry = state,
            None => log::debug!("Ignoring state update for unmonitored container {name}"),
        }
    }
}
