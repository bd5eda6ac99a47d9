use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;

use super::MonitorError;
use super::state::{MonitorState, StateStore};
use crate::config::{ContainerMonitorConfig, MonitoredContainers};
use crate::notify::{self, Notifier};
use crate::runtime::{ContainerSummary, StatusSource};

/// What happened to one container during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The container is not in the current snapshot; its state is kept.
    NotFound,
    /// Running and still running.
    Unchanged,
    /// Stopped, but no threshold has been reached yet.
    Waiting { dwell_minutes: i64 },
    InitialAlert { dwell_minutes: i64 },
    RepeatAlert { dwell_minutes: i64 },
    Recovered,
}

impl Transition {
    pub fn notified(&self) -> bool {
        matches!(
            self,
            Transition::InitialAlert { .. } | Transition::RepeatAlert { .. } | Transition::Recovered
        )
    }
}

/// Per-container results of a single tick, in container name order.
#[derive(Debug, Default)]
pub struct TickReport {
    pub results: Vec<(String, Result<Transition, MonitorError>)>,
}

impl TickReport {
    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.results
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, result)| result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &MonitorError)> {
        self.results
            .iter()
            .filter_map(|(name, result)| result.as_ref().err().map(|e| (name.as_str(), e)))
    }

    pub fn notifications(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, result)| result.as_ref().is_ok_and(Transition::notified))
            .count()
    }
}

/// Decides when to alert about stopped containers.
pub struct MonitorEngine<S, N> {
    containers: MonitoredContainers,
    store: StateStore,
    source: S,
    notifier: N,
}

impl<S, N> MonitorEngine<S, N>
where
    S: StatusSource,
    N: Notifier,
{
    pub fn new(containers: MonitoredContainers, source: S, notifier: N) -> Self {
        let store = StateStore::new(containers.keys().cloned());
        Self {
            containers,
            store,
            source,
            notifier,
        }
    }

    pub fn state(&self, name: &str) -> Option<MonitorState> {
        self.store.get(name)
    }

    /// Lists containers once and reconciles every monitored container
    /// against the snapshot. Only a failed listing fails the whole tick; a
    /// panic while handling one container is recorded as that container's
    /// error and the rest are still processed.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport, MonitorError> {
        let snapshot = self
            .source
            .list_containers()
            .await
            .map_err(MonitorError::List)?;

        let Self {
            containers,
            store,
            source,
            notifier,
        } = self;

        let mut report = TickReport::default();
        for (name, config) in containers.iter() {
            let result = AssertUnwindSafe(reconcile(
                store, &*source, &*notifier, name, config, &snapshot, now,
            ))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(MonitorError::Panicked { name: name.clone() }));
            report.results.push((name.clone(), result));
        }
        Ok(report)
    }
}

async fn reconcile<S, N>(
    store: &mut StateStore,
    source: &S,
    notifier: &N,
    name: &str,
    config: &ContainerMonitorConfig,
    snapshot: &[ContainerSummary],
    now: DateTime<Utc>,
) -> Result<Transition, MonitorError>
where
    S: StatusSource,
    N: Notifier,
{
    let Some(container) = snapshot.iter().find(|c| c.matches(name)) else {
        log::warn!("Container '{name}' not found");
        return Ok(Transition::NotFound);
    };

    let state = store.get(name).unwrap_or_default();

    if !container.is_exited() {
        if !state.is_stopped() {
            return Ok(Transition::Unchanged);
        }
        log::info!("Container '{name}' is running again ({})", container.state);
        notify::deliver(notifier, &notify::recovered_message(name, &container.state)).await;
        store.set(name, MonitorState::Running);
        return Ok(Transition::Recovered);
    }

    let stopped_at = match state.stopped_at() {
        Some(stopped_at) => stopped_at,
        None => {
            let stopped_at = source
                .finished_at(&container.id)
                .await
                .map_err(|source| MonitorError::Inspect {
                    name: name.to_string(),
                    source,
                })?;
            log::info!("Container '{name}' stopped at {stopped_at}");
            store.set(name, MonitorState::StoppedPendingInitial { stopped_at });
            stopped_at
        }
    };

    let dwell = now - stopped_at;
    let dwell_minutes = dwell.num_minutes();

    let transition = match state.last_notified_at() {
        None if dwell >= config.initial_alert() => Transition::InitialAlert { dwell_minutes },
        Some(last_notified_at) if now - last_notified_at >= config.repeat_alert() => {
            Transition::RepeatAlert { dwell_minutes }
        }
        _ => return Ok(Transition::Waiting { dwell_minutes }),
    };

    let message = notify::stopped_message(name, &container.state, dwell_minutes);
    if !notify::deliver(notifier, &message).await {
        log::warn!("Alert for '{name}' was not delivered, next alert follows the repeat interval");
    }
    store.set(
        name,
        MonitorState::StoppedAlerted {
            stopped_at,
            last_notified_at: now,
        },
    );
    Ok(transition)
}
