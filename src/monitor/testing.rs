//! In-memory collaborators for engine and scheduler tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use super::Clock;
use crate::notify::{Notifier, NotifyError};
use crate::runtime::{ContainerSummary, StatusError, StatusSource};

/// `m` minutes after a fixed epoch. Negative values are allowed.
pub fn minute(m: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::minutes(m)
}

#[derive(Debug, Default)]
pub struct FakeSource {
    containers: Mutex<Vec<ContainerSummary>>,
    finished_at: Mutex<HashMap<String, DateTime<Utc>>>,
    failing_inspect: Mutex<HashSet<String>>,
    fail_list: AtomicBool,
    inspect_calls: AtomicUsize,
}

impl FakeSource {
    fn id_for(name: &str) -> String {
        format!("id-{name}")
    }

    pub fn insert_with_names(
        &self,
        names: &[&str],
        id: &str,
        state: &str,
        finished_at: DateTime<Utc>,
    ) {
        let mut containers = self.containers.lock().unwrap();
        containers.retain(|c| c.id != id);
        containers.push(ContainerSummary {
            id: id.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            state: state.to_string(),
        });
        self.finished_at
            .lock()
            .unwrap()
            .insert(id.to_string(), finished_at);
    }

    /// Marks `name` as exited, having finished at `finished_at`.
    pub fn stop(&self, name: &str, finished_at: DateTime<Utc>) {
        let qualified = format!("/{name}");
        self.insert_with_names(&[qualified.as_str()], &Self::id_for(name), "exited", finished_at);
    }

    pub fn start(&self, name: &str) {
        self.set_state(name, "running");
    }

    pub fn set_state(&self, name: &str, state: &str) {
        let id = Self::id_for(name);
        let mut containers = self.containers.lock().unwrap();
        match containers.iter_mut().find(|c| c.id == id) {
            Some(container) => container.state = state.to_string(),
            None => containers.push(ContainerSummary {
                id,
                names: vec![format!("/{name}")],
                state: state.to_string(),
            }),
        }
    }

    pub fn remove(&self, name: &str) {
        let id = Self::id_for(name);
        self.containers.lock().unwrap().retain(|c| c.id != id);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inspect(&self, name: &str, fail: bool) {
        let id = Self::id_for(name);
        let mut failing = self.failing_inspect.lock().unwrap();
        if fail {
            failing.insert(id);
        } else {
            failing.remove(&id);
        }
    }

    pub fn inspect_calls(&self) -> usize {
        self.inspect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for FakeSource {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, StatusError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StatusError::Docker(
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 500,
                    message: "daemon unavailable".to_string(),
                },
            ));
        }
        Ok(self.containers.lock().unwrap().clone())
    }

    async fn finished_at(&self, id: &str) -> Result<DateTime<Utc>, StatusError> {
        self.inspect_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_inspect.lock().unwrap().contains(id) {
            return Err(StatusError::MissingFinishedAt(id.to_string()));
        }
        self.finished_at
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .ok_or_else(|| StatusError::MissingFinishedAt(id.to_string()))
    }
}

/// Records delivered messages; can be switched to reject everything.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn fail(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Panics on any message mentioning `trigger`, records the rest.
#[derive(Debug)]
pub struct PanickingNotifier {
    trigger: String,
    inner: RecordingNotifier,
}

impl PanickingNotifier {
    pub fn on(trigger: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            inner: RecordingNotifier::default(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.inner.messages()
    }
}

#[async_trait]
impl Notifier for PanickingNotifier {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        if text.contains(&self.trigger) {
            panic!("notifier failed on {text}");
        }
        self.inner.send_message(text).await
    }
}

/// A clock that only moves when slept on.
#[derive(Debug)]
pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let step = TimeDelta::from_std(duration).expect("sleep duration fits a TimeDelta");
        *self.now.lock().unwrap() += step;
    }
}
