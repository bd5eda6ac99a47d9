//! Everything that happens between process start and the first tick.

use crate::config::{ConfigError, MonitorConfig, MonitoredContainers};
use crate::monitor::{Clock, MonitorEngine, Scheduler};
use crate::notify::{self, Notifier};
use crate::runtime::StatusSource;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Unable to connect to Docker: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("Unable to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reads the configuration, builds the collaborators with `connect` and
/// sends the startup notification. The returned scheduler has not run a
/// tick yet. Configuration errors are returned before `connect` is called.
pub async fn prepare<L, F, S, N, C>(
    lookup: L,
    connect: F,
    clock: C,
) -> Result<Scheduler<S, N, C>, StartupError>
where
    L: Fn(&str) -> Option<String>,
    F: FnOnce(&MonitorConfig) -> Result<(S, N), StartupError>,
    S: StatusSource,
    N: Notifier,
    C: Clock,
{
    log::info!("Docker container monitor starting...");

    let config = MonitorConfig::from_lookup(lookup)?;
    log_monitored(&config.containers);

    let (source, notifier) = connect(&config)?;

    let startup = notify::startup_message(config.containers.keys().map(String::as_str));
    if notify::deliver(&notifier, &startup).await {
        log::info!("Startup notification sent");
    }

    let engine = MonitorEngine::new(config.containers, source, notifier);
    Ok(Scheduler::new(engine, clock))
}

fn log_monitored(containers: &MonitoredContainers) {
    if containers.is_empty() {
        log::warn!("No containers configured for monitoring");
        return;
    }
    log::info!("Monitoring containers:");
    for (name, thresholds) in containers {
        log::info!(
            " - {name}: first alert after {} min, repeat every {} min",
            thresholds.initial_alert_minutes,
            thresholds.repeat_alert_minutes
        );
    }
}
