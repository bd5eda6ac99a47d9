//! Docker status source using bollard.

use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::{
    InspectContainerOptions, InspectContainerOptionsBuilder, ListContainersOptions,
    ListContainersOptionsBuilder,
};
use chrono::{DateTime, Utc};

use super::{ContainerSummary, StatusError, StatusSource};

pub struct DockerStatusSource {
    docker: Docker,
}

impl DockerStatusSource {
    /// Connects using the default connection method (`DOCKER_HOST` when set,
    /// otherwise the local unix socket or named pipe).
    pub fn connect() -> Result<Self, bollard::errors::Error> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl StatusSource for DockerStatusSource {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, StatusError> {
        let options: ListContainersOptions = ListContainersOptionsBuilder::new().all(true).build();

        let containers = self.docker.list_containers(Some(options)).await?;

        Ok(containers
            .into_iter()
            .map(|c| ContainerSummary {
                id: c.id.unwrap_or_default(),
                names: c.names.unwrap_or_default(),
                state: c.state.map(|s| s.to_string()).unwrap_or_default(),
            })
            .collect())
    }

    async fn finished_at(&self, id: &str) -> Result<DateTime<Utc>, StatusError> {
        let options: InspectContainerOptions = InspectContainerOptionsBuilder::new().build();

        let info = self.docker.inspect_container(id, Some(options)).await?;

        let finished_at = info
            .state
            .and_then(|state| state.finished_at)
            .ok_or_else(|| StatusError::MissingFinishedAt(id.to_string()))?;

        parse_finished_at(id, &finished_at)
    }
}

/// Docker reports `FinishedAt` as RFC 3339 with nanosecond precision.
fn parse_finished_at(id: &str, value: &str) -> Result<DateTime<Utc>, StatusError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| StatusError::InvalidTimestamp {
            id: id.to_string(),
            value: value.to_string(),
            source,
        })
}
