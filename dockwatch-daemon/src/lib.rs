//! dockwatch daemon library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `dockwatch-daemon` is used as a binary (main.rs).

pub mod cli;
pub mod logging;
pub mod metrics_server;
pub mod observer;

use dockwatch_core::DockwatchConfig;
use dockwatch_docker::{BollardDockerClient, DockerRuntime, SubscriberConfig};

/// 설정의 `[docker]` 섹션으로 Docker에 연결합니다.
pub async fn connect(
    config: &DockwatchConfig,
) -> anyhow::Result<DockerRuntime<BollardDockerClient>> {
    let subscriber = SubscriberConfig::from_core(&config.docker);
    DockerRuntime::connect(
        &config.docker.endpoint,
        &config.docker.api_version,
        subscriber,
    )
    .await
    .map_err(|e| anyhow::anyhow!("failed to connect to docker: {}", e))
}
