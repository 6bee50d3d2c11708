//! Docker 런타임 파사드 -- 연결 확인, 상태 문자열, 컨테이너 조회, 이벤트 구독
//!
//! [`DockerRuntime`]은 [`DockerClient`] 구현 하나를 감싸고 데몬이 쓰는
//! 작업들을 한곳에 모읍니다.
//!
//! # 사용 예시
//! ```ignore
//! use std::sync::Arc;
//! use dockwatch_docker::{DockerRuntime, SubscriberConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let runtime = DockerRuntime::connect("", "", SubscriberConfig::default()).await?;
//! println!("{}", runtime.info().await);
//!
//! let cancel = CancellationToken::new();
//! let handle = runtime.add_observer(Arc::new(my_observer), cancel.clone());
//! ```

use std::sync::Arc;

use dockwatch_core::config::parse_api_version;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::address::resolve_container_address;
use crate::config::SubscriberConfig;
use crate::docker::{BollardDockerClient, DockerClient};
use crate::error::DockerError;
use crate::observer::ContainerObserver;
use crate::subscriber::EventSubscriber;
use crate::types::RuntimeVersion;

/// Docker 런타임 파사드
pub struct DockerRuntime<D: DockerClient> {
    docker: Arc<D>,
    subscriber: EventSubscriber<D>,
}

impl DockerRuntime<BollardDockerClient> {
    /// 엔드포인트에 연결하고 데몬이 응답하는지 확인합니다.
    ///
    /// `endpoint`가 비어 있으면 `DOCKER_HOST` 또는 로컬 소켓을 사용하고,
    /// 스킴이 없으면 `tcp://`로 간주합니다. `api_version`은 `"1.41"` 형식이며
    /// 비어 있으면 클라이언트 기본 버전을 사용합니다.
    pub async fn connect(
        endpoint: &str,
        api_version: &str,
        config: SubscriberConfig,
    ) -> Result<Self, DockerError> {
        let client = BollardDockerClient::connect(endpoint, client_version(api_version)?)?;
        Self::checked(client, config).await
    }

    /// `DOCKER_HOST` 또는 로컬 소켓에 연결하고 데몬이 응답하는지 확인합니다.
    ///
    /// `api_version`은 [`connect`](Self::connect)와 같은 형식입니다.
    pub async fn from_env(
        api_version: &str,
        config: SubscriberConfig,
    ) -> Result<Self, DockerError> {
        let client = BollardDockerClient::connect_from_env(client_version(api_version)?)?;
        Self::checked(client, config).await
    }
}

/// `"1.41"` 형식을 bollard 버전으로 바꿉니다. 빈 문자열은 기본 버전입니다.
fn client_version(api_version: &str) -> Result<Option<bollard::ClientVersion>, DockerError> {
    if api_version.is_empty() {
        return Ok(None);
    }
    let (major, minor) = parse_api_version(api_version).ok_or_else(|| DockerError::Config {
        field: "api_version".to_owned(),
        reason: format!("expected MAJOR.MINOR, got '{api_version}'"),
    })?;
    Ok(Some(bollard::ClientVersion {
        major_version: major,
        minor_version: minor,
    }))
}

impl<D: DockerClient> DockerRuntime<D> {
    /// 클라이언트를 감쌉니다 (연결 확인 없음).
    pub fn new(docker: Arc<D>, config: SubscriberConfig) -> Self {
        let subscriber = EventSubscriber::new(Arc::clone(&docker), config);
        Self { docker, subscriber }
    }

    /// 클라이언트를 감싸고 `version()` 호출로 데몬 연결을 확인합니다.
    pub async fn checked(docker: D, config: SubscriberConfig) -> Result<Self, DockerError> {
        config.validate()?;
        let runtime = Self::new(Arc::new(docker), config);
        let version = runtime.check_working().await?;
        info!(
            endpoint = %runtime.docker.endpoint(),
            version = %version.version,
            api_version = %version.api_version,
            "connected to docker"
        );
        Ok(runtime)
    }

    /// 데몬 버전 조회로 연결 상태를 확인합니다.
    pub async fn check_working(&self) -> Result<RuntimeVersion, DockerError> {
        self.docker.version().await
    }

    /// 사람이 읽을 수 있는 연결 상태 문자열을 반환합니다.
    pub async fn info(&self) -> String {
        match self.docker.version().await {
            Ok(version) => format!("Docker API on {}: {version}", self.docker.endpoint()),
            Err(e) => format!("Docker API error: {e}"),
        }
    }

    /// 컨테이너가 실행 중이 아님을 Docker로 확인했으면 `true`를 반환합니다.
    ///
    /// 컨테이너가 없으면 `true`, 조회 자체가 실패하면 판단할 수 없으므로 `false`입니다.
    pub async fn is_container_not_running(&self, container_ident: &str) -> bool {
        match self.docker.inspect_container(container_ident).await {
            Ok(details) => details.is_not_running(),
            Err(e) if e.is_not_found() => true,
            Err(e) => {
                error!(
                    container = container_ident,
                    error = %e,
                    "could not check container status"
                );
                false
            }
        }
    }

    /// 컨테이너에 도달할 수 있는 IP 주소를 찾습니다.
    pub async fn container_ip(&self, container_ident: &str) -> Result<String, DockerError> {
        resolve_container_address(self.docker.as_ref(), container_ident).await
    }

    /// 컨테이너 이벤트 옵저버를 등록합니다. 호출마다 독립된 구독 루프가 시작됩니다.
    pub fn add_observer(
        &self,
        observer: Arc<dyn ContainerObserver>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        self.subscriber.subscribe(observer, cancel)
    }

    /// 내부 클라이언트를 반환합니다.
    pub fn client(&self) -> &Arc<D> {
        &self.docker
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::docker::{EventScript, MockDockerClient};
    use crate::event::ContainerEvent;
    use crate::types::{ContainerDetails, ContainerNetworkInfo, ContainerState};

    fn container(id: &str, running: bool, restarting: bool) -> ContainerDetails {
        ContainerDetails {
            id: id.to_owned(),
            name: format!("{id}-name"),
            state: ContainerState {
                running,
                restarting,
            },
            network: ContainerNetworkInfo {
                networks: None,
                ip_address: "10.0.0.5".to_owned(),
                network_mode: "default".to_owned(),
            },
        }
    }

    fn runtime(client: MockDockerClient) -> DockerRuntime<MockDockerClient> {
        DockerRuntime::new(Arc::new(client), SubscriberConfig::default())
    }

    #[tokio::test]
    async fn checked_fails_when_daemon_unreachable() {
        let result =
            DockerRuntime::checked(MockDockerClient::new().with_failing_version(), SubscriberConfig::default())
                .await;
        assert!(matches!(result, Err(DockerError::Connection(_))));
    }

    #[tokio::test]
    async fn checked_rejects_invalid_config() {
        let config = SubscriberConfig {
            initial_interval: Duration::ZERO,
            ..Default::default()
        };
        let result = DockerRuntime::checked(MockDockerClient::new(), config).await;
        assert!(matches!(result, Err(DockerError::Config { .. })));
    }

    #[tokio::test]
    async fn connect_rejects_malformed_api_version() {
        let result = DockerRuntime::connect("127.0.0.1:2375", "v1", SubscriberConfig::default()).await;
        assert!(matches!(result, Err(DockerError::Config { ref field, .. }) if field == "api_version"));
    }

    #[tokio::test]
    async fn from_env_rejects_malformed_api_version() {
        let result = DockerRuntime::from_env("latest", SubscriberConfig::default()).await;
        assert!(matches!(result, Err(DockerError::Config { ref field, .. }) if field == "api_version"));
    }

    #[test]
    fn client_version_parses_pinned_version() {
        let version = client_version("1.41").unwrap().unwrap();
        assert_eq!((version.major_version, version.minor_version), (1, 41));
        assert!(client_version("").unwrap().is_none());
    }

    #[tokio::test]
    async fn impossible_identifier_counts_as_not_running() {
        // the identifier is rejected before any request, so no daemon is needed
        let client = BollardDockerClient::connect("127.0.0.1:1", None).unwrap();
        let runtime = DockerRuntime::new(Arc::new(client), SubscriberConfig::default());
        assert!(runtime.is_container_not_running("no such container").await);
        assert!(
            runtime
                .container_ip("no such container")
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn info_reports_endpoint_and_version() {
        let runtime = DockerRuntime::checked(MockDockerClient::new(), SubscriberConfig::default())
            .await
            .unwrap();
        let info = runtime.info().await;
        assert!(info.starts_with("Docker API on mock://docker: "));
        assert!(info.contains("27.3.1"));
    }

    #[tokio::test]
    async fn info_reports_errors() {
        let runtime = runtime(MockDockerClient::new().with_failing_version());
        assert!(runtime.info().await.starts_with("Docker API error: "));
    }

    #[tokio::test]
    async fn not_running_checks() {
        let runtime = runtime(MockDockerClient::new().with_containers(vec![
            container("running", true, false),
            container("stopped", false, false),
            container("restarting", true, true),
        ]));
        assert!(!runtime.is_container_not_running("running").await);
        assert!(runtime.is_container_not_running("stopped").await);
        assert!(runtime.is_container_not_running("restarting").await);
        assert!(runtime.is_container_not_running("missing").await);
    }

    #[tokio::test]
    async fn not_running_is_false_when_lookup_errors() {
        let runtime = runtime(MockDockerClient::new().with_failing_inspect("500 server error"));
        assert!(!runtime.is_container_not_running("anything").await);
    }

    #[tokio::test]
    async fn container_ip_uses_resolution_rules() {
        let runtime = runtime(
            MockDockerClient::new().with_containers(vec![container("legacy", true, false)]),
        );
        assert_eq!(runtime.container_ip("legacy").await.unwrap(), "10.0.0.5");
        assert!(runtime.container_ip("missing").await.unwrap_err().is_not_found());
    }

    struct CountingObserver {
        started: AtomicUsize,
        died: AtomicUsize,
    }

    impl ContainerObserver for CountingObserver {
        fn container_started(&self, _container_id: &str) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn container_died(&self, _container_id: &str) {
            self.died.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn add_observer_receives_events() {
        let runtime = runtime(MockDockerClient::new().with_event_script(vec![
            EventScript::Stream {
                events: vec![
                    ContainerEvent::started("a"),
                    ContainerEvent::started("b"),
                    ContainerEvent::died("a"),
                ],
                hold: Duration::from_secs(3600),
            },
        ]));
        let observer = Arc::new(CountingObserver {
            started: AtomicUsize::new(0),
            died: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();

        let handle = runtime.add_observer(observer.clone(), cancel.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(observer.started.load(Ordering::SeqCst), 2);
        assert_eq!(observer.died.load(Ordering::SeqCst), 1);

        cancel.cancel();
        handle.await.unwrap();
    }
}
