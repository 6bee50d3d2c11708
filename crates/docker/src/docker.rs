//! Docker API abstraction for testability.
//!
//! The [`DockerClient`] trait abstracts the bollard Docker API, allowing
//! production code to use [`BollardDockerClient`] while tests use `MockDockerClient`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   ┌──────────────────┐
//! │EventSubscriber│   │ resolve_container │
//! └───────┬───────┘   └────────┬─────────┘
//!         │                    │
//!         ▼                    ▼
//!       ┌──────────────────────────┐
//!       │      DockerClient        │ (trait)
//!       └──────────────────────────┘
//!             │            │
//!             ▼            ▼
//!         ┌───────┐    ┌──────┐
//!         │Bollard│    │ Mock │
//!         └───┬───┘    └──────┘
//!             │
//!             ▼
//!       Docker Daemon
//! ```
//!
//! # Container Identifier Validation
//!
//! Inspect accepts either a container ID or a container name, so identifiers are
//! checked against the character set Docker allows for both:
//! - Must be 1-128 characters
//! - Must contain only ASCII alphanumerics, `_`, `.` or `-`
//!
//! # Examples
//!
//! ```ignore
//! use dockwatch_docker::{BollardDockerClient, DockerClient};
//!
//! let client = BollardDockerClient::connect("10.0.0.5:2375", None)?;
//! assert_eq!(client.endpoint(), "tcp://10.0.0.5:2375");
//!
//! let details = client.inspect_container("web").await?;
//! # Ok::<(), dockwatch_docker::DockerError>(())
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;

use crate::error::DockerError;
use crate::event::ContainerEvent;
use crate::types::{ContainerDetails, RuntimeVersion};

/// Default Docker socket used when neither an endpoint nor `DOCKER_HOST` is given.
pub const DEFAULT_DOCKER_SOCKET: &str = "unix:///var/run/docker.sock";

/// Request timeout for the Docker connection, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 120;

/// Longest identifier accepted by [`validate_container_ident`].
const MAX_IDENT_LEN: usize = 128;

/// Stream of container events produced by [`DockerClient::events`].
///
/// The stream ends (yields `None`) when the connection drops. An `Err` item
/// means the connection failed mid-stream; consumers treat it the same way.
pub type ContainerEventStream = BoxStream<'static, Result<ContainerEvent, DockerError>>;

/// Validates a container ID or name before it is put into an API path.
///
/// No container can carry an identifier outside this set, so a rejected
/// identifier is reported as `ContainerNotFound`.
fn validate_container_ident(ident: &str) -> Result<(), DockerError> {
    let valid = !ident.is_empty()
        && ident.len() <= MAX_IDENT_LEN
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if !valid {
        tracing::debug!(
            container = ident,
            "rejecting container identifier with disallowed length or characters"
        );
        return Err(DockerError::ContainerNotFound(ident.to_owned()));
    }
    Ok(())
}

/// Prefixes `tcp://` onto endpoints given as bare `host:port`.
///
/// Empty endpoints and endpoints that already carry a scheme are returned unchanged.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.is_empty() || endpoint.contains("://") {
        endpoint.to_owned()
    } else {
        format!("tcp://{endpoint}")
    }
}

/// Trait abstracting the Docker API operations dockwatch relies on.
///
/// The trait is `Send + Sync + 'static`, allowing it to be shared with the
/// background subscription task.
///
/// # Implementations
///
/// - [`BollardDockerClient`]: Production implementation using the `bollard` library
/// - `MockDockerClient`: Test implementation with scripted responses (available in tests only)
///
/// # Error Handling
///
/// - **404 errors**: Converted to `DockerError::ContainerNotFound`
/// - **Connection errors**: Wrapped as `DockerError::Connection`
/// - **Other API failures**: Wrapped as `DockerError::Api`
pub trait DockerClient: Send + Sync + 'static {
    /// Display form of the daemon address this client talks to.
    fn endpoint(&self) -> String;

    /// Lightweight liveness check returning the daemon's version information.
    ///
    /// # Errors
    ///
    /// Returns `DockerError::Connection` if the daemon is unreachable.
    fn version(&self) -> impl Future<Output = Result<RuntimeVersion, DockerError>> + Send;

    /// Inspects a container by ID or name.
    ///
    /// # Errors
    ///
    /// - `DockerError::ContainerNotFound`: Container does not exist (404), or the
    ///   identifier is one no container can have
    /// - `DockerError::Api`: Other API errors
    fn inspect_container(
        &self,
        ident: &str,
    ) -> impl Future<Output = Result<ContainerDetails, DockerError>> + Send;

    /// Opens a long-lived stream of container events.
    ///
    /// # Errors
    ///
    /// Returns `DockerError::Connection` if the stream cannot be established.
    fn events(&self) -> impl Future<Output = Result<ContainerEventStream, DockerError>> + Send;
}

/// Production Docker client implementation using `bollard`.
///
/// Internally uses `Arc<bollard::Docker>` for safe sharing across async tasks.
///
/// # Connection Management
///
/// - Connection timeout: 120 seconds
/// - API version: pinned when given, otherwise the bollard default
/// - Endpoint: `unix://` sockets or `tcp://`/`http://` addresses; bare
///   `host:port` is treated as `tcp://host:port`
pub struct BollardDockerClient {
    docker: Arc<bollard::Docker>,
    endpoint: String,
}

impl BollardDockerClient {
    /// Connects to Docker using the default local socket.
    ///
    /// # Errors
    ///
    /// Returns `DockerError::Connection` if the connection fails
    /// (e.g., socket not found, permission denied, daemon not running).
    pub fn connect_local() -> Result<Self, DockerError> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            DockerError::Connection(format!("failed to connect to docker: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
            endpoint: DEFAULT_DOCKER_SOCKET.to_owned(),
        })
    }

    /// Connects using `DOCKER_HOST` when set, else the default local socket.
    ///
    /// # Errors
    ///
    /// Returns `DockerError::Connection` if the connection fails.
    pub fn connect_from_env(
        api_version: Option<bollard::ClientVersion>,
    ) -> Result<Self, DockerError> {
        match std::env::var("DOCKER_HOST") {
            Ok(host) if !host.is_empty() => Self::connect(&host, api_version),
            _ => match api_version {
                Some(version) => Self::connect(DEFAULT_DOCKER_SOCKET, Some(version)),
                None => Self::connect_local(),
            },
        }
    }

    /// Connects to a specific endpoint, optionally pinning the API version.
    ///
    /// An empty endpoint behaves like [`connect_from_env`](Self::connect_from_env).
    ///
    /// # Errors
    ///
    /// Returns `DockerError::Connection` if the connection fails.
    pub fn connect(
        endpoint: &str,
        api_version: Option<bollard::ClientVersion>,
    ) -> Result<Self, DockerError> {
        if endpoint.is_empty() {
            return Self::connect_from_env(api_version);
        }

        let endpoint = normalize_endpoint(endpoint);
        let version = api_version
            .as_ref()
            .unwrap_or(bollard::API_DEFAULT_VERSION);

        let docker = if endpoint.starts_with("unix://") {
            bollard::Docker::connect_with_socket(&endpoint, CONNECT_TIMEOUT_SECS, version)
        } else {
            bollard::Docker::connect_with_http(&endpoint, CONNECT_TIMEOUT_SECS, version)
        }
        .map_err(|e| {
            DockerError::Connection(format!("failed to connect to docker at {endpoint}: {e}"))
        })?;

        Ok(Self {
            docker: Arc::new(docker),
            endpoint,
        })
    }
}

fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(
        err,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

impl DockerClient for BollardDockerClient {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn version(&self) -> Result<RuntimeVersion, DockerError> {
        let version = self
            .docker
            .version()
            .await
            .map_err(|e| DockerError::Connection(format!("version check failed: {e}")))?;
        Ok(version.into())
    }

    async fn inspect_container(&self, ident: &str) -> Result<ContainerDetails, DockerError> {
        validate_container_ident(ident)?;

        let details = self
            .docker
            .inspect_container(ident, None)
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    DockerError::ContainerNotFound(ident.to_owned())
                } else {
                    DockerError::Api(format!("inspect container failed: {e}"))
                }
            })?;

        Ok(details.into())
    }

    async fn events(&self) -> Result<ContainerEventStream, DockerError> {
        use bollard::system::EventsOptions;

        // The events request is only sent on first poll, so ping first to
        // surface an unreachable daemon as an open failure.
        self.docker
            .ping()
            .await
            .map_err(|e| DockerError::Connection(format!("event stream unavailable: {e}")))?;

        let mut filters = HashMap::new();
        filters.insert("type".to_owned(), vec!["container".to_owned()]);
        let options = EventsOptions::<String> {
            filters,
            ..Default::default()
        };

        let stream = self.docker.events(Some(options)).map(|item| {
            item.map(ContainerEvent::from)
                .map_err(|e| DockerError::Connection(format!("event stream failed: {e}")))
        });
        Ok(stream.boxed())
    }
}

/// Scripted outcome of one `events()` call on the mock client.
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum EventScript {
    /// Opening the stream fails.
    Fail,
    /// The stream opens, yields `events`, stays open for `hold`, then ends.
    Stream {
        /// Events yielded immediately after opening
        events: Vec<ContainerEvent>,
        /// How long the stream stays open after the last event
        hold: std::time::Duration,
    },
    /// The stream opens, yields `events`, then an error item, then nothing ever again.
    Broken {
        /// Events yielded before the error
        events: Vec<ContainerEvent>,
    },
}

/// 테스트용 Mock Docker 클라이언트
///
/// 설정 가능한 응답을 반환하여 Docker 없이도 테스트할 수 있습니다.
/// 이벤트 스크립트가 소진되면 `events()`는 끝나지 않는 스트림을 반환합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockDockerClient {
    /// inspect_container 호출 시 조회할 컨테이너 목록
    pub containers: Vec<ContainerDetails>,
    /// 설정되면 inspect가 이 메시지로 `Api` 에러를 반환
    pub inspect_error: Option<String>,
    /// version 호출 실패 여부
    pub version_fails: bool,
    /// 모든 events 호출을 실패시킬지 여부
    pub events_always_fail: bool,
    scripts: std::sync::Mutex<std::collections::VecDeque<EventScript>>,
    event_calls: std::sync::Mutex<Vec<tokio::time::Instant>>,
    inspect_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockDockerClient {
    /// 빈 mock 클라이언트를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 테스트용 컨테이너를 추가합니다.
    pub fn with_containers(mut self, containers: Vec<ContainerDetails>) -> Self {
        self.containers = containers;
        self
    }

    /// inspect 호출이 API 에러로 실패하도록 설정합니다.
    pub fn with_failing_inspect(mut self, message: impl Into<String>) -> Self {
        self.inspect_error = Some(message.into());
        self
    }

    /// version 호출이 실패하도록 설정합니다.
    pub fn with_failing_version(mut self) -> Self {
        self.version_fails = true;
        self
    }

    /// events 호출이 항상 실패하도록 설정합니다.
    pub fn with_failing_events(mut self) -> Self {
        self.events_always_fail = true;
        self
    }

    /// events 호출 결과를 순서대로 지정합니다.
    pub fn with_event_script(self, script: Vec<EventScript>) -> Self {
        *self.scripts.lock().unwrap() = script.into();
        self
    }

    /// events가 호출된 시각 목록을 반환합니다.
    pub fn event_call_times(&self) -> Vec<tokio::time::Instant> {
        self.event_calls.lock().unwrap().clone()
    }

    /// inspect 호출 횟수를 반환합니다.
    pub fn inspect_calls(&self) -> usize {
        self.inspect_calls
            .load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl DockerClient for MockDockerClient {
    fn endpoint(&self) -> String {
        "mock://docker".to_owned()
    }

    async fn version(&self) -> Result<RuntimeVersion, DockerError> {
        if self.version_fails {
            return Err(DockerError::Connection("mock daemon unreachable".to_owned()));
        }
        Ok(RuntimeVersion {
            version: "27.3.1".to_owned(),
            api_version: "1.47".to_owned(),
            os: "linux".to_owned(),
            arch: "amd64".to_owned(),
        })
    }

    async fn inspect_container(&self, ident: &str) -> Result<ContainerDetails, DockerError> {
        self.inspect_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(message) = &self.inspect_error {
            return Err(DockerError::Api(message.clone()));
        }
        self.containers
            .iter()
            .find(|c| c.id == ident || c.name == ident)
            .cloned()
            .ok_or_else(|| DockerError::ContainerNotFound(ident.to_owned()))
    }

    async fn events(&self) -> Result<ContainerEventStream, DockerError> {
        self.event_calls
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());

        if self.events_always_fail {
            return Err(DockerError::Connection("mock connection refused".to_owned()));
        }

        let next = self.scripts.lock().unwrap().pop_front();
        match next {
            None => Ok(futures::stream::pending().boxed()),
            Some(EventScript::Fail) => {
                Err(DockerError::Connection("mock connection refused".to_owned()))
            }
            Some(EventScript::Stream { events, hold }) => {
                let tail = futures::stream::once(async move {
                    tokio::time::sleep(hold).await;
                    None
                })
                .filter_map(futures::future::ready);
                Ok(futures::stream::iter(events.into_iter().map(Ok))
                    .chain(tail)
                    .boxed())
            }
            Some(EventScript::Broken { events }) => {
                let failure = DockerError::Connection("mock connection reset".to_owned());
                Ok(futures::stream::iter(events.into_iter().map(Ok))
                    .chain(futures::stream::iter([Err(failure)]))
                    .chain(futures::stream::pending())
                    .boxed())
            }
        }
    }
}
