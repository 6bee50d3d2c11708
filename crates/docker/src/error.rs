//! Docker 연동 에러 타입
//!
//! [`DockerError`]는 런타임 클라이언트 호출, 주소 해석, 설정 검증에서 발생하는
//! 에러를 표현합니다. `From<DockerError> for DockwatchError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use dockwatch_core::error::{ConfigError, DockwatchError};

/// Docker 연동 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    /// Docker 데몬 연결 실패
    #[error("docker connection error: {0}")]
    Connection(String),

    /// Docker API 호출 실패
    #[error("docker api error: {0}")]
    Api(String),

    /// 컨테이너를 찾을 수 없음
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// 주소 해석을 위한 컨테이너 조회 실패
    #[error("lookup failed for container '{container_id}': {source}")]
    LookupFailed {
        /// 조회 대상 컨테이너 ID 또는 이름
        container_id: String,
        /// 조회 실패 원인
        #[source]
        source: Box<DockerError>,
    },

    /// 해석 규칙 중 어느 것도 주소를 내놓지 못함
    #[error("no IP address found for container {0}")]
    NoAddress(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl DockerError {
    /// 조회 실패의 원인이 "컨테이너 없음"인지 확인합니다.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ContainerNotFound(_) => true,
            Self::LookupFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl From<DockerError> for DockwatchError {
    fn from(err: DockerError) -> Self {
        match err {
            DockerError::Config { field, reason } => {
                DockwatchError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => DockwatchError::Docker(other.to_string()),
        }
    }
}
