//! 설정 관리 -- dockwatch.toml 파싱 및 런타임 설정
//!
//! [`DockwatchConfig`]는 데몬과 Docker 연동 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`DOCKWATCH_DOCKER_ENDPOINT=tcp://10.0.0.1:2375` 형식)
//! 3. 설정 파일 (`dockwatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), dockwatch_core::error::DockwatchError> {
//! use dockwatch_core::config::DockwatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = DockwatchConfig::load("dockwatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = DockwatchConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, DockwatchError};

/// dockwatch 통합 설정
///
/// `dockwatch.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockwatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// Docker 연동 설정
    #[serde(default)]
    pub docker: DockerConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl DockwatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DockwatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에서 시작합니다.
    ///
    /// 파일이 존재하지만 파싱할 수 없는 경우에는 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, DockwatchError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(DockwatchError::Config(ConfigError::FileNotFound { .. })) => {
                warn!(
                    path = %path.display(),
                    "config file not found, using defaults"
                );
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드와 검증 없음).
    ///
    /// 검증은 오버라이드가 적용된 뒤 [`load`](Self::load)에서 한 번만 수행합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DockwatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DockwatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                DockwatchError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, DockwatchError> {
        toml::from_str(toml_str).map_err(|e| {
            DockwatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `DOCKWATCH_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "DOCKWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "DOCKWATCH_GENERAL_LOG_FORMAT");

        // Docker
        override_string(&mut self.docker.endpoint, "DOCKWATCH_DOCKER_ENDPOINT");
        override_string(&mut self.docker.api_version, "DOCKWATCH_DOCKER_API_VERSION");
        override_u64(
            &mut self.docker.backoff_initial_ms,
            "DOCKWATCH_DOCKER_BACKOFF_INITIAL_MS",
        );
        override_u64(
            &mut self.docker.backoff_max_ms,
            "DOCKWATCH_DOCKER_BACKOFF_MAX_MS",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "DOCKWATCH_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "DOCKWATCH_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "DOCKWATCH_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DockwatchError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if !self.docker.api_version.is_empty() && parse_api_version(&self.docker.api_version).is_none()
        {
            return Err(ConfigError::InvalidValue {
                field: "docker.api_version".to_owned(),
                reason: format!(
                    "'{}' is not of the form <major>.<minor>",
                    self.docker.api_version
                ),
            }
            .into());
        }

        if self.docker.backoff_initial_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "docker.backoff_initial_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.docker.backoff_max_ms < self.docker.backoff_initial_ms {
            return Err(ConfigError::InvalidValue {
                field: "docker.backoff_max_ms".to_owned(),
                reason: "must be >= backoff_initial_ms".to_owned(),
            }
            .into());
        }

        if self.docker.backoff_max_ms > MAX_BACKOFF_MS {
            return Err(ConfigError::InvalidValue {
                field: "docker.backoff_max_ms".to_owned(),
                reason: format!("must be at most {MAX_BACKOFF_MS}"),
            }
            .into());
        }

        if self.metrics.enabled {
            if self.metrics.listen_addr.parse::<std::net::IpAddr>().is_err() {
                return Err(ConfigError::InvalidValue {
                    field: "metrics.listen_addr".to_owned(),
                    reason: format!("'{}' is not an IP address", self.metrics.listen_addr),
                }
                .into());
            }
            if self.metrics.port == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "metrics.port".to_owned(),
                    reason: "must be greater than 0".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// Docker 연동 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Docker API 엔드포인트 (비어 있으면 로컬 기본값, `DOCKER_HOST` 반영)
    ///
    /// `unix:///var/run/docker.sock`, `tcp://10.0.0.1:2375`, `10.0.0.1:2375` 형식을 허용합니다.
    pub endpoint: String,
    /// 고정할 API 버전 (예: "1.41", 비어 있으면 기본 버전)
    pub api_version: String,
    /// 이벤트 구독 재연결 초기 간격 (밀리초)
    pub backoff_initial_ms: u64,
    /// 이벤트 구독 재연결 최대 간격 (밀리초)
    pub backoff_max_ms: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_version: String::new(),
            backoff_initial_ms: 1_000,
            backoff_max_ms: 20_000,
        }
    }
}

/// 재연결 최대 간격 상한 (밀리초, 1시간)
pub const MAX_BACKOFF_MS: u64 = 3_600_000;

/// 메트릭 설정
///
/// 활성화되면 데몬이 Prometheus 스크레이프 엔드포인트(`/metrics`)를 엽니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 메트릭 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 바인딩할 주소
    pub listen_addr: String,
    /// 바인딩할 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9464,
        }
    }
}

/// `"1.41"` 형식의 API 버전 문자열을 (major, minor)로 파싱합니다.
pub fn parse_api_version(version: &str) -> Option<(usize, usize)> {
    let (major, minor) = version.trim().split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => *target = true,
            "false" | "0" | "no" => *target = false,
            _ => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
