//! 이벤트 구독 설정
//!
//! [`SubscriberConfig`]는 core의 [`DockerConfig`](dockwatch_core::config::DockerConfig)에서
//! 재연결 백오프 관련 값을 가져옵니다.
//!
//! # 사용 예시
//! ```ignore
//! use dockwatch_core::config::DockwatchConfig;
//! use dockwatch_docker::config::SubscriberConfig;
//!
//! let core_config = DockwatchConfig::default();
//! let config = SubscriberConfig::from_core(&core_config.docker);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DockerError;

/// 기본 재연결 초기 간격
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_secs(1);

/// 기본 재연결 최대 간격
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(20);

/// 설정 상한값 (core 설정 검증과 같은 값)
const MAX_INTERVAL_CEILING: Duration =
    Duration::from_millis(dockwatch_core::config::MAX_BACKOFF_MS);

/// 이벤트 구독 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberConfig {
    /// 재연결 초기 간격
    pub initial_interval: Duration,
    /// 재연결 최대 간격
    pub max_interval: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            initial_interval: DEFAULT_INITIAL_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }
}

impl SubscriberConfig {
    /// core의 `DockerConfig`에서 구독 설정을 생성합니다.
    pub fn from_core(core: &dockwatch_core::config::DockerConfig) -> Self {
        Self {
            initial_interval: Duration::from_millis(core.backoff_initial_ms),
            max_interval: Duration::from_millis(core.backoff_max_ms),
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DockerError> {
        if self.initial_interval.is_zero() {
            return Err(DockerError::Config {
                field: "initial_interval".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.max_interval < self.initial_interval {
            return Err(DockerError::Config {
                field: "max_interval".to_owned(),
                reason: "must be >= initial_interval".to_owned(),
            });
        }

        if self.max_interval > MAX_INTERVAL_CEILING {
            return Err(DockerError::Config {
                field: "max_interval".to_owned(),
                reason: format!("must be at most {}s", MAX_INTERVAL_CEILING.as_secs()),
            });
        }

        Ok(())
    }
}

/// 구독 설정 빌더
#[derive(Default)]
pub struct SubscriberConfigBuilder {
    config: SubscriberConfig,
}

impl SubscriberConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 재연결 초기 간격을 설정합니다.
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.config.initial_interval = interval;
        self
    }

    /// 재연결 최대 간격을 설정합니다.
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.config.max_interval = interval;
        self
    }

    /// 설정을 검증하고 `SubscriberConfig`를 생성합니다.
    pub fn build(self) -> Result<SubscriberConfig, DockerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
