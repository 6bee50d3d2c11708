//! 컨테이너 이벤트를 로그로 남기는 옵저버

use std::sync::atomic::{AtomicU64, Ordering};

use dockwatch_docker::ContainerObserver;
use tracing::info;

/// 시작/종료 이벤트를 `info` 레벨로 기록하고 개수를 셉니다.
#[derive(Debug, Default)]
pub struct LoggingObserver {
    started: AtomicU64,
    died: AtomicU64,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 받은 (시작, 종료) 이벤트 수
    pub fn counts(&self) -> (u64, u64) {
        (
            self.started.load(Ordering::Relaxed),
            self.died.load(Ordering::Relaxed),
        )
    }
}

impl ContainerObserver for LoggingObserver {
    fn container_started(&self, container_id: &str) {
        self.started.fetch_add(1, Ordering::Relaxed);
        info!(container_id, "container started");
    }

    fn container_died(&self, container_id: &str) {
        self.died.fetch_add(1, Ordering::Relaxed);
        info!(container_id, "container died");
    }
}
