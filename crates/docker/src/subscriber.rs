//! 이벤트 구독 -- Docker 이벤트 스트림 감시 및 자동 재연결
//!
//! [`EventSubscriber`]는 `subscribe` 호출마다 백그라운드 태스크 하나를 띄워
//! 이벤트 스트림을 열고, `start`/`die` 이벤트를 옵저버 호출로 바꿉니다.
//!
//! # 재연결 흐름
//! ```text
//!        ┌──────────── open events() ◄────────────┐
//!        │ Err                 │ Ok               │
//!        ▼                     ▼                  │
//!   log + failure       consume until end         │
//!        │              (reset if long-lived)     │
//!        └──────────► sleep(backoff), grow ───────┘
//! ```
//!
//! 스트림 열기 실패와 스트림 종료는 모두 일시적 장애로 보고 항상 재시도합니다.
//! 루프는 [`CancellationToken`]이 취소될 때만 끝납니다.

use std::sync::Arc;

use futures::StreamExt;
use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use dockwatch_core::metrics as m;

use crate::backoff::ReconnectBackoff;
use crate::config::SubscriberConfig;
use crate::docker::DockerClient;
use crate::event::{ContainerEvent, ContainerEventKind};
use crate::observer::ContainerObserver;

/// Docker 이벤트 구독기
///
/// 같은 인스턴스에서 `subscribe`를 여러 번 호출하면 각자 독립된 상태를 가진
/// 루프가 추가로 실행되며, 옵저버는 같은 이벤트를 여러 번 받을 수 있습니다.
pub struct EventSubscriber<D: DockerClient> {
    docker: Arc<D>,
    config: SubscriberConfig,
}

impl<D: DockerClient> EventSubscriber<D> {
    /// 새 구독기를 생성합니다.
    pub fn new(docker: Arc<D>, config: SubscriberConfig) -> Self {
        Self { docker, config }
    }

    /// 구독 설정을 반환합니다.
    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    /// 백그라운드 구독 루프를 시작하고 즉시 반환합니다.
    ///
    /// 스트림 연결 실패는 호출자에게 전달되지 않고 내부에서 재시도됩니다.
    /// 반환된 핸들은 `cancel`이 취소된 뒤에 완료됩니다.
    pub fn subscribe(
        &self,
        observer: Arc<dyn ContainerObserver>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let docker = Arc::clone(&self.docker);
        let backoff = ReconnectBackoff::new(self.config.initial_interval, self.config.max_interval);
        tokio::spawn(run_subscription(docker, observer, backoff, cancel))
    }
}

async fn run_subscription<D: DockerClient>(
    docker: Arc<D>,
    observer: Arc<dyn ContainerObserver>,
    mut backoff: ReconnectBackoff,
    cancel: CancellationToken,
) {
    loop {
        let opened = tokio::select! {
            _ = cancel.cancelled() => break,
            result = docker.events() => result,
        };

        match opened {
            Err(e) => {
                counter!(m::DOCKER_STREAM_FAILURES_TOTAL).increment(1);
                error!(
                    endpoint = %docker.endpoint(),
                    error = %e,
                    retry_in_ms = millis(&backoff),
                    "unable to subscribe to docker events, retrying"
                );
            }
            Ok(mut stream) => {
                counter!(m::DOCKER_STREAM_CONNECTS_TOTAL).increment(1);
                backoff.mark_connected(Instant::now());
                info!(endpoint = %docker.endpoint(), "subscribed to docker events");

                loop {
                    let next = tokio::select! {
                        _ = cancel.cancelled() => None,
                        item = stream.next() => Some(item),
                    };
                    match next {
                        // cancelled
                        None => {
                            info!("docker event subscription cancelled");
                            return;
                        }
                        Some(Some(Ok(event))) => dispatch(observer.as_ref(), &event),
                        Some(Some(Err(e))) => {
                            warn!(error = %e, "docker event stream failed");
                            break;
                        }
                        Some(None) => break,
                    }
                }

                counter!(m::DOCKER_STREAM_CLOSED_TOTAL).increment(1);
                if backoff.mark_disconnected(Instant::now()) {
                    debug!("event stream was long-lived, backoff reset");
                }
                error!(
                    retry_in_ms = millis(&backoff),
                    "docker event stream closed, retrying subscription"
                );
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(backoff.current()) => {}
        }
        backoff.grow();
    }

    info!("docker event subscription cancelled");
}

/// 이벤트 하나를 옵저버 호출로 바꿉니다. `start`/`die` 외의 이벤트는 무시합니다.
fn dispatch(observer: &dyn ContainerObserver, event: &ContainerEvent) {
    counter!(m::DOCKER_EVENTS_TOTAL, m::LABEL_KIND => event.kind.label()).increment(1);
    match &event.kind {
        ContainerEventKind::Started => observer.container_started(&event.container_id),
        ContainerEventKind::Died => observer.container_died(&event.container_id),
        ContainerEventKind::Other(action) => {
            debug!(
                container_id = %event.container_id,
                action = %action,
                "ignoring container event"
            );
        }
    }
}

fn millis(backoff: &ReconnectBackoff) -> u64 {
    u64::try_from(backoff.current().as_millis()).unwrap_or(u64::MAX)
}
