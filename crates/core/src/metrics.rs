//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `dockwatch_`
//! - 모듈명: `docker_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(dockwatch_core::metrics::DOCKER_STREAM_CONNECTS_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 이벤트 종류 레이블 키 (started, died, other)
pub const LABEL_KIND: &str = "kind";

// ─── Docker 이벤트 구독 메트릭 ──────────────────────────────────────

/// Docker: 이벤트 스트림 연결 성공 수 (counter)
pub const DOCKER_STREAM_CONNECTS_TOTAL: &str = "dockwatch_docker_stream_connects_total";

/// Docker: 이벤트 스트림 연결 실패 수 (counter)
pub const DOCKER_STREAM_FAILURES_TOTAL: &str = "dockwatch_docker_stream_failures_total";

/// Docker: 이벤트 스트림 종료 수 (counter)
pub const DOCKER_STREAM_CLOSED_TOTAL: &str = "dockwatch_docker_stream_closed_total";

/// Docker: 수신한 컨테이너 이벤트 수 (counter, label: kind)
pub const DOCKER_EVENTS_TOTAL: &str = "dockwatch_docker_events_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        DOCKER_STREAM_CONNECTS_TOTAL,
        "Total number of successful docker event stream subscriptions"
    );
    describe_counter!(
        DOCKER_STREAM_FAILURES_TOTAL,
        "Total number of failed attempts to open the docker event stream"
    );
    describe_counter!(
        DOCKER_STREAM_CLOSED_TOTAL,
        "Total number of times an open docker event stream ended"
    );
    describe_counter!(
        DOCKER_EVENTS_TOTAL,
        "Container lifecycle events received, by kind (started, died, other)"
    );
}
