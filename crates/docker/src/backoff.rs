//! 이벤트 구독 재연결 백오프
//!
//! [`ReconnectBackoff`]는 구독 태스크 하나가 단독으로 소유하는 상태입니다.
//! 실패나 스트림 종료마다 간격을 3/2배로 늘리고 최대값에서 멈춥니다.
//! 연결이 "연결 당시의 간격"보다 오래 유지되었다면 종료 시점에 초기값으로 되돌립니다.

use std::time::Duration;

use tokio::time::Instant;

/// 재연결 간격 상태
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    /// 현재 연결이 맺어진 시각과 그때의 간격
    connection: Option<(Instant, Duration)>,
}

impl ReconnectBackoff {
    /// 새 백오프 상태를 생성합니다. `max`가 `initial`보다 작으면 `initial`로 맞춥니다.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            current: initial,
            connection: None,
        }
    }

    /// 다음 재시도 전에 기다릴 간격
    pub fn current(&self) -> Duration {
        self.current
    }

    /// 초기 간격
    pub fn initial(&self) -> Duration {
        self.initial
    }

    /// 최대 간격
    pub fn max(&self) -> Duration {
        self.max
    }

    /// 간격을 `min(current * 3 / 2, max)`로 늘립니다.
    pub fn grow(&mut self) {
        self.current = (self.current * 3 / 2).min(self.max);
    }

    /// 스트림 연결 성공을 기록합니다.
    pub fn mark_connected(&mut self, now: Instant) {
        self.connection = Some((now, self.current));
    }

    /// 스트림 종료를 기록합니다.
    ///
    /// 연결 유지 시간이 연결 당시 간격보다 길었으면 간격을 초기값으로 되돌리고
    /// `true`를 반환합니다.
    pub fn mark_disconnected(&mut self, now: Instant) -> bool {
        let Some((connected_at, interval_at_connect)) = self.connection.take() else {
            return false;
        };
        if now.saturating_duration_since(connected_at) > interval_at_connect {
            self.current = self.initial;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_backoff() -> ReconnectBackoff {
        ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(20))
    }

    #[test]
    fn starts_at_initial() {
        assert_eq!(default_backoff().current(), Duration::from_secs(1));
    }

    #[test]
    fn grows_by_three_halves() {
        let mut backoff = default_backoff();
        let expected_ms = [1500, 2250, 3375];
        for ms in expected_ms {
            backoff.grow();
            assert_eq!(backoff.current(), Duration::from_millis(ms));
        }
    }

    #[test]
    fn nth_interval_matches_closed_form_until_cap() {
        let mut backoff = default_backoff();
        for n in 1..=15_i32 {
            let expected = Duration::from_secs_f64(1.5_f64.powi(n - 1)).min(Duration::from_secs(20));
            let diff = backoff.current().abs_diff(expected);
            assert!(
                diff < Duration::from_micros(1),
                "interval {n}: got {:?}, want {expected:?}",
                backoff.current()
            );
            backoff.grow();
        }
    }

    #[test]
    fn never_exceeds_max() {
        let mut backoff = default_backoff();
        for _ in 0..50 {
            backoff.grow();
            assert!(backoff.current() <= Duration::from_secs(20));
        }
        assert_eq!(backoff.current(), Duration::from_secs(20));
    }

    #[test]
    fn max_below_initial_is_clamped() {
        let backoff = ReconnectBackoff::new(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(backoff.max(), Duration::from_secs(5));
    }

    #[test]
    fn long_connection_resets_interval() {
        let mut backoff = default_backoff();
        backoff.grow();
        backoff.grow(); // 2.25s
        let t0 = Instant::now();
        backoff.mark_connected(t0);
        assert!(backoff.mark_disconnected(t0 + Duration::from_secs(3)));
        assert_eq!(backoff.current(), Duration::from_secs(1));
    }

    #[test]
    fn short_connection_keeps_interval() {
        let mut backoff = default_backoff();
        backoff.grow();
        backoff.grow();
        let t0 = Instant::now();
        backoff.mark_connected(t0);
        assert!(!backoff.mark_disconnected(t0 + Duration::from_secs(2)));
        assert_eq!(backoff.current(), Duration::from_millis(2250));
    }

    #[test]
    fn connection_equal_to_interval_does_not_reset() {
        let mut backoff = default_backoff();
        backoff.grow(); // 1.5s
        let t0 = Instant::now();
        backoff.mark_connected(t0);
        assert!(!backoff.mark_disconnected(t0 + Duration::from_millis(1500)));
        assert_eq!(backoff.current(), Duration::from_millis(1500));
    }

    #[test]
    fn capped_interval_resets_after_long_connection() {
        let mut backoff = default_backoff();
        for _ in 0..20 {
            backoff.grow();
        }
        let t0 = Instant::now();
        backoff.mark_connected(t0);
        assert!(backoff.mark_disconnected(t0 + Duration::from_secs(21)));
        assert_eq!(backoff.current(), Duration::from_secs(1));
    }

    #[test]
    fn disconnect_without_connect_is_ignored() {
        let mut backoff = default_backoff();
        backoff.grow();
        assert!(!backoff.mark_disconnected(Instant::now()));
        assert_eq!(backoff.current(), Duration::from_millis(1500));
    }
}
