//! 컨테이너 이벤트 옵저버

/// 컨테이너 시작/종료 알림을 받는 옵저버
///
/// 구독 태스크에서 이벤트 순서대로 동기 호출됩니다. 구현이 오래 블록되면
/// 그동안 이벤트 처리가 멈추므로 무거운 작업은 별도 태스크로 넘겨야 합니다.
/// 호출 스레드/태스크에 대해 어떤 가정도 해서는 안 됩니다.
pub trait ContainerObserver: Send + Sync + 'static {
    /// 컨테이너가 시작되었습니다.
    fn container_started(&self, container_id: &str);

    /// 컨테이너가 종료되었습니다.
    fn container_died(&self, container_id: &str);
}
