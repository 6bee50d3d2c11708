//! 컨테이너 생명주기 이벤트
//!
//! Docker 이벤트 스트림의 원시 메시지를 [`ContainerEvent`]로 변환합니다.
//! 이벤트는 수신 즉시 소비되며 저장되지 않습니다.

use std::fmt;

use bollard::models::EventMessage;

/// 컨테이너 이벤트 종류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEventKind {
    /// 컨테이너 시작 (`start`)
    Started,
    /// 컨테이너 종료 (`die`)
    Died,
    /// 그 외 모든 액션 (구독 루프에서 무시됨)
    Other(String),
}

impl ContainerEventKind {
    /// Docker 이벤트 액션 문자열에서 종류를 결정합니다.
    pub fn from_action(action: &str) -> Self {
        match action {
            "start" => Self::Started,
            "die" => Self::Died,
            other => Self::Other(other.to_owned()),
        }
    }

    /// 메트릭 레이블용 고정 이름을 반환합니다.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Died => "died",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Display for ContainerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "start"),
            Self::Died => write!(f, "die"),
            Self::Other(action) => write!(f, "{action}"),
        }
    }
}

/// 컨테이너 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEvent {
    /// 이벤트 종류
    pub kind: ContainerEventKind,
    /// 컨테이너 ID
    pub container_id: String,
}

impl ContainerEvent {
    /// 새 이벤트를 생성합니다.
    pub fn new(kind: ContainerEventKind, container_id: impl Into<String>) -> Self {
        Self {
            kind,
            container_id: container_id.into(),
        }
    }

    /// `start` 이벤트를 생성합니다.
    pub fn started(container_id: impl Into<String>) -> Self {
        Self::new(ContainerEventKind::Started, container_id)
    }

    /// `die` 이벤트를 생성합니다.
    pub fn died(container_id: impl Into<String>) -> Self {
        Self::new(ContainerEventKind::Died, container_id)
    }
}

impl fmt::Display for ContainerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.container_id)
    }
}

impl From<EventMessage> for ContainerEvent {
    fn from(message: EventMessage) -> Self {
        let action = message.action.unwrap_or_default();
        let container_id = message.actor.and_then(|a| a.id).unwrap_or_default();
        Self {
            kind: ContainerEventKind::from_action(&action),
            container_id,
        }
    }
}
