//! 런타임 클라이언트가 돌려주는 컨테이너 메타데이터 스냅샷
//!
//! 모두 조회 시점에 새로 만들어지는 읽기 전용 값이며, 호출자가 소유합니다.

use std::collections::HashMap;
use std::fmt;

/// Docker 데몬 버전 정보
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeVersion {
    /// 엔진 버전 (예: "27.3.1")
    pub version: String,
    /// API 버전 (예: "1.47")
    pub api_version: String,
    /// 운영체제
    pub os: String,
    /// 아키텍처
    pub arch: String,
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version={} api={} os={} arch={}",
            self.version, self.api_version, self.os, self.arch
        )
    }
}

/// 네트워크별 엔드포인트 정보
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkEndpoint {
    /// 해당 네트워크에서 할당된 IP 주소 (미할당이면 빈 문자열)
    pub ip_address: String,
}

/// 주소 해석에 필요한 컨테이너 네트워크 정보
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerNetworkInfo {
    /// 네트워크 이름 -> 엔드포인트. 오래된 데몬은 이 맵 자체를 돌려주지 않습니다.
    pub networks: Option<HashMap<String, NetworkEndpoint>>,
    /// 최상위 (legacy) IP 주소 필드
    pub ip_address: String,
    /// HostConfig의 네트워크 모드 (예: "bridge", "host", "default")
    pub network_mode: String,
}

/// 컨테이너 실행 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerState {
    /// 실행 중 여부
    pub running: bool,
    /// 재시작 중 여부
    pub restarting: bool,
}

/// `inspect_container` 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDetails {
    /// 전체 컨테이너 ID
    pub id: String,
    /// 컨테이너 이름 (선행 '/' 제거)
    pub name: String,
    /// 실행 상태
    pub state: ContainerState,
    /// 네트워크 정보
    pub network: ContainerNetworkInfo,
}

impl ContainerDetails {
    /// 컨테이너가 실행 중이 아닌지 판단합니다.
    ///
    /// 재시작 중인 컨테이너도 실행 중이 아닌 것으로 봅니다.
    pub fn is_not_running(&self) -> bool {
        !self.state.running || self.state.restarting
    }
}

impl From<bollard::models::ContainerInspectResponse> for ContainerDetails {
    fn from(details: bollard::models::ContainerInspectResponse) -> Self {
        let state = details
            .state
            .map(|s| ContainerState {
                running: s.running.unwrap_or(false),
                restarting: s.restarting.unwrap_or(false),
            })
            .unwrap_or_default();

        let network_mode = details
            .host_config
            .and_then(|hc| hc.network_mode)
            .unwrap_or_default();

        let (networks, ip_address) = match details.network_settings {
            Some(settings) => {
                let networks = settings.networks.map(|networks| {
                    networks
                        .into_iter()
                        .map(|(name, endpoint)| {
                            (
                                name,
                                NetworkEndpoint {
                                    ip_address: endpoint.ip_address.unwrap_or_default(),
                                },
                            )
                        })
                        .collect()
                });
                (networks, settings.ip_address.unwrap_or_default())
            }
            None => (None, String::new()),
        };

        Self {
            id: details.id.unwrap_or_default(),
            name: details
                .name
                .map(|n| n.trim_start_matches('/').to_owned())
                .unwrap_or_default(),
            state,
            network: ContainerNetworkInfo {
                networks,
                ip_address,
                network_mode,
            },
        }
    }
}

impl From<bollard::system::Version> for RuntimeVersion {
    fn from(v: bollard::system::Version) -> Self {
        Self {
            version: v.version.unwrap_or_default(),
            api_version: v.api_version.unwrap_or_default(),
            os: v.os.unwrap_or_default(),
            arch: v.arch.unwrap_or_default(),
        }
    }
}
