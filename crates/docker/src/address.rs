//! 컨테이너 주소 해석
//!
//! 컨테이너에 도달할 수 있는 IP 주소를 찾습니다. bridge 네트워크에 있으면
//! 그 주소를, host 네트워크를 공유하면 루프백 주소를, 오래된 데몬이면
//! 최상위 legacy 주소 필드를 사용합니다.

use tracing::debug;

use crate::docker::DockerClient;
use crate::error::DockerError;
use crate::types::ContainerNetworkInfo;

/// host 네트워크 컨테이너에 도달하는 주소
pub const LOOPBACK_ADDRESS: &str = "127.0.0.1";

const BRIDGE_NETWORK: &str = "bridge";
const HOST_NETWORK: &str = "host";

/// 조회된 네트워크 정보에서 주소를 고릅니다. 먼저 맞는 규칙이 이깁니다.
///
/// 1. 네트워크 맵에 `bridge`가 있으면 그 주소 (빈 문자열이어도 그대로 반환)
/// 2. 네트워크 맵에 `host`가 있으면 루프백
/// 3. 네트워크 맵이 없고 네트워크 모드가 `host`면 루프백
/// 4. legacy 주소가 비어 있지 않으면 그 주소
/// 5. 그 외에는 [`DockerError::NoAddress`]
pub fn resolve_address(
    info: &ContainerNetworkInfo,
    container_ident: &str,
) -> Result<String, DockerError> {
    match &info.networks {
        Some(networks) => {
            if let Some(bridge) = networks.get(BRIDGE_NETWORK) {
                return Ok(bridge.ip_address.clone());
            }
            if networks.contains_key(HOST_NETWORK) {
                return Ok(LOOPBACK_ADDRESS.to_owned());
            }
        }
        None if info.network_mode == HOST_NETWORK => {
            return Ok(LOOPBACK_ADDRESS.to_owned());
        }
        None => {}
    }

    if info.ip_address.is_empty() {
        return Err(DockerError::NoAddress(container_ident.to_owned()));
    }
    Ok(info.ip_address.clone())
}

/// 컨테이너를 한 번 조회하고 주소를 해석합니다.
///
/// 조회 실패는 원인을 담은 [`DockerError::LookupFailed`]로 반환되며 재시도하지 않습니다.
pub async fn resolve_container_address<D: DockerClient>(
    docker: &D,
    container_ident: &str,
) -> Result<String, DockerError> {
    debug!(container = container_ident, "resolving container address");

    let details = docker
        .inspect_container(container_ident)
        .await
        .map_err(|e| DockerError::LookupFailed {
            container_id: container_ident.to_owned(),
            source: Box::new(e),
        })?;

    if let Some(networks) = &details.network.networks {
        debug!(
            container = container_ident,
            networks = ?networks.keys().collect::<Vec<_>>(),
            "container networks"
        );
    }

    resolve_address(&details.network, container_ident)
}
