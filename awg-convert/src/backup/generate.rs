use serde::Serialize;
use wgconf_core::{InterfaceFields, PeerFields, TunnelConfig};

use super::BackupError;

/// Value of the document's `version` field.
pub const BACKUP_VERSION: u32 = 1;
/// Container tag written under `defaultContainer` and `containerType`.
pub const CONTAINER_TYPE: &str = "amnezia-awg";
/// `hostName` used when a profile has no endpoint host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// `port` used when a profile's endpoint has no numeric port.
pub const DEFAULT_PORT: u64 = 51820;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupDocument {
    version: u32,
    default_server_index: usize,
    servers: Vec<ServerEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerEntry {
    id: String,
    description: String,
    host_name: String,
    port: u64,
    default_container: &'static str,
    containers: Vec<ContainerEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerEntry {
    id: String,
    container_type: &'static str,
    awg: LastConfig,
    wireguard: LastConfig,
}

#[derive(Serialize)]
struct LastConfig {
    last_config: String,
}

/// The document embedded, JSON-encoded, in `last_config`.
#[derive(Serialize)]
struct InnerDocument<'a> {
    config: &'a InterfaceFields,
    peers: [&'a PeerFields; 1],
}

/// Build a pretty-printed backup document holding every profile.
///
/// Each profile becomes one server with a single container; the container
/// reuses the profile id, so output is fully determined by the input list.
pub fn generate_backup_document(configs: &[TunnelConfig]) -> Result<String, BackupError> {
    let servers = configs
        .iter()
        .enumerate()
        .map(|(idx, config)| server_entry(idx, config))
        .collect::<Result<Vec<_>, _>>()?;

    let document = BackupDocument {
        version: BACKUP_VERSION,
        default_server_index: 0,
        servers,
    };
    serde_json::to_string_pretty(&document).map_err(BackupError::Encode)
}

fn server_entry(idx: usize, config: &TunnelConfig) -> Result<ServerEntry, BackupError> {
    let inner = InnerDocument {
        config: &config.interface,
        peers: [&config.peer],
    };
    let last_config = serde_json::to_string(&inner).map_err(BackupError::Encode)?;

    let endpoint = config.peer.endpoint();
    let host_name = match endpoint.host.trim() {
        "" => DEFAULT_HOST.to_string(),
        host => host.to_string(),
    };
    let description = if config.name.is_empty() {
        format!("Server {}", idx + 1)
    } else {
        config.name.clone()
    };

    Ok(ServerEntry {
        id: config.id.clone(),
        description,
        host_name,
        port: endpoint.port_number().unwrap_or(DEFAULT_PORT),
        default_container: CONTAINER_TYPE,
        containers: vec![ContainerEntry {
            id: config.id.clone(),
            container_type: CONTAINER_TYPE,
            awg: LastConfig {
                last_config: last_config.clone(),
            },
            wireguard: LastConfig { last_config },
        }],
    })
}
