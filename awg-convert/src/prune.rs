//! Removing profiles from a list.
//!
//! Two profiles are duplicates when they point at the same peer: equal
//! `PublicKey` and equal `Endpoint`. Names, ids and interface fields are
//! not compared.

use std::collections::BTreeSet;

use tracing::debug;
use wgconf_core::TunnelConfig;

/// Keep the first profile for every (public key, endpoint) pair.
///
/// Relative order of the kept profiles is unchanged.
pub fn deduplicate(configs: &[TunnelConfig]) -> Vec<TunnelConfig> {
    let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
    let kept: Vec<TunnelConfig> = configs
        .iter()
        .filter(|&config| seen.insert(peer_fingerprint(config)))
        .cloned()
        .collect();

    debug!(
        removed = configs.len() - kept.len(),
        kept = kept.len(),
        "deduplicated profiles"
    );
    kept
}

/// Drop the profile with the given id, if present.
pub fn remove_by_id(configs: &[TunnelConfig], id: &str) -> Vec<TunnelConfig> {
    configs
        .iter()
        .filter(|config| config.id != id)
        .cloned()
        .collect()
}

fn peer_fingerprint(config: &TunnelConfig) -> (&str, &str) {
    (config.peer.public_key.as_str(), config.peer.endpoint.as_str())
}
