use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, trace};

use crate::ids::{IdSource, UuidIds};
use crate::model::TunnelConfig;

/// Stanza header that starts a profile.
pub const INTERFACE_HEADER: &str = "[Interface]";
/// Stanza header that starts the peer half of a profile.
pub const PEER_HEADER: &str = "[Peer]";

const INTERFACE_MARKER: &str = "[interface]";
const PEER_MARKER: &str = "[peer]";
const PRIVATE_KEY_MARKER: &str = "privatekey";

/// Errors that can occur while reading stanza text from disk.
///
/// Parsing itself never fails: malformed text yields fewer profiles.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read input file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Interface,
    Peer,
}

/// Parse stanza text into profiles, assigning random identifiers.
pub fn parse(text: &str) -> Vec<TunnelConfig> {
    parse_with_ids(text, &mut UuidIds)
}

/// Parse stanza text into profiles, drawing identifiers from `ids`.
///
/// Every `[Interface]` header (any case) starts a new profile. Text with no
/// header at all is read as a single headerless profile. Profiles that fail
/// [`TunnelConfig::is_valid`] are dropped.
pub fn parse_with_ids(text: &str, ids: &mut dyn IdSource) -> Vec<TunnelConfig> {
    let mut configs = Vec::new();

    for fragment in split_fragments(text) {
        if fragment.trim().is_empty() {
            continue;
        }

        let mut config = TunnelConfig::default();
        read_fragment(fragment, &mut config);
        if !config.is_valid() {
            trace!("dropping stanza fragment without usable keys");
            continue;
        }

        config.id = ids.next_id();
        config.name = format!("Config-{}", configs.len() + 1);
        debug!(id = %config.id, name = %config.name, "parsed profile");
        configs.push(config);
    }

    configs
}

/// Parse a stanza file into profiles.
pub fn parse_file(path: &Path) -> Result<Vec<TunnelConfig>, ParseError> {
    let text = fs::read_to_string(path)?;
    Ok(parse(&text))
}

/// Split on every `[Interface]` header, case-insensitively.
///
/// The first fragment is whatever precedes the first header. Without any
/// header the whole text is one fragment, which covers headerless pastes
/// that still carry a `PrivateKey`.
fn split_fragments(text: &str) -> Vec<&str> {
    let lowered = text.to_ascii_lowercase();
    let starts: Vec<usize> = lowered
        .match_indices(INTERFACE_MARKER)
        .map(|(idx, _)| idx)
        .collect();

    if starts.is_empty() {
        if lowered.contains(PRIVATE_KEY_MARKER) {
            return vec![text];
        }
        return Vec::new();
    }

    let mut fragments = Vec::with_capacity(starts.len() + 1);
    fragments.push(&text[..starts[0]]);
    for (i, start) in starts.iter().enumerate() {
        let body = start + INTERFACE_MARKER.len();
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        fragments.push(&text[body..end]);
    }
    fragments
}

fn read_fragment(fragment: &str, config: &mut TunnelConfig) {
    let mut section = Section::Interface;

    for line in fragment.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let lowered = line.to_ascii_lowercase();
        if lowered.contains(PEER_MARKER) {
            section = Section::Peer;
            continue;
        }
        if lowered.contains(INTERFACE_MARKER) {
            section = Section::Interface;
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match section {
            Section::Interface => config.interface.set(key, value),
            Section::Peer => config.peer.set(key, value),
        }
    }
}
