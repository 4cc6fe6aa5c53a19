//! Amnezia backup documents.
//!
//! A backup is a JSON tree that holds one or more profiles somewhere below
//! its root. Each profile lives in a container object keyed `wireguard` or
//! `awg` whose `last_config` field carries the profile, usually as a
//! JSON-encoded string:
//!
//! ```json
//! { "version": 1, "defaultServerIndex": 0,
//!   "servers": [ { "id": "...", "description": "...", "hostName": "...", "port": 51820,
//!                  "defaultContainer": "amnezia-awg",
//!                  "containers": [ { "id": "...", "containerType": "amnezia-awg",
//!                                    "awg": { "last_config": "{\"config\":{...},\"peers\":[{...}]}" },
//!                                    "wireguard": { "last_config": "..." } } ] } ] }
//! ```
//!
//! Older exports nest containers at arbitrary depth, store stanza text in
//! `last_config`, or encode the top-level `Servers`/`serversList` arrays as
//! strings. The reader accepts all of these, at any nesting depth.

use thiserror::Error;
use tracing::warn;
use wgconf_core::{IdSource, TunnelConfig, UuidIds};

mod generate;
mod search;

pub use generate::{
    generate_backup_document, BACKUP_VERSION, CONTAINER_TYPE, DEFAULT_HOST, DEFAULT_PORT,
};

/// Errors raised while reading or writing backup documents.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The outer document is not JSON.
    #[error("malformed backup document: {0}")]
    Malformed(serde_json::Error),
    /// A document could not be encoded.
    #[error("failed to encode backup document: {0}")]
    Encode(serde_json::Error),
}

/// Profiles recovered from a well-formed backup document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupExtraction {
    /// Profiles in discovery order.
    pub configs: Vec<TunnelConfig>,
    /// Containers that were found but could not be read.
    pub skipped_nodes: usize,
}

/// Parse a backup document, assigning random identifiers where the
/// document has none.
///
/// Malformed input and input without profiles both produce an empty list.
pub fn parse_backup_document(json: &str) -> Vec<TunnelConfig> {
    parse_backup_document_with_ids(json, &mut UuidIds)
}

/// [`parse_backup_document`] with an explicit identifier source.
pub fn parse_backup_document_with_ids(json: &str, ids: &mut dyn IdSource) -> Vec<TunnelConfig> {
    match try_parse_backup_document(json, ids) {
        Ok(extraction) => extraction.configs,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable backup document");
            Vec::new()
        }
    }
}

/// Parse a backup document, keeping "not JSON" apart from "no profiles".
pub fn try_parse_backup_document(
    json: &str,
    ids: &mut dyn IdSource,
) -> Result<BackupExtraction, BackupError> {
    let mut root = search::decode_json(json).map_err(BackupError::Malformed)?;
    search::decode_string_fields(&mut root);
    Ok(search::find_profiles(&root, ids))
}
