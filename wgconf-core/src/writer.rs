use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::model::TunnelConfig;
use crate::parser::{INTERFACE_HEADER, PEER_HEADER};

/// Errors that can occur while writing stanza text to disk.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to write output file.
    #[error("failed to write config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Render a profile as stanza text. Empty values are omitted.
impl Display for TunnelConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{INTERFACE_HEADER}")?;
        for (key, value) in self.interface.entries().filter(|(_, v)| !v.is_empty()) {
            writeln!(f, "{key} = {value}")?;
        }

        writeln!(f)?;
        writeln!(f, "{PEER_HEADER}")?;
        for (key, value) in self.peer.entries().filter(|(_, v)| !v.is_empty()) {
            writeln!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}

/// Render one profile as stanza text.
pub fn write(config: &TunnelConfig) -> String {
    config.to_string()
}

/// Render several profiles as one multi-profile document, separated by a
/// blank line.
pub fn write_all(configs: &[TunnelConfig]) -> String {
    configs
        .iter()
        .map(write)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render one profile and write it to `path`.
pub fn write_file(config: &TunnelConfig, path: &Path) -> Result<(), WriteError> {
    fs::write(path, write(config))?;
    Ok(())
}
