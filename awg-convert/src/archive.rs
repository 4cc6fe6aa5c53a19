//! Zip packaging of stanza files.
//!
//! Exports write one `<stem>.conf` member per profile. Imports read every
//! member of an archive as stanza text.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use thiserror::Error;
use tracing::{debug, warn};
use wgconf_core::{IdSource, TunnelConfig, UuidIds};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::export::{ExportFile, CONF_MEDIA_TYPE};

/// Suggested name of a packaged archive.
pub const ARCHIVE_FILENAME: &str = "wireguard_configs.zip";
pub const ARCHIVE_MEDIA_TYPE: &str = "application/zip";

const FALLBACK_STEM: &str = "config";

/// Errors raised while building or reading archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The zip container could not be written or opened.
    #[error("zip archive error: {0}")]
    Zip(#[from] ZipError),
    /// Failed to write member data.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Profiles recovered from an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveImport {
    pub configs: Vec<TunnelConfig>,
    /// Members that produced at least one profile.
    pub files_with_configs: usize,
    /// Members that could not be read or were not UTF-8.
    pub skipped_members: usize,
}

/// Filesystem-safe stem for a profile's exported file.
///
/// Uses the profile name, then the endpoint host, then `config`; every
/// character outside `[A-Za-z0-9]` becomes `_`.
pub fn file_stem(config: &TunnelConfig) -> String {
    let host = config.peer.endpoint().host;
    let base = [config.name.as_str(), host]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(FALLBACK_STEM);

    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Package every profile as a `.conf` member of one zip archive.
///
/// Profiles whose stems collide share a single member holding the text of
/// the last such profile, at the position of the first.
pub fn package_archive(configs: &[TunnelConfig]) -> Result<ExportFile, ArchiveError> {
    let mut members: Vec<(String, String)> = Vec::with_capacity(configs.len());
    let mut by_name: BTreeMap<String, usize> = BTreeMap::new();

    for config in configs {
        let member = format!("{}.conf", file_stem(config));
        let text = wgconf_core::write(config);
        match by_name.get(&member) {
            Some(&idx) => {
                warn!(member = %member, id = %config.id, "archive member name collision, replacing earlier profile");
                members[idx].1 = text;
            }
            None => {
                by_name.insert(member.clone(), members.len());
                members.push((member, text));
            }
        }
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (member, text) in &members {
        writer.start_file(member.as_str(), options)?;
        writer.write_all(text.as_bytes())?;
        debug!(member = %member, "added archive member");
    }
    let bytes = writer.finish()?.into_inner();

    Ok(ExportFile {
        filename: ARCHIVE_FILENAME.to_string(),
        media_type: ARCHIVE_MEDIA_TYPE,
        bytes,
    })
}

/// Export one profile as a bare `.conf` file, without packaging.
pub fn package_single(config: &TunnelConfig) -> ExportFile {
    ExportFile {
        filename: format!("{}.conf", file_stem(config)),
        media_type: CONF_MEDIA_TYPE,
        bytes: wgconf_core::write(config).into_bytes(),
    }
}

/// Read every file member of a zip archive as stanza text.
pub fn read_archive(bytes: &[u8]) -> Result<ArchiveImport, ArchiveError> {
    read_archive_with_ids(bytes, &mut UuidIds)
}

/// [`read_archive`] with an explicit identifier source.
pub fn read_archive_with_ids(
    bytes: &[u8],
    ids: &mut dyn IdSource,
) -> Result<ArchiveImport, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut import = ArchiveImport::default();

    for idx in 0..archive.len() {
        let text = match read_member(&mut archive, idx) {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(err) => {
                warn!(index = idx, error = %err, "skipping unreadable archive member");
                import.skipped_members += 1;
                continue;
            }
        };

        let parsed = wgconf_core::parse_with_ids(&text, &mut *ids);
        if !parsed.is_empty() {
            import.files_with_configs += 1;
            import.configs.extend(parsed);
        }
    }

    debug!(
        configs = import.configs.len(),
        files = import.files_with_configs,
        "read archive"
    );
    Ok(import)
}

/// Member text, or `None` for directory entries.
fn read_member(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    idx: usize,
) -> Result<Option<String>, ArchiveError> {
    let mut file = archive.by_index(idx)?;
    if file.is_dir() {
        return Ok(None);
    }

    let mut raw = Vec::new();
    file.read_to_end(&mut raw)?;
    let text = String::from_utf8(raw).map_err(|err| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err.utf8_error())
    })?;
    Ok(Some(text))
}
