//! Export artefacts handed back to the embedding application.

use std::fs;
use std::path::{Path, PathBuf};

use wgconf_core::TunnelConfig;

use crate::backup::{generate_backup_document, BackupError};
use crate::ingest::ImportFormat;

/// Suggested name of a multi-profile stanza export.
pub const BULK_FILENAME: &str = "wireguard_bulk.conf";
/// Suggested name of a backup document export.
pub const BACKUP_FILENAME: &str = "amnezia_backup.json";

pub const CONF_MEDIA_TYPE: &str = "text/plain;charset=utf-8";
pub const BACKUP_MEDIA_TYPE: &str = "application/json";

/// A generated file: suggested name, media type and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the file into `dir` under its suggested name.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// All profiles as one stanza document.
pub fn export_bulk_text(configs: &[TunnelConfig]) -> ExportFile {
    ExportFile {
        filename: BULK_FILENAME.to_string(),
        media_type: CONF_MEDIA_TYPE,
        bytes: wgconf_core::write_all(configs).into_bytes(),
    }
}

/// All profiles as an Amnezia backup document.
pub fn export_backup(configs: &[TunnelConfig]) -> Result<ExportFile, BackupError> {
    Ok(ExportFile {
        filename: BACKUP_FILENAME.to_string(),
        media_type: BACKUP_MEDIA_TYPE,
        bytes: generate_backup_document(configs)?.into_bytes(),
    })
}

/// Export in the format the profiles were last imported from: backup
/// documents for JSON imports, bulk stanza text otherwise.
pub fn export_as(
    configs: &[TunnelConfig],
    format: Option<ImportFormat>,
) -> Result<ExportFile, BackupError> {
    match format {
        Some(ImportFormat::Json) => export_backup(configs),
        Some(ImportFormat::Text) | None => Ok(export_bulk_text(configs)),
    }
}
