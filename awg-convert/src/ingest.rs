//! Turning raw imported content into profiles.
//!
//! Backup-looking content is tried as a backup document first; if that
//! yields nothing and the content also looks like stanza text, the stanza
//! parser gets a turn. Zip files are read member by member.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};
use wgconf_core::{IdSource, TunnelConfig, UuidIds};

use crate::archive::{read_archive_with_ids, ArchiveError};
use crate::backup::parse_backup_document_with_ids;
use crate::detect::{looks_like_backup, looks_like_text};

/// Which reader produced an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Amnezia backup document.
    Json,
    /// Stanza text, including zip archives of stanza files.
    Text,
}

/// Profiles read from one piece of content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Import {
    pub configs: Vec<TunnelConfig>,
    /// `None` when nothing could be read.
    pub format: Option<ImportFormat>,
}

/// Errors raised while ingesting files.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read archive: {0}")]
    Archive(#[from] ArchiveError),
}

/// Detect the format of `content` and parse it.
pub fn ingest_text(content: &str) -> Import {
    ingest_text_with_ids(content, &mut UuidIds)
}

/// [`ingest_text`] with an explicit identifier source.
pub fn ingest_text_with_ids(content: &str, ids: &mut dyn IdSource) -> Import {
    if looks_like_backup(content) {
        let configs = parse_backup_document_with_ids(content, &mut *ids);
        if !configs.is_empty() {
            return Import {
                configs,
                format: Some(ImportFormat::Json),
            };
        }
    }

    if looks_like_text(content) {
        let configs = wgconf_core::parse_with_ids(content, ids);
        if !configs.is_empty() {
            return Import {
                configs,
                format: Some(ImportFormat::Text),
            };
        }
    }

    debug!("no profiles found in imported content");
    Import::default()
}

/// Read and parse a file. `.zip` files are read as archives; anything
/// else is decoded as UTF-8, replacing invalid bytes.
pub fn ingest_file(path: &Path) -> Result<Import, IngestError> {
    ingest_file_with_ids(path, &mut UuidIds)
}

/// [`ingest_file`] with an explicit identifier source.
pub fn ingest_file_with_ids(path: &Path, ids: &mut dyn IdSource) -> Result<Import, IngestError> {
    let is_zip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    let import = if is_zip {
        let bytes = fs::read(path)?;
        let archive = read_archive_with_ids(&bytes, ids)?;
        let format = (!archive.configs.is_empty()).then_some(ImportFormat::Text);
        Import {
            configs: archive.configs,
            format,
        }
    } else {
        let raw = fs::read(path)?;
        ingest_text_with_ids(&String::from_utf8_lossy(&raw), ids)
    };

    info!(
        path = %path.display(),
        configs = import.configs.len(),
        format = ?import.format,
        "ingested file"
    );
    Ok(import)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wgconf_core::SequentialIds;

    use super::{ingest_text_with_ids, ImportFormat};

    #[test]
    fn stanza_text_starting_with_bracket_falls_back_to_text() {
        let text = "[Interface]\nPrivateKey = K\n[Peer]\nPublicKey = P\n";
        let import = ingest_text_with_ids(text, &mut SequentialIds::new("cfg"));
        assert_eq!(import.format, Some(ImportFormat::Text));
        assert_eq!(import.configs.len(), 1);
    }

    #[test]
    fn backup_document_is_read_as_json() {
        let inner = r#"{\"config\":{\"PrivateKey\":\"K\"},\"peers\":[{\"PublicKey\":\"P\"}]}"#;
        let doc = format!(r#"{{"servers":[{{"containers":[{{"awg":{{"last_config":"{inner}"}}}}]}}]}}"#);
        let import = ingest_text_with_ids(&doc, &mut SequentialIds::new("cfg"));
        assert_eq!(import.format, Some(ImportFormat::Json));
        assert_eq!(import.configs[0].interface.private_key, "K");
    }

    #[test]
    fn unrecognised_content_yields_empty_import() {
        let import = ingest_text_with_ids("hello world", &mut SequentialIds::new("cfg"));
        assert!(import.configs.is_empty());
        assert_eq!(import.format, None);

        let empty_backup = ingest_text_with_ids(r#"{"servers": []}"#, &mut SequentialIds::new("cfg"));
        assert_eq!(empty_backup.format, None);
    }
}
