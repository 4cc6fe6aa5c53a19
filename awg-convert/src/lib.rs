//! AmneziaWG / WireGuard profile conversion.
//!
//! This library moves tunnel profiles between the formats users actually
//! exchange them in: `[Interface]`/`[Peer]` stanza text, Amnezia backup JSON
//! and zip archives of `.conf` files. Every format is read into, and written
//! from, the canonical [`wgconf_core::TunnelConfig`].
//!
//! # Architecture
//!
//! ## Reading
//!
//! - [`detect`] - Sniff whether content looks like a backup document or stanza text
//! - [`backup`] - Recursive discovery of profiles inside backup documents
//! - [`archive`] - Zip members parsed as stanza text
//! - [`ingest`] - Format routing for pasted content and files
//!
//! ## Transforming
//!
//! - [`prune`] - Duplicate removal by peer, removal by id
//! - [`obfuscation`] - Obfuscation parameter injection with configurable profiles
//!
//! ## Writing
//!
//! - [`backup`] - Backup document generation
//! - [`archive`] - Zip packaging and single-file export
//! - [`export`] - Bulk text, backup and format-following exports
//!
//! # Failure model
//!
//! Readers never fail on bad content: malformed input, unreadable
//! sub-documents and incomplete profiles all yield fewer profiles. Callers
//! that need to tell "not JSON" from "no profiles" use
//! [`backup::try_parse_backup_document`]. Only file and archive I/O return
//! errors.
//!
//! # Examples
//!
//! ```ignore
//! use awg_convert::{apply_obfuscation, deduplicate, ingest_text, package_archive};
//!
//! let import = ingest_text(&std::fs::read_to_string("peers.conf")?);
//! let configs = apply_obfuscation(&deduplicate(&import.configs));
//! let zip = package_archive(&configs)?;
//! zip.write_to(std::path::Path::new("."))?;
//! ```

pub mod archive;
pub mod backup;
pub mod detect;
pub mod export;
pub mod ingest;
pub mod obfuscation;
pub mod prune;

pub use archive::{
    file_stem, package_archive, package_single, read_archive, read_archive_with_ids,
    ArchiveError, ArchiveImport, ARCHIVE_FILENAME,
};
pub use backup::{
    generate_backup_document, parse_backup_document, parse_backup_document_with_ids,
    try_parse_backup_document, BackupError, BackupExtraction,
};
pub use detect::{detect_format, DetectedFormat};
pub use export::{
    export_as, export_backup, export_bulk_text, ExportFile, BACKUP_FILENAME, BULK_FILENAME,
};
pub use ingest::{
    ingest_file, ingest_file_with_ids, ingest_text, ingest_text_with_ids, Import, ImportFormat,
    IngestError,
};
pub use obfuscation::{
    apply_obfuscation, apply_obfuscation_with, default_obfuscation_profile,
    load_obfuscation_profile, ObfuscationProfile, ProfileLoadError,
};
pub use prune::{deduplicate, remove_by_id};
