//! Canonical tunnel profiles and the line-oriented stanza format
//! (`[Interface]` / `[Peer]`) they are read from and written to.
//!
//! Higher-level converters build on [`TunnelConfig`] as the single shape every
//! import and export passes through.

pub mod ids;
pub mod model;
pub mod parser;
pub mod writer;

pub use ids::{IdSource, SequentialIds, UuidIds};
pub use model::{keys, Endpoint, InterfaceFields, ObfuscationParams, PeerFields, TunnelConfig};
pub use parser::{parse, parse_file, parse_with_ids, ParseError};
pub use writer::{write, write_all, write_file, WriteError};
