use std::borrow::Cow;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace, warn};
use wgconf_core::{keys, IdSource, TunnelConfig};

use super::BackupExtraction;

/// Top-level fields that older exports store as JSON-encoded strings.
const STRING_ENCODED_FIELDS: [&str; 2] = ["Servers", "serversList"];

/// Container keys checked on every object, in priority order.
const CONTAINER_KEYS: [&str; 2] = ["wireguard", "awg"];

const LAST_CONFIG: &str = "last_config";
const INTERFACE_MARKER: &str = "[interface]";

const INTERFACE_KEYS: [&str; 3] = [keys::PRIVATE_KEY, keys::ADDRESS, keys::DNS];
const PEER_KEYS: [&str; 4] = [
    keys::PUBLIC_KEY,
    keys::ALLOWED_IPS,
    keys::ENDPOINT,
    keys::PERSISTENT_KEEPALIVE,
];

/// Why a container was found but produced nothing.
#[derive(Debug, Error)]
enum NodeError {
    #[error("last_config string is neither JSON nor stanza text")]
    Unreadable,
    #[error("last_config holds {0}, expected an object or stanza text")]
    UnexpectedShape(&'static str),
}

/// Decode JSON without serde_json's nesting limit.
///
/// Deep documents are parsed on a growable stack.
pub(super) fn decode_json(text: &str) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Replace string-encoded top-level arrays with their decoded form.
///
/// Strings that do not decode are left untouched.
pub(super) fn decode_string_fields(root: &mut Value) {
    let Value::Object(map) = root else {
        return;
    };

    for field in STRING_ENCODED_FIELDS {
        let decoded = match map.get(field) {
            Some(Value::String(raw)) => decode_json(raw).ok(),
            _ => None,
        };
        if let Some(inner) = decoded {
            map.insert(field.to_string(), inner);
        }
    }
}

/// Walk the whole tree and collect every profile found in a container.
pub(super) fn find_profiles(root: &Value, ids: &mut dyn IdSource) -> BackupExtraction {
    let mut search = Search {
        ids,
        found: BackupExtraction::default(),
    };
    search.visit(root);
    search.found
}

struct Search<'a> {
    ids: &'a mut dyn IdSource,
    found: BackupExtraction,
}

impl Search<'_> {
    /// Pre-order walk in document order, driven by an explicit stack.
    fn visit(&mut self, root: &Value) {
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            match node {
                Value::Object(map) => {
                    self.inspect(map);
                    pending.extend(map.values().rev());
                }
                Value::Array(items) => pending.extend(items.iter().rev()),
                Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
            }
        }
    }

    fn inspect(&mut self, node: &Map<String, Value>) {
        let Some(last_config) = container_of(node)
            .and_then(|container| container.get(LAST_CONFIG))
            .filter(|value| is_truthy(value))
        else {
            return;
        };

        match self.extract(node, last_config) {
            Ok(configs) => {
                for config in &configs {
                    debug!(id = %config.id, name = %config.name, "found backup profile");
                }
                self.found.configs.extend(configs);
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable backup container");
                self.found.skipped_nodes += 1;
            }
        }
    }

    fn extract(
        &mut self,
        node: &Map<String, Value>,
        last_config: &Value,
    ) -> Result<Vec<TunnelConfig>, NodeError> {
        let document = match last_config {
            Value::String(raw) => match decode_json(raw) {
                Ok(decoded) => Cow::Owned(decoded),
                Err(_) if has_interface_marker(raw) => return Ok(self.from_stanza_text(node, raw)),
                Err(_) => return Err(NodeError::Unreadable),
            },
            other => Cow::Borrowed(other),
        };

        match &*document {
            Value::Object(inner) => Ok(self.from_inner_document(node, inner).into_iter().collect()),
            Value::String(text) if has_interface_marker(text) => {
                Ok(self.from_stanza_text(node, text))
            }
            other => Err(NodeError::UnexpectedShape(kind_of(other))),
        }
    }

    /// Stanza text stored in `last_config`: parse it, then let the
    /// enclosing object's label and id win over the generated ones.
    fn from_stanza_text(&mut self, node: &Map<String, Value>, text: &str) -> Vec<TunnelConfig> {
        let mut configs = wgconf_core::parse_with_ids(text, &mut *self.ids);
        for config in &mut configs {
            if let Some(label) = label_of(node) {
                config.name = label;
            }
            if let Some(id) = scalar_text(node.get("id")) {
                config.id = id;
            }
        }
        configs
    }

    /// The `{ "config": {...}, "peers": [{...}] }` shape.
    ///
    /// Only the private key is required here; the peer half is not checked.
    fn from_inner_document(
        &mut self,
        node: &Map<String, Value>,
        inner: &Map<String, Value>,
    ) -> Option<TunnelConfig> {
        let mut config = TunnelConfig::default();

        if let Some(fields) = inner.get("config").and_then(Value::as_object) {
            for key in INTERFACE_KEYS.into_iter().chain(keys::OBFUSCATION) {
                if let Some(value) = scalar_text(fields.get(key)) {
                    config.interface.set(key, value);
                }
            }
        }

        let first_peer = inner
            .get("peers")
            .and_then(Value::as_array)
            .and_then(|peers| peers.first())
            .and_then(Value::as_object);
        if let Some(fields) = first_peer {
            for key in PEER_KEYS {
                if let Some(value) = scalar_text(fields.get(key)) {
                    config.peer.set(key, value);
                }
            }
        }

        if !config.has_private_key() {
            trace!("dropping backup profile without private key");
            return None;
        }

        config.id = scalar_text(node.get("id")).unwrap_or_else(|| self.ids.next_id());
        config.name = label_of(node)
            .unwrap_or_else(|| format!("Amnezia-{}", self.found.configs.len() + 1));
        Some(config)
    }
}

/// The first populated container on an object, `wireguard` before `awg`.
fn container_of(node: &Map<String, Value>) -> Option<&Map<String, Value>> {
    CONTAINER_KEYS
        .into_iter()
        .filter_map(|key| node.get(key))
        .find(|value| is_truthy(value))
        .and_then(Value::as_object)
}

/// `description`, falling back to `name`.
fn label_of(node: &Map<String, Value>) -> Option<String> {
    scalar_text(node.get("description")).or_else(|| scalar_text(node.get("name")))
}

/// Non-empty strings and numbers as text; anything else is absent.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Integral floats print without a fraction: `4.0` becomes `4`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

/// Presence test used for containers and `last_config`: null, false, zero
/// and the empty string count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn has_interface_marker(text: &str) -> bool {
    text.to_ascii_lowercase().contains(INTERFACE_MARKER)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a plain string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
