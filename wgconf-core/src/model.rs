use indexmap::IndexMap;
use serde::Serialize;

/// Wire names of the well-known stanza keys.
pub mod keys {
    pub const PRIVATE_KEY: &str = "PrivateKey";
    pub const ADDRESS: &str = "Address";
    pub const DNS: &str = "DNS";
    pub const PUBLIC_KEY: &str = "PublicKey";
    pub const ALLOWED_IPS: &str = "AllowedIPs";
    pub const ENDPOINT: &str = "Endpoint";
    pub const PERSISTENT_KEEPALIVE: &str = "PersistentKeepalive";

    /// Interface keys that tune the obfuscation wrapper, in output order.
    pub const OBFUSCATION: [&str; 9] = ["Jc", "Jmin", "Jmax", "S1", "S2", "H1", "H2", "H3", "H4"];
}

/// Obfuscation parameters carried in the `[Interface]` stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObfuscationParams {
    #[serde(rename = "Jc", skip_serializing_if = "Option::is_none")]
    pub jc: Option<String>,
    #[serde(rename = "Jmin", skip_serializing_if = "Option::is_none")]
    pub jmin: Option<String>,
    #[serde(rename = "Jmax", skip_serializing_if = "Option::is_none")]
    pub jmax: Option<String>,
    #[serde(rename = "S1", skip_serializing_if = "Option::is_none")]
    pub s1: Option<String>,
    #[serde(rename = "S2", skip_serializing_if = "Option::is_none")]
    pub s2: Option<String>,
    #[serde(rename = "H1", skip_serializing_if = "Option::is_none")]
    pub h1: Option<String>,
    #[serde(rename = "H2", skip_serializing_if = "Option::is_none")]
    pub h2: Option<String>,
    #[serde(rename = "H3", skip_serializing_if = "Option::is_none")]
    pub h3: Option<String>,
    #[serde(rename = "H4", skip_serializing_if = "Option::is_none")]
    pub h4: Option<String>,
}

impl ObfuscationParams {
    /// Return the slot backing a wire key, if the key is an obfuscation key.
    pub fn slot(&self, key: &str) -> Option<&Option<String>> {
        let slot = match key {
            "Jc" => &self.jc,
            "Jmin" => &self.jmin,
            "Jmax" => &self.jmax,
            "S1" => &self.s1,
            "S2" => &self.s2,
            "H1" => &self.h1,
            "H2" => &self.h2,
            "H3" => &self.h3,
            "H4" => &self.h4,
            _ => return None,
        };
        Some(slot)
    }

    /// Mutable counterpart of [`ObfuscationParams::slot`].
    pub fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        let slot = match key {
            "Jc" => &mut self.jc,
            "Jmin" => &mut self.jmin,
            "Jmax" => &mut self.jmax,
            "S1" => &mut self.s1,
            "S2" => &mut self.s2,
            "H1" => &mut self.h1,
            "H2" => &mut self.h2,
            "H3" => &mut self.h3,
            "H4" => &mut self.h4,
            _ => return None,
        };
        Some(slot)
    }

    /// Present parameters in output order.
    pub fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let values: [&'a Option<String>; 9] = [
            &self.jc, &self.jmin, &self.jmax, &self.s1, &self.s2, &self.h1, &self.h2, &self.h3,
            &self.h4,
        ];
        keys::OBFUSCATION
            .into_iter()
            .zip(values)
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// Key/value pairs of the `[Interface]` stanza.
///
/// Well-known keys live in typed fields; anything else is kept in `extra`
/// in first-seen order so it survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceFields {
    #[serde(rename = "PrivateKey")]
    pub private_key: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "DNS", skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
    #[serde(flatten)]
    pub obfuscation: ObfuscationParams,
    #[serde(flatten)]
    pub extra: IndexMap<String, String>,
}

impl InterfaceFields {
    /// Look up a value by its wire key. Keys are case-sensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            keys::PRIVATE_KEY => Some(self.private_key.as_str()),
            keys::ADDRESS => Some(self.address.as_str()),
            keys::DNS => self.dns.as_deref(),
            _ => match self.obfuscation.slot(key) {
                Some(slot) => slot.as_deref(),
                None => self.extra.get(key).map(String::as_str),
            },
        }
    }

    /// Store a value under its wire key, overwriting any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            keys::PRIVATE_KEY => self.private_key = value,
            keys::ADDRESS => self.address = value,
            keys::DNS => self.dns = Some(value),
            _ => match self.obfuscation.slot_mut(key) {
                Some(slot) => *slot = Some(value),
                None => {
                    self.extra.insert(key.to_string(), value);
                }
            },
        }
    }

    /// All present pairs: known keys in canonical order, then unrecognized
    /// keys in insertion order.
    pub fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let known: [(&'a str, Option<&'a str>); 3] = [
            (keys::PRIVATE_KEY, Some(self.private_key.as_str())),
            (keys::ADDRESS, Some(self.address.as_str())),
            (keys::DNS, self.dns.as_deref()),
        ];
        known
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .chain(self.obfuscation.entries())
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// Key/value pairs of the `[Peer]` stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeerFields {
    #[serde(rename = "PublicKey")]
    pub public_key: String,
    #[serde(rename = "AllowedIPs")]
    pub allowed_ips: String,
    #[serde(rename = "Endpoint")]
    pub endpoint: String,
    #[serde(
        rename = "PersistentKeepalive",
        skip_serializing_if = "Option::is_none"
    )]
    pub persistent_keepalive: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, String>,
}

impl PeerFields {
    /// Look up a value by its wire key. Keys are case-sensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            keys::PUBLIC_KEY => Some(self.public_key.as_str()),
            keys::ALLOWED_IPS => Some(self.allowed_ips.as_str()),
            keys::ENDPOINT => Some(self.endpoint.as_str()),
            keys::PERSISTENT_KEEPALIVE => self.persistent_keepalive.as_deref(),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    /// Store a value under its wire key, overwriting any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            keys::PUBLIC_KEY => self.public_key = value,
            keys::ALLOWED_IPS => self.allowed_ips = value,
            keys::ENDPOINT => self.endpoint = value,
            keys::PERSISTENT_KEEPALIVE => self.persistent_keepalive = Some(value),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// All present pairs: known keys in canonical order, then unrecognized
    /// keys in insertion order.
    pub fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let known: [(&'a str, Option<&'a str>); 4] = [
            (keys::PUBLIC_KEY, Some(self.public_key.as_str())),
            (keys::ALLOWED_IPS, Some(self.allowed_ips.as_str())),
            (keys::ENDPOINT, Some(self.endpoint.as_str())),
            (
                keys::PERSISTENT_KEEPALIVE,
                self.persistent_keepalive.as_deref(),
            ),
        ];
        known
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Split view of the `Endpoint` value.
    pub fn endpoint(&self) -> Endpoint<'_> {
        Endpoint::parse(&self.endpoint)
    }
}

/// One tunnel profile, independent of the format it was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TunnelConfig {
    /// Opaque identifier, stable across transforms.
    pub id: String,
    /// Display label.
    pub name: String,
    pub interface: InterfaceFields,
    pub peer: PeerFields,
}

impl TunnelConfig {
    /// Create an empty profile with the given identity.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            interface: InterfaceFields::default(),
            peer: PeerFields::default(),
        }
    }

    /// A profile is usable when it has a private key and something to
    /// reach: a peer public key or an endpoint.
    pub fn is_valid(&self) -> bool {
        self.has_private_key()
            && (!self.peer.public_key.is_empty() || !self.peer.endpoint.is_empty())
    }

    /// Looser check applied to profiles recovered from backup documents.
    pub fn has_private_key(&self) -> bool {
        !self.interface.private_key.is_empty()
    }
}

/// A `host:port` endpoint split on its last colon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub host: &'a str,
    pub port: Option<&'a str>,
}

impl<'a> Endpoint<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.rsplit_once(':') {
            Some((host, port)) => Self {
                host,
                port: Some(port),
            },
            None => Self {
                host: raw,
                port: None,
            },
        }
    }

    /// Numeric port, if present and well-formed.
    pub fn port_number(&self) -> Option<u64> {
        self.port.and_then(|p| p.trim().parse().ok())
    }
}
