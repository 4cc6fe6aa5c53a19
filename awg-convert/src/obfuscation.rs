//! AmneziaWG obfuscation parameter injection.
//!
//! Every profile gets the same junk-packet and padding settings (`Jc`,
//! `Jmin`, `Jmax`, `S1`, `S2`), four freshly drawn header values (`H1`..`H4`)
//! and a peer keepalive. Values come from an [`ObfuscationProfile`], which
//! defaults to the embedded `profiles/obfuscation.toml`.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use wgconf_core::TunnelConfig;

/// Values written by [`apply_obfuscation_with`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObfuscationProfile {
    pub jc: u32,
    pub jmin: u32,
    pub jmax: u32,
    pub s1: u32,
    pub s2: u32,
    /// Exclusive upper bound for `H1`..`H4`.
    pub header_max: u64,
    pub persistent_keepalive: u32,
}

impl Default for ObfuscationProfile {
    fn default() -> Self {
        Self {
            jc: 5,
            jmin: 50,
            jmax: 1000,
            s1: 30,
            s2: 30,
            header_max: 1_000_000_000,
            persistent_keepalive: 25,
        }
    }
}

/// Errors returned when loading obfuscation profiles.
#[derive(Debug, Error)]
pub enum ProfileLoadError {
    #[error("failed to read obfuscation profile {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse obfuscation profile {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid obfuscation profile {path}: {reason}")]
    Invalid { path: String, reason: String },
}

/// Load an obfuscation profile from a TOML file.
pub fn load_obfuscation_profile(path: &Path) -> Result<ObfuscationProfile, ProfileLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ProfileLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_profile(&raw, path.display().to_string())
}

/// Built-in profile.
pub fn default_obfuscation_profile() -> ObfuscationProfile {
    let embedded = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/profiles/obfuscation.toml"
    ));
    parse_profile(embedded, "embedded profile".to_string()).unwrap_or_default()
}

fn parse_profile(raw: &str, path: String) -> Result<ObfuscationProfile, ProfileLoadError> {
    let profile: ObfuscationProfile = toml::from_str(raw).map_err(|source| {
        ProfileLoadError::Parse {
            path: path.clone(),
            source,
        }
    })?;
    if profile.header_max == 0 {
        return Err(ProfileLoadError::Invalid {
            path,
            reason: "header_max must be greater than zero".to_string(),
        });
    }
    Ok(profile)
}

/// Apply the built-in profile using the thread-local generator.
pub fn apply_obfuscation(configs: &[TunnelConfig]) -> Vec<TunnelConfig> {
    apply_obfuscation_with(
        configs,
        &default_obfuscation_profile(),
        &mut rand::thread_rng(),
    )
}

/// Overwrite the obfuscation fields of every profile.
///
/// Returns new profiles with the same ids. Header values are redrawn on
/// every call, so applying twice changes `H1`..`H4` again.
pub fn apply_obfuscation_with<R: Rng + ?Sized>(
    configs: &[TunnelConfig],
    profile: &ObfuscationProfile,
    rng: &mut R,
) -> Vec<TunnelConfig> {
    let out: Vec<TunnelConfig> = configs
        .iter()
        .map(|config| {
            let mut next = config.clone();
            let params = &mut next.interface.obfuscation;
            params.jc = Some(profile.jc.to_string());
            params.jmin = Some(profile.jmin.to_string());
            params.jmax = Some(profile.jmax.to_string());
            params.s1 = Some(profile.s1.to_string());
            params.s2 = Some(profile.s2.to_string());
            for slot in [&mut params.h1, &mut params.h2, &mut params.h3, &mut params.h4] {
                *slot = Some(rng.gen_range(0..profile.header_max).to_string());
            }
            next.peer.persistent_keepalive = Some(profile.persistent_keepalive.to_string());
            next
        })
        .collect();

    debug!(count = out.len(), "applied obfuscation parameters");
    out
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use wgconf_core::TunnelConfig;

    use super::{
        apply_obfuscation, apply_obfuscation_with, default_obfuscation_profile,
        load_obfuscation_profile, parse_profile, ObfuscationProfile, ProfileLoadError,
    };

    fn sample() -> Vec<TunnelConfig> {
        let mut a = TunnelConfig::new("a", "first");
        a.interface.set("PrivateKey", "K1");
        a.interface.set("Jc", "9");
        a.peer.set("PublicKey", "P1");
        let mut b = TunnelConfig::new("b", "second");
        b.interface.set("PrivateKey", "K2");
        b.peer.set("Endpoint", "h:1");
        vec![a, b]
    }

    fn header_values(config: &TunnelConfig) -> Vec<u64> {
        ["H1", "H2", "H3", "H4"]
            .into_iter()
            .map(|k| {
                config
                    .interface
                    .get(k)
                    .expect("header present")
                    .parse::<u64>()
                    .expect("numeric header")
            })
            .collect()
    }

    #[test]
    fn embedded_profile_matches_builtin_defaults() {
        let embedded = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/profiles/obfuscation.toml"
        ));
        let parsed = parse_profile(embedded, "embedded profile".to_string())
            .expect("embedded profile should parse");
        assert_eq!(parsed, ObfuscationProfile::default());
        assert_eq!(default_obfuscation_profile(), parsed);
    }

    #[test]
    fn sets_fixed_values_and_bounded_headers() {
        let input = sample();
        let out = apply_obfuscation(&input);

        assert_eq!(out.len(), 2);
        for (before, after) in input.iter().zip(&out) {
            assert_eq!(after.id, before.id);
            assert_eq!(after.interface.get("Jc"), Some("5"));
            assert_eq!(after.interface.get("Jmin"), Some("50"));
            assert_eq!(after.interface.get("Jmax"), Some("1000"));
            assert_eq!(after.interface.get("S1"), Some("30"));
            assert_eq!(after.interface.get("S2"), Some("30"));
            assert_eq!(after.peer.get("PersistentKeepalive"), Some("25"));
            assert!(header_values(after).iter().all(|h| *h < 1_000_000_000));
        }
        assert_eq!(input[0].interface.get("Jc"), Some("9"));
    }

    #[test]
    fn seeded_generator_gives_reproducible_headers() {
        let profile = ObfuscationProfile::default();
        let first = apply_obfuscation_with(&sample(), &profile, &mut StdRng::seed_from_u64(7));
        let second = apply_obfuscation_with(&sample(), &profile, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn reapplying_redraws_headers_only() {
        let profile = ObfuscationProfile::default();
        let mut rng = StdRng::seed_from_u64(11);
        let once = apply_obfuscation_with(&sample(), &profile, &mut rng);
        let twice = apply_obfuscation_with(&once, &profile, &mut rng);

        assert_eq!(once[0].interface.obfuscation.jc, twice[0].interface.obfuscation.jc);
        assert_ne!(header_values(&once[0]), header_values(&twice[0]));
    }

    #[test]
    fn tiny_header_range_pins_values() {
        let profile = ObfuscationProfile {
            header_max: 1,
            ..ObfuscationProfile::default()
        };
        let out = apply_obfuscation_with(&sample(), &profile, &mut StdRng::seed_from_u64(1));
        assert_eq!(header_values(&out[0]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn loads_custom_profile_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "jc = 3\njmin = 10\njmax = 20\ns1 = 0\ns2 = 0\nheader_max = 100\npersistent_keepalive = 15\n",
        )
        .expect("write profile");

        let profile = load_obfuscation_profile(&path).expect("profile should parse");
        assert_eq!(profile.jc, 3);
        assert_eq!(profile.header_max, 100);
    }

    #[test]
    fn rejects_broken_and_zero_range_profiles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "jc = [").expect("write broken file");
        match load_obfuscation_profile(&broken).expect_err("should fail parse") {
            ProfileLoadError::Parse { .. } => {}
            other => panic!("unexpected error variant: {other}"),
        }

        let zero = "jc = 1\njmin = 1\njmax = 1\ns1 = 1\ns2 = 1\nheader_max = 0\npersistent_keepalive = 1\n";
        match parse_profile(zero, "inline".to_string()).expect_err("should reject") {
            ProfileLoadError::Invalid { .. } => {}
            other => panic!("unexpected error variant: {other}"),
        }

        match load_obfuscation_profile(&dir.path().join("missing.toml")).expect_err("missing") {
            ProfileLoadError::Io { .. } => {}
            other => panic!("unexpected error variant: {other}"),
        }
    }
}
