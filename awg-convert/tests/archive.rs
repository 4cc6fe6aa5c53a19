use std::io::{Cursor, Read};

use awg_convert::{
    ingest_file_with_ids, package_archive, read_archive_with_ids, ImportFormat,
    ARCHIVE_FILENAME,
};
use pretty_assertions::assert_eq;
use wgconf_core::{SequentialIds, TunnelConfig};
use zip::ZipArchive;

fn profile(name: &str, private_key: &str) -> TunnelConfig {
    let mut cfg = TunnelConfig::new(format!("id-{private_key}"), name);
    cfg.interface.set("PrivateKey", private_key);
    cfg.interface.set("Address", "10.0.0.2/32");
    cfg.peer.set("PublicKey", format!("pub-{private_key}"));
    cfg.peer.set("Endpoint", "1.2.3.4:51820");
    cfg
}

fn members(bytes: &[u8]) -> Vec<(String, String)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    (0..archive.len())
        .map(|idx| {
            let mut file = archive.by_index(idx).expect("member");
            let mut text = String::new();
            file.read_to_string(&mut text).expect("utf-8 member");
            (file.name().to_string(), text)
        })
        .collect()
}

#[test]
fn packages_one_member_per_profile() {
    let configs = vec![profile("home", "K1"), profile("office", "K2")];
    let file = package_archive(&configs).expect("package");

    assert_eq!(file.filename, ARCHIVE_FILENAME);
    let members = members(&file.bytes);
    let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["home.conf", "office.conf"]);
    assert_eq!(members[0].1, wgconf_core::write(&configs[0]));
}

#[test]
fn colliding_stems_keep_one_member_with_last_profile() {
    let configs = vec![
        profile("My VPN!", "K1"),
        profile("other", "K2"),
        profile("My VPN?", "K3"),
    ];
    let file = package_archive(&configs).expect("package");
    let members = members(&file.bytes);

    let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["My_VPN_.conf", "other.conf"]);
    assert!(members[0].1.contains("PrivateKey = K3"));
}

#[test]
fn archive_round_trip_recovers_profiles() {
    let configs = vec![profile("home", "K1"), profile("office", "K2")];
    let file = package_archive(&configs).expect("package");
    let import =
        read_archive_with_ids(&file.bytes, &mut SequentialIds::new("cfg")).expect("read back");

    assert_eq!(import.files_with_configs, 2);
    assert_eq!(import.skipped_members, 0);
    let keys: Vec<&str> = import
        .configs
        .iter()
        .map(|c| c.interface.private_key.as_str())
        .collect();
    assert_eq!(keys, vec!["K1", "K2"]);
}

#[test]
fn empty_archive_is_still_a_valid_zip() {
    let file = package_archive(&[]).expect("package");
    assert!(members(&file.bytes).is_empty());
}

#[test]
fn garbage_bytes_are_not_an_archive() {
    assert!(read_archive_with_ids(b"definitely not a zip", &mut SequentialIds::new("cfg")).is_err());
}

#[test]
fn ingest_file_routes_by_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let configs = vec![profile("home", "K1")];

    let zip_path = package_archive(&configs)
        .expect("package")
        .write_to(dir.path())
        .expect("write zip");
    let from_zip = ingest_file_with_ids(&zip_path, &mut SequentialIds::new("cfg")).expect("ingest zip");
    assert_eq!(from_zip.format, Some(ImportFormat::Text));
    assert_eq!(from_zip.configs.len(), 1);

    let json_path = awg_convert::export_backup(&configs)
        .expect("backup export")
        .write_to(dir.path())
        .expect("write json");
    let from_json =
        ingest_file_with_ids(&json_path, &mut SequentialIds::new("cfg")).expect("ingest json");
    assert_eq!(from_json.format, Some(ImportFormat::Json));
    assert_eq!(from_json.configs[0].interface.private_key, "K1");

    assert!(ingest_file_with_ids(&dir.path().join("missing.conf"), &mut SequentialIds::new("cfg")).is_err());
}

#[test]
fn non_utf8_text_file_is_decoded_lossily() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("latin1.conf");
    let mut bytes = b"# caf\xe9\n".to_vec();
    bytes.extend_from_slice(b"[Interface]\nPrivateKey = K\n[Peer]\nPublicKey = P\n");
    std::fs::write(&path, bytes).expect("write file");

    let import = ingest_file_with_ids(&path, &mut SequentialIds::new("cfg")).expect("ingest");
    assert_eq!(import.format, Some(ImportFormat::Text));
    assert_eq!(import.configs.len(), 1);
    assert_eq!(import.configs[0].interface.private_key, "K");
}
