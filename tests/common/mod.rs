//! Shared builders for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use live_probe::licence::{MAGIC, RECORD_LEN, RECORD_SIGNATURE};

pub const GOLDEN_SERIAL: &str = "51A8-6AE6-DFDB-8C40-E26E-500F";

pub const GOLDEN_RESPONSE: &str =
    "AC9F5F44DC8A8D18AFE9A9B2FF7A00407A2543EFD57F1F9E310726723BF7E34493A80D980394449D";

/// One record (signature + window) with the given product code bytes
pub fn record_bytes(product_hi: u8, product_lo: u8) -> Vec<u8> {
    let mut w = vec![0u8; RECORD_LEN];
    w[4..26].copy_from_slice(&[
        0xA8, 0x51, 0x00, 0x00, 0xE6, 0x6A, 0x00, 0x00, 0xDB, 0xDF, 0x00, 0x00, 0x40, 0x8C, 0x00,
        0x00, 0x6E, 0xE2, 0x00, 0x00, 0x0F, 0x50,
    ]);
    w[28] = product_lo;
    w[29] = product_hi;
    w[32] = 160;
    w[40] = 0x50;
    for (i, b) in GOLDEN_RESPONSE.bytes().enumerate() {
        w[44 + i * 2] = b;
    }

    let mut bytes = RECORD_SIGNATURE.to_vec();
    bytes.extend(w);
    bytes
}

/// Store header: magic plus filler
pub fn store_header() -> Vec<u8> {
    let mut data = MAGIC.to_vec();
    data.extend_from_slice(&[0u8, 0, 0, 1, 0, 0, 0, 2, 0x10, 0x20, 0x30, 0x40]);
    data
}

/// The reference store: one Lite licence
pub fn golden_store() -> Vec<u8> {
    let mut data = store_header();
    data.extend(record_bytes(0x00, 0x04));
    data
}

/// Signature bytes garbled, header intact
pub fn corrupted_store() -> Vec<u8> {
    let mut data = golden_store();
    let sig = store_header().len();
    data[sig + 4] ^= 0xFF;
    data[sig + 8] ^= 0xFF;
    data
}

/// Everything intact except the magic
pub fn bad_header_store() -> Vec<u8> {
    let mut data = golden_store();
    data[..4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    data
}

/// Write a store for `version` under `root`, returning its path
pub fn install_store(root: &Path, version: &str, data: &[u8]) -> PathBuf {
    let path = root.join(format!("Live {}", version)).join("Unlock").join("Unlock.cfg");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, data).unwrap();
    path
}

/// Lay out a minimal Live bundle under `apps`
pub fn install_bundle(
    apps: &Path,
    name: &str,
    bundle_id: &str,
    bundle_version: &str,
    variant: &str,
    exe_header: &str,
) -> PathBuf {
    let bundle = apps.join(name);
    let contents = bundle.join("Contents");
    std::fs::create_dir_all(contents.join("Resources")).unwrap();
    std::fs::create_dir_all(contents.join("MacOS")).unwrap();

    let plist = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
	<key>CFBundleIconFile</key>
	<string>Live.icns</string>
	<key>CFBundleIdentifier</key>
	<string>{}</string>
	<key>CFBundleVersion</key>
	<string>{}</string>
	<key>LSMinimumSystemVersion</key>
	<string>10.13</string>
</dict>
</plist>
"#,
        bundle_id, bundle_version
    );
    std::fs::write(contents.join("Info.plist"), plist).unwrap();
    std::fs::write(
        contents.join("Resources").join("Installation.cfg"),
        format!(r#"{{"variant": "{}"}}"#, variant),
    )
    .unwrap();

    let mut exe = hex::decode(exe_header).unwrap();
    exe.extend_from_slice(&[0u8; 32]);
    std::fs::write(contents.join("MacOS").join("Live"), exe).unwrap();

    bundle
}
