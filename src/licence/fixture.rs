//! Reference store used by the decoder tests.

use super::record::{decode_record, LicenceRecord};
use super::scanner::{RECORD_LEN, RECORD_SIGNATURE};
use super::MAGIC;

/// Magic plus filler before the first signature
pub const HEADER_LEN: usize = 16;

pub const GOLDEN_SERIAL: &str = "51A8-6AE6-DFDB-8C40-E26E-500F";

pub const GOLDEN_RESPONSE: &str =
    "AC9F5F44DC8A8D18AFE9A9B2FF7A00407A2543EFD57F1F9E310726723BF7E34493A80D980394449D";

/// Serial region as stored: byte-swapped pairs followed by two pad bytes
const GOLDEN_SERIAL_REGION: [u8; 22] = [
    0xA8, 0x51, 0x00, 0x00, 0xE6, 0x6A, 0x00, 0x00, 0xDB, 0xDF, 0x00, 0x00, 0x40, 0x8C, 0x00,
    0x00, 0x6E, 0xE2, 0x00, 0x00, 0x0F, 0x50,
];

/// One 205-byte record window matching the reference store
pub fn golden_window() -> Vec<u8> {
    let mut w = vec![0u8; RECORD_LEN];
    w[4..26].copy_from_slice(&GOLDEN_SERIAL_REGION);
    w[28] = 0x04;
    w[29] = 0x00;
    w[32] = 160;
    w[40] = 0x50;
    // UTF-16LE style: every character followed by a zero byte
    for (i, b) in GOLDEN_RESPONSE.bytes().enumerate() {
        w[44 + i * 2] = b;
    }
    w
}

/// Signature followed by the golden window
pub fn golden_record_bytes() -> Vec<u8> {
    let mut bytes = RECORD_SIGNATURE.to_vec();
    bytes.extend(golden_window());
    bytes
}

/// Whole store holding exactly one record
pub fn golden_store() -> Vec<u8> {
    let mut data = MAGIC.to_vec();
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x10, 0x20, 0x30, 0x40]);
    debug_assert_eq!(data.len(), HEADER_LEN);
    data.extend(golden_record_bytes());
    data
}

pub fn golden_record() -> LicenceRecord {
    decode_record(&golden_window(), 0).expect("golden window decodes")
}
