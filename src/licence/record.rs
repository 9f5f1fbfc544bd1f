//! Fixed-offset decoding of a single licence record window.

use serde::{Serialize, Serializer};

use super::classify::{is_addon, variant_label};
use super::deinterleave::deinterleave;
use super::scanner::RECORD_LEN;
use super::LicenceError;

// Offsets relative to the start of the record window
const LICENCE_ID: usize = 0;
const SERIAL: std::ops::Range<usize> = 4..26;
const PRODUCT_LO: usize = 28;
const PRODUCT_HI: usize = 29;
const VERSION_CODE: usize = 32;
const DISTRIBUTION_TYPE: usize = 40;
const RESPONSE: std::ops::Range<usize> = 44..204;

/// Hex characters per dash-separated serial group
const SERIAL_GROUP: usize = 4;

/// Whether a record unlocks the application itself or an addon pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LicenceKind {
    Product,
    Addon,
}

/// One decoded licence entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenceRecord {
    /// Position among the records emitted for this file
    pub logical_id: usize,
    /// Index stored directly after the signature
    pub licence_id: i16,
    /// Product code bytes, high byte first
    #[serde(serialize_with = "as_hex")]
    pub product_id_raw: [u8; 2],
    /// Uppercase hex of `product_id_raw`, without a leading "00"
    pub product_id: String,
    pub version_code: u8,
    pub distribution_type: u8,
    /// Dash-grouped uppercase hex serial, e.g. `51A8-6AE6-...`
    pub serial: String,
    #[serde(serialize_with = "as_hex")]
    pub serial_bytes: Vec<u8>,
    /// Opaque activation response
    pub response_code: String,
}

fn as_hex<S, T>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&hex::encode_upper(bytes))
}

impl LicenceRecord {
    pub fn kind(&self) -> LicenceKind {
        if is_addon(self.product_id_raw) {
            LicenceKind::Addon
        } else {
            LicenceKind::Product
        }
    }

    /// Variant label for product licences (`Suite`, `Standard`, ...)
    pub fn variant(&self) -> Option<&'static str> {
        match self.kind() {
            LicenceKind::Product => variant_label(self.product_id_raw[1]),
            LicenceKind::Addon => None,
        }
    }

    /// Display name, e.g. "Ableton Live Suite" or "Unknown Addon 0x1A2B"
    pub fn product_name(&self) -> String {
        match self.variant() {
            Some(variant) => format!("Ableton Live {}", variant),
            None => format!("Unknown Addon 0x{}", self.product_id),
        }
    }
}

/// Decode one record window.
///
/// Fails with [`LicenceError::TruncatedRecord`] if `window` is shorter than
/// a full record; never reads out of bounds.
pub fn decode_record(window: &[u8], logical_id: usize) -> Result<LicenceRecord, LicenceError> {
    if window.len() < RECORD_LEN {
        return Err(LicenceError::TruncatedRecord {
            logical_id,
            len: window.len(),
            needed: RECORD_LEN,
        });
    }

    let licence_id = i16::from_le_bytes([window[LICENCE_ID], window[LICENCE_ID + 1]]);
    let product_id_raw = [window[PRODUCT_HI], window[PRODUCT_LO]];
    let serial_bytes = deinterleave(&window[SERIAL]);

    Ok(LicenceRecord {
        logical_id,
        licence_id,
        product_id_raw,
        product_id: format_product_id(product_id_raw),
        version_code: window[VERSION_CODE],
        distribution_type: window[DISTRIBUTION_TYPE],
        serial: format_serial(&serial_bytes),
        serial_bytes,
        response_code: decode_response(&window[RESPONSE]),
    })
}

/// Hex-encode the product code, dropping a zero high byte.
///
/// `Installation.cfg` style product ids omit the leading zero byte, so
/// `00 04` becomes `"04"` while `1A 2B` stays `"1A2B"`.
pub(crate) fn format_product_id(raw: [u8; 2]) -> String {
    if raw[0] == 0x00 {
        hex::encode_upper([raw[1]])
    } else {
        hex::encode_upper(raw)
    }
}

pub(crate) fn format_serial(bytes: &[u8]) -> String {
    let hex = hex::encode_upper(bytes);
    hex.as_bytes()
        .chunks(SERIAL_GROUP)
        .map(|group| String::from_utf8_lossy(group))
        .collect::<Vec<_>>()
        .join("-")
}

/// Every zero byte in the region is dropped, not just a trailing run.
pub(crate) fn decode_response(region: &[u8]) -> String {
    region
        .iter()
        .filter(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::licence::fixture;

    #[test]
    fn golden_window() {
        let window = fixture::golden_window();
        let rec = decode_record(&window, 0).unwrap();
        assert_eq!(rec.logical_id, 0);
        assert_eq!(rec.licence_id, 0);
        assert_eq!(rec.product_id_raw, [0x00, 0x04]);
        assert_eq!(rec.product_id, "04");
        assert_eq!(rec.version_code, 160);
        assert_eq!(rec.distribution_type, 80);
        assert_eq!(rec.serial, fixture::GOLDEN_SERIAL);
        assert_eq!(rec.serial_bytes.len(), 12);
        assert_eq!(rec.response_code, fixture::GOLDEN_RESPONSE);
        assert_eq!(rec.kind(), LicenceKind::Product);
        assert_eq!(rec.variant(), Some("Lite"));
        assert_eq!(rec.product_name(), "Ableton Live Lite");
    }

    #[test]
    fn licence_id_is_signed_little_endian() {
        let mut window = fixture::golden_window();
        window[0] = 0xFE;
        window[1] = 0xFF;
        assert_eq!(decode_record(&window, 3).unwrap().licence_id, -2);

        window[0] = 0x02;
        window[1] = 0x01;
        assert_eq!(decode_record(&window, 3).unwrap().licence_id, 0x0102);
    }

    #[test]
    fn short_window_is_rejected() {
        let window = fixture::golden_window();
        let err = decode_record(&window[..RECORD_LEN - 1], 7).unwrap_err();
        assert!(matches!(
            err,
            LicenceError::TruncatedRecord {
                logical_id: 7,
                len: 204,
                needed: RECORD_LEN
            }
        ));
    }

    #[test]
    fn product_id_formatting() {
        assert_eq!(format_product_id([0x00, 0x04]), "04");
        assert_eq!(format_product_id([0x00, 0x00]), "00");
        assert_eq!(format_product_id([0x1A, 0x2B]), "1A2B");
        assert_eq!(format_product_id([0x01, 0x00]), "0100");
    }

    #[test]
    fn addon_names() {
        let mut window = fixture::golden_window();
        window[PRODUCT_HI] = 0x1A;
        window[PRODUCT_LO] = 0x2B;
        let rec = decode_record(&window, 0).unwrap();
        assert_eq!(rec.kind(), LicenceKind::Addon);
        assert_eq!(rec.variant(), None);
        assert_eq!(rec.product_name(), "Unknown Addon 0x1A2B");
    }

    #[test]
    fn serial_grouping() {
        assert_eq!(format_serial(&[0x51, 0xA8, 0x6A, 0xE6]), "51A8-6AE6");
        assert_eq!(format_serial(&[0xAB, 0xCD, 0xEF]), "ABCD-EF");
        assert_eq!(format_serial(&[]), "");
    }

    #[test]
    fn response_drops_every_zero() {
        assert_eq!(decode_response(b"A\0B\0\0\0C\0"), "ABC");
        assert_eq!(decode_response(b"\0\0\0"), "");
        assert_eq!(decode_response(b"AB\0CD"), "ABCD");
    }

    #[test]
    fn serializes_raw_fields_as_hex() {
        let rec = decode_record(&fixture::golden_window(), 0).unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["product_id_raw"], "0004");
        assert_eq!(json["serial_bytes"], "51A86AE6DFDB8C40E26E500F");
        assert_eq!(json["distribution_type"], 80);
    }
}
