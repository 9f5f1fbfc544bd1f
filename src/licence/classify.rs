//! Classifier - separates addon licences from product licences and picks the
//! product licence matching the installed variant.

use serde::Serialize;

use super::record::LicenceRecord;

/// Highest product code that can still denote the application itself
const MAX_PRODUCT_CODE: u8 = 5;

/// Variant label for a product code
pub fn variant_label(code: u8) -> Option<&'static str> {
    match code {
        0x00 => Some("Suite"),
        0x01 => Some("Standard"),
        0x02 => Some("Intro"),
        0x04 => Some("Lite"),
        _ => None,
    }
}

/// Addon when the high byte is set or the low byte exceeds the product range
pub fn is_addon(product_id_raw: [u8; 2]) -> bool {
    product_id_raw[0] != 0x00 || product_id_raw[1] > MAX_PRODUCT_CODE
}

/// Licences sorted for one installed variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    /// Addon licences in file order
    pub addons: Vec<LicenceRecord>,
    /// Product licence matching the requested variant, if any
    pub licence: Option<LicenceRecord>,
}

/// Partition `records` and select the product licence for `variant`.
///
/// When several product records match, the last one wins. Product codes
/// without a label (3 and 5) are neither addons nor a match.
pub fn classify(records: &[LicenceRecord], variant: &str) -> ClassificationResult {
    let mut result = ClassificationResult::default();

    for record in records {
        if is_addon(record.product_id_raw) {
            result.addons.push(record.clone());
            continue;
        }

        match variant_label(record.product_id_raw[1]) {
            Some(label) if label == variant => {
                if result.licence.is_some() {
                    tracing::debug!(
                        logical_id = record.logical_id,
                        variant,
                        "Later product licence replaces earlier match"
                    );
                }
                result.licence = Some(record.clone());
            }
            _ => {}
        }
    }

    tracing::debug!(
        records = records.len(),
        addons = result.addons.len(),
        matched = result.licence.is_some(),
        variant,
        "Classified licences"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::licence::fixture;

    fn record(logical_id: usize, raw: [u8; 2]) -> LicenceRecord {
        LicenceRecord {
            logical_id,
            product_id_raw: raw,
            ..fixture::golden_record()
        }
    }

    #[test]
    fn lite_record_matches_lite_variant() {
        let records = vec![record(0, [0x00, 0x04])];
        let result = classify(&records, "Lite");
        assert_eq!(result.licence.map(|r| r.logical_id), Some(0));
        assert!(result.addons.is_empty());
    }

    #[test]
    fn variant_mismatch_leaves_licence_absent() {
        let records = vec![record(0, [0x00, 0x04])];
        let result = classify(&records, "Suite");
        assert!(result.licence.is_none());
        assert!(result.addons.is_empty());
    }

    #[test]
    fn high_low_byte_is_always_addon() {
        for variant in ["Suite", "Standard", "Intro", "Lite", ""] {
            let records = vec![record(0, [0x00, 0x06]), record(1, [0x00, 0xFF])];
            let result = classify(&records, variant);
            assert_eq!(result.addons.len(), 2);
            assert!(result.licence.is_none());
        }
    }

    #[test]
    fn high_byte_set_is_addon() {
        let records = vec![record(0, [0x01, 0x00])];
        let result = classify(&records, "Suite");
        assert_eq!(result.addons.len(), 1);
        assert!(result.licence.is_none());
    }

    #[test]
    fn last_matching_record_wins() {
        let records = vec![
            record(0, [0x00, 0x00]),
            record(1, [0x00, 0x10]),
            record(2, [0x00, 0x00]),
        ];
        let result = classify(&records, "Suite");
        assert_eq!(result.licence.map(|r| r.logical_id), Some(2));
        assert_eq!(result.addons.len(), 1);
        assert_eq!(result.addons[0].logical_id, 1);
    }

    #[test]
    fn unlabelled_product_codes_are_neither() {
        let records = vec![record(0, [0x00, 0x03]), record(1, [0x00, 0x05])];
        let result = classify(&records, "Suite");
        assert!(result.addons.is_empty());
        assert!(result.licence.is_none());
    }

    #[test]
    fn label_table() {
        assert_eq!(variant_label(0), Some("Suite"));
        assert_eq!(variant_label(1), Some("Standard"));
        assert_eq!(variant_label(2), Some("Intro"));
        assert_eq!(variant_label(3), None);
        assert_eq!(variant_label(4), Some("Lite"));
        assert_eq!(variant_label(5), None);
    }

    #[test]
    fn result_never_exceeds_input() {
        let records: Vec<_> = (0..=255u8).map(|b| record(b as usize, [0x00, b])).collect();
        for variant in ["Suite", "Standard", "Intro", "Lite"] {
            let result = classify(&records, variant);
            let total = result.addons.len() + usize::from(result.licence.is_some());
            assert!(total <= records.len());
            assert_eq!(result.addons.len(), 250);
        }
    }
}
