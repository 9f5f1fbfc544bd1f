//! Signature scanner - locates licence record windows in a store buffer.
//!
//! Records have no length prefix. Each one is preceded by a fixed
//! signature and occupies a fixed-size window starting right after it.

use serde::Serialize;

/// Record-start signature: `00 00 07` followed by ASCII "Licence".
///
/// The leading zero bytes keep the signature from matching inside the
/// file header.
pub const RECORD_SIGNATURE: &[u8; 10] = b"\x00\x00\x07Licence";

/// Size of one record window in bytes
pub const RECORD_LEN: usize = 205;

/// First offset the search starts from
const SEARCH_START: usize = 1;

/// A candidate record window inside the store buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordWindow {
    /// Offset of the signature that introduced this window
    pub signature_offset: usize,
    /// Start of the window (signature offset + signature length)
    pub start: usize,
}

impl RecordWindow {
    pub fn end(&self) -> usize {
        self.start + RECORD_LEN
    }

    /// Borrow the window bytes, or `None` if they run past the buffer
    pub fn slice<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        data.get(self.start..self.end())
    }
}

/// A signature match whose window ran past the end of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedWindow {
    pub signature_offset: usize,
    /// Bytes actually available after the signature
    pub available: usize,
}

/// Result of scanning a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// In-bounds windows in file order
    pub windows: Vec<RecordWindow>,
    /// Truncated windows, dropped from `windows`
    pub skipped: Vec<SkippedWindow>,
}

/// Find `needle` in `haystack` at or after `from`.
pub(crate) fn find_signature(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let nlen = needle.len();
    if nlen == 0 || haystack.len() < nlen || from > haystack.len() - nlen {
        return None;
    }

    (from..=haystack.len() - nlen)
        .find(|&i| haystack[i] == needle[0] && haystack[i..i + nlen] == *needle)
}

/// Walk `data` and collect every record window.
///
/// Matches at offset 0 or 1 are never accepted. Searching resumes one byte
/// after each match until no further signature is found.
pub fn scan(data: &[u8]) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    let mut from = SEARCH_START;

    while let Some(pos) = find_signature(data, RECORD_SIGNATURE, from) {
        from = pos + 1;
        if pos <= 1 {
            continue;
        }

        let window = RecordWindow {
            signature_offset: pos,
            start: pos + RECORD_SIGNATURE.len(),
        };

        if window.end() <= data.len() {
            outcome.windows.push(window);
        } else {
            let available = data.len().saturating_sub(window.start);
            tracing::warn!(
                signature_offset = pos,
                available,
                needed = RECORD_LEN,
                "Skipping truncated licence record"
            );
            outcome.skipped.push(SkippedWindow {
                signature_offset: pos,
                available,
            });
        }
    }

    tracing::debug!(
        windows = outcome.windows.len(),
        skipped = outcome.skipped.len(),
        "Signature scan complete"
    );

    outcome
}
