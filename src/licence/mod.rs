//! Licence database decoder for `Unlock.cfg` stores.
//!
//! The store format is undocumented. Decoding is signature-driven: after the
//! 4-byte magic is checked, every record is located by searching for a fixed
//! signature and read from a fixed-size window at fixed offsets. Any change
//! to the on-disk layout is likely to break this, which is why a mismatched
//! header is a hard error rather than an empty result.
//!
//! # Failure policy
//!
//! - **Absent store** (cannot be read at all): `Ok(vec![])`
//! - **Bad magic**: [`LicenceError::InvalidFormatHeader`]
//! - **Truncated record**: that record is skipped, the rest are kept
//!
//! # Example
//!
//! ```no_run
//! use live_probe::licence;
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = std::fs::read("Unlock.cfg")?;
//! let records = licence::decode(&data)?;
//! let sorted = licence::classify(&records, "Suite");
//! println!("{} addons, licensed: {}", sorted.addons.len(), sorted.licence.is_some());
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod deinterleave;
pub mod record;
pub mod scanner;

#[cfg(test)]
pub(crate) mod fixture;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::discovery::Version;

pub use classify::{classify, is_addon, variant_label, ClassificationResult};
pub use deinterleave::deinterleave;
pub use record::{decode_record, LicenceKind, LicenceRecord};
pub use scanner::{scan, RecordWindow, ScanOutcome, SkippedWindow, RECORD_LEN, RECORD_SIGNATURE};

/// Magic bytes at the start of every store
pub const MAGIC: [u8; 4] = [0xAB, 0x1E, 0x56, 0x78];

/// Default upper bound on reading the store file
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised by the licence decoder
#[derive(Debug, Error)]
pub enum LicenceError {
    /// The store exists but does not start with the expected magic
    #[error("invalid licence store header: expected AB1E5678, found {found:?}")]
    InvalidFormatHeader { found: String },

    /// A record window is shorter than the fixed record length
    #[error("licence record {logical_id} truncated: {len} of {needed} bytes")]
    TruncatedRecord {
        logical_id: usize,
        len: usize,
        needed: usize,
    },
}

/// Outcome of decoding a whole store, including skipped windows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    pub records: Vec<LicenceRecord>,
    pub skipped: Vec<SkippedWindow>,
}

/// Validate the 4-byte magic at the start of `data`.
pub fn check_header(data: &[u8]) -> Result<(), LicenceError> {
    match data.get(..MAGIC.len()) {
        Some(header) if header == MAGIC.as_slice() => Ok(()),
        _ => Err(LicenceError::InvalidFormatHeader {
            found: hex::encode_upper(&data[..data.len().min(MAGIC.len())]),
        }),
    }
}

/// Decode every record in a store buffer, reporting skipped windows.
pub fn decode_report(data: &[u8]) -> Result<DecodeReport, LicenceError> {
    check_header(data)?;

    let outcome = scan(data);
    let mut report = DecodeReport {
        records: Vec::with_capacity(outcome.windows.len()),
        skipped: outcome.skipped,
    };

    for window in &outcome.windows {
        let logical_id = report.records.len();
        let bytes = window.slice(data).unwrap_or_default();
        match decode_record(bytes, logical_id) {
            Ok(record) => report.records.push(record),
            Err(e) => {
                tracing::warn!(signature_offset = window.signature_offset, "{}", e);
                report.skipped.push(SkippedWindow {
                    signature_offset: window.signature_offset,
                    available: bytes.len(),
                });
            }
        }
    }

    Ok(report)
}

/// Decode every record in a store buffer.
pub fn decode(data: &[u8]) -> Result<Vec<LicenceRecord>, LicenceError> {
    decode_report(data).map(|report| report.records)
}

/// Path of the store for one installed version under `store_root`
pub fn unlock_path(store_root: &Path, version: &Version) -> PathBuf {
    store_root
        .join(format!("Live {}.{}.{}", version.major, version.minor, version.patch))
        .join("Unlock")
        .join("Unlock.cfg")
}

/// Default store root: `~/Library/Application Support/Ableton`
pub fn default_store_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Library")
        .join("Application Support")
        .join("Ableton")
}

/// Read the raw store, or `None` if it cannot be read within `timeout`.
pub async fn read_store(path: &Path, timeout: Duration) -> Option<Vec<u8>> {
    match tokio::time::timeout(timeout, tokio::fs::read(path)).await {
        Ok(Ok(data)) => Some(data),
        Ok(Err(e)) => {
            tracing::debug!(path = %path.display(), error = %e, "Licence store not readable");
            None
        }
        Err(_) => {
            tracing::warn!(
                path = %path.display(),
                timeout_ms = timeout.as_millis() as u64,
                "Timed out reading licence store"
            );
            None
        }
    }
}

/// Load and decode a store. An unreadable store yields no records.
pub async fn load_licences(path: &Path) -> Result<Vec<LicenceRecord>, LicenceError> {
    load_licences_with_timeout(path, DEFAULT_READ_TIMEOUT).await
}

pub async fn load_licences_with_timeout(
    path: &Path,
    timeout: Duration,
) -> Result<Vec<LicenceRecord>, LicenceError> {
    let Some(data) = read_store(path, timeout).await else {
        return Ok(Vec::new());
    };

    let records = decode(&data)?;
    tracing::info!(path = %path.display(), records = records.len(), "Decoded licence store");
    Ok(records)
}

/// Load the store for `version` and classify it for `variant`.
pub async fn sorted_licences(
    store_root: &Path,
    version: &Version,
    variant: &str,
    timeout: Duration,
) -> Result<ClassificationResult, LicenceError> {
    let path = unlock_path(store_root, version);
    let records = load_licences_with_timeout(&path, timeout).await?;
    Ok(classify(&records, variant))
}
