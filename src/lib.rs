//! live-probe Library
//!
//! Inspects a macOS host for installed copies of Ableton Live and reports
//! version, architecture, variant and licence status.
//!
//! # Features
//!
//! - **Licence decoding**: Signature-driven decoder for the undocumented
//!   `Unlock.cfg` store, with positional serial deinterleaving
//! - **Classification**: Separates addon licences from product licences and
//!   matches the product licence to the installed variant
//! - **Discovery**: Finds Live bundles and reads `Info.plist`,
//!   `Installation.cfg` and the executable's Mach-O header
//! - **Read-only**: Never writes to the inspected application or store
//!
//! # Example
//!
//! ```no_run
//! use live_probe::discovery::{scan_applications, DiscoveryOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let apps = scan_applications(&DiscoveryOptions::default()).await?;
//!
//!     for app in &apps {
//!         println!("{} {} licensed={}", app.rel_path, app.version, app.licence.is_some());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod licence;
pub mod report;

// Re-export commonly used types
pub use config::Config;
pub use discovery::{scan_applications, AppInfo, Arch, DiscoveryOptions, Version};
pub use licence::{
    classify, decode, decode_report, load_licences, ClassificationResult, DecodeReport,
    LicenceError, LicenceKind, LicenceRecord,
};
pub use report::{LicenceReport, ScanReport};
