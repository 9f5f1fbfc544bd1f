//! Discovery - find installed copies of Live and collect what we know about them.
//!
//! Search directories are listed one level deep. Each `.app` bundle whose
//! name looks like Live and whose `Info.plist` carries the Live bundle
//! identifier is turned into an [`AppInfo`]: version, variant, architecture,
//! licence status and any problems found by [`checks::runtime_checks`].

pub mod bundle;
pub mod checks;
pub mod macho;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

use crate::licence::{self, LicenceRecord};
use bundle::{InstallationConfig, PlistInfo};

pub use checks::{host_os_version, runtime_checks};
pub use macho::Arch;
pub use version::Version;

/// Everything reported about one installation
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppInfo {
    /// Bundle directory name, e.g. "Ableton Live 11 Suite.app"
    pub rel_path: String,
    pub abs_path: PathBuf,
    pub version: Version,
    /// Raw `CFBundleVersion`
    pub full_version: String,
    pub min_system_version: String,
    /// Installed tier from `Installation.cfg`
    pub variant: String,
    pub icon: PathBuf,
    pub arch: Vec<Arch>,
    /// Product licence matching `variant`
    pub licence: Option<LicenceRecord>,
    pub addons: Vec<LicenceRecord>,
    pub errors: Vec<String>,
    pub ok: bool,
}

/// Options for a discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Directories whose immediate children are inspected
    pub search_dirs: Vec<PathBuf>,
    /// Root holding the per-version `Live x.y.z/Unlock/Unlock.cfg` stores
    pub store_root: PathBuf,
    /// Upper bound on reading one licence store
    pub read_timeout: Duration,
    /// Host OS version for runtime checks (`None` skips OS checks)
    pub host_version: Option<Version>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            search_dirs: default_search_dirs(),
            store_root: licence::default_store_root(),
            read_timeout: licence::DEFAULT_READ_TIMEOUT,
            host_version: None,
        }
    }
}

/// `/Applications` and `~/Applications`
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut search = vec![PathBuf::from("/Applications")];
    if let Some(home) = dirs::home_dir() {
        search.push(home.join("Applications"));
    }
    search
}

fn app_name_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Ableton .{1,100}(\.app)?").ok())
        .as_ref()
}

/// Whether a directory name could be a (possibly renamed) Live bundle
pub fn is_candidate_name(name: &str) -> bool {
    app_name_regex().is_some_and(|re| re.is_match(name))
}

/// Directories directly under each search dir whose names look like Live.
///
/// Unreadable search directories are logged and skipped.
pub fn candidate_bundles(search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for dir in search_dirs {
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "Search directory missing, skipping");
            continue;
        }

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(
                        dir = %dir.display(),
                        error = %e,
                        "Cannot read search directory entry"
                    );
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }
            if is_candidate_name(&entry.file_name().to_string_lossy()) {
                found.push(entry.into_path());
            }
        }
    }

    found
}

/// Inspect one bundle. `Ok(None)` when it turns out not to be Live.
pub async fn app_info(bundle: &Path, options: &DiscoveryOptions) -> Result<Option<AppInfo>> {
    let plist_path = bundle.join("Contents").join("Info.plist");
    let plist = match PlistInfo::read(&plist_path).await {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(
                bundle = %bundle.display(),
                error = %e,
                "Skipping bundle without usable Info.plist"
            );
            return Ok(None);
        }
    };

    if !plist.is_live() {
        if plist.bundle_identifier().is_some() {
            tracing::warn!(plist = %plist_path.display(), "Detected malformed Live application");
        }
        return Ok(None);
    }

    let resources = bundle.join("Contents").join("Resources");
    let mut errors = Vec::new();
    let installation = match InstallationConfig::read(&resources.join("Installation.cfg")).await {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(bundle = %bundle.display(), error = %e, "Installation variant unknown");
            errors.push(format!("{:#}", e));
            InstallationConfig::default()
        }
    };

    let full_version = plist.bundle_version().unwrap_or_default().to_string();
    let version = full_version
        .split_whitespace()
        .next()
        .and_then(Version::coerce)
        .unwrap_or_default();

    let mut info = AppInfo {
        rel_path: bundle
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        abs_path: bundle.to_path_buf(),
        version,
        full_version,
        min_system_version: plist.min_system_version().unwrap_or_default().to_string(),
        variant: installation.variant,
        icon: resources.join(plist.icon_file().unwrap_or_default()),
        arch: macho::detect_arch(&bundle.join("Contents").join("MacOS").join("Live")).await,
        errors,
        ..Default::default()
    };

    let sorted = licence::sorted_licences(
        &options.store_root,
        &info.version,
        &info.variant,
        options.read_timeout,
    )
    .await;

    match sorted {
        Ok(sorted) => {
            info.licence = sorted.licence;
            info.addons = sorted.addons;
        }
        Err(e) => {
            tracing::error!(bundle = %bundle.display(), error = %e, "Licence store unreadable");
            info.errors.push(e.to_string());
        }
    }

    info.errors.extend(runtime_checks(&info, options.host_version));
    info.ok = info.errors.is_empty();

    tracing::info!(
        bundle = %info.rel_path,
        version = %info.version,
        variant = %info.variant,
        licensed = info.licence.is_some(),
        addons = info.addons.len(),
        ok = info.ok,
        "Inspected installation"
    );

    Ok(Some(info))
}

/// Find and inspect every installation under the configured search dirs.
///
/// A bundle that fails inspection is logged and left out of the result.
pub async fn scan_applications(options: &DiscoveryOptions) -> Result<Vec<AppInfo>> {
    let candidates = candidate_bundles(&options.search_dirs);
    tracing::info!(
        search_dirs = options.search_dirs.len(),
        candidates = candidates.len(),
        "Scanning for installations"
    );

    let mut apps = Vec::new();
    for bundle in candidates {
        match app_info(&bundle, options).await {
            Ok(Some(info)) => apps.push(info),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(bundle = %bundle.display(), error = %e, "Failed to inspect bundle");
            }
        }
    }

    Ok(apps)
}
