//! Runtime sanity checks on a discovered installation.

use std::process::Command;

use super::macho::Arch;
use super::{AppInfo, Version};

/// Last macOS release able to run 32-bit applications
const LAST_32_BIT_HOST: Version = Version::new(10, 15, 0);

/// Host macOS version from `sw_vers`, `None` off macOS or on failure
pub fn host_os_version() -> Option<Version> {
    let output = Command::new("sw_vers").arg("-productVersion").output().ok()?;
    if !output.status.success() {
        return None;
    }
    Version::coerce(&String::from_utf8_lossy(&output.stdout))
}

/// Problems that keep `info` from running (or running licensed) on `host`.
///
/// OS checks are skipped when the host version is unknown.
pub fn runtime_checks(info: &AppInfo, host: Option<Version>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(host) = host {
        if host > LAST_32_BIT_HOST && info.arch.contains(&Arch::X32) {
            errors.push("Current platform does not support 32-bit Ableton".to_string());
        }

        if let Some(min) = Version::coerce(&info.min_system_version) {
            if host < min {
                errors.push(format!(
                    "Unsupported OS, needs {} or newer",
                    info.min_system_version
                ));
            }
        }
    }

    if info.licence.is_none() {
        errors.push(format!(
            "Missing licence for {} version {}",
            info.variant, info.version
        ));
    }

    errors
}
