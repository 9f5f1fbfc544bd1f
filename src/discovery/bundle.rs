//! Readers for the two bundle files discovery needs: `Contents/Info.plist`
//! and `Contents/Resources/Installation.cfg`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

/// Bundle identifier every Live build carries
pub const LIVE_BUNDLE_ID: &str = "com.ableton.live";

/// String-valued keys of an XML property list
#[derive(Debug, Clone, Default)]
pub struct PlistInfo {
    entries: HashMap<String, String>,
}

/// Plist tokens that affect string entries.
/// Groups: 1 key, 2 string body, 3 opened container, 4 closed container.
/// A bare `<string/>` matches with no group set.
fn plist_token_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)<key>\s*([^<]*?)\s*</key>|<string>([^<]*)</string>|<string\s*/>|<(dict|array)\s*>|</(dict|array)\s*>",
        )
        .ok()
    })
    .as_ref()
}

impl PlistInfo {
    /// Extract the string-valued entries of the root `<dict>`.
    ///
    /// Only XML plists are understood. Non-string values are ignored, and so
    /// is everything nested inside arrays or child dicts.
    pub fn parse(xml: &str) -> Result<Self> {
        anyhow::ensure!(xml.contains("<plist"), "Not an XML property list");
        let re = plist_token_regex().context("Plist pattern unavailable")?;

        let mut entries = HashMap::new();
        let mut depth = 0usize;
        let mut pending_key: Option<String> = None;

        for c in re.captures_iter(xml) {
            if let Some(key) = c.get(1) {
                if depth == 1 {
                    pending_key = Some(unescape_xml(key.as_str()));
                }
            } else if c.get(3).is_some() {
                depth += 1;
                pending_key = None;
            } else if c.get(4).is_some() {
                depth = depth.saturating_sub(1);
            } else if depth == 1 {
                let value = c.get(2).map_or("", |m| m.as_str());
                if let Some(key) = pending_key.take() {
                    entries.insert(key, unescape_xml(value));
                }
            }
        }

        Ok(Self { entries })
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let xml = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read plist: {}", path.display()))?;
        Self::parse(&xml).with_context(|| format!("Failed to parse plist: {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn bundle_identifier(&self) -> Option<&str> {
        self.get("CFBundleIdentifier")
    }

    pub fn bundle_version(&self) -> Option<&str> {
        self.get("CFBundleVersion")
    }

    pub fn min_system_version(&self) -> Option<&str> {
        self.get("LSMinimumSystemVersion")
    }

    pub fn icon_file(&self) -> Option<&str> {
        self.get("CFBundleIconFile")
    }

    pub fn is_live(&self) -> bool {
        self.bundle_identifier() == Some(LIVE_BUNDLE_ID)
    }
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// `Installation.cfg` contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallationConfig {
    /// Product tier: Suite, Standard, Intro, Lite
    #[serde(default)]
    pub variant: String,
}

impl InstallationConfig {
    pub async fn read(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read installation config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse installation config: {}", path.display()))
    }
}
