//! Report rendering - human readable and JSON output for scans and decodes.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::discovery::AppInfo;
use crate::licence::{ClassificationResult, DecodeReport, LicenceKind, LicenceRecord};

/// JSON envelope for a discovery scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scanned_at: DateTime<Utc>,
    pub tool_version: String,
    pub apps: Vec<AppInfo>,
}

impl ScanReport {
    pub fn new(apps: Vec<AppInfo>) -> Self {
        Self {
            scanned_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            apps,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.apps.iter().all(|a| a.ok)
    }
}

/// JSON envelope for a decoded store
#[derive(Debug, Clone, Serialize)]
pub struct LicenceReport {
    pub source: String,
    #[serde(flatten)]
    pub decoded: DecodeReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
}

fn format_record(out: &mut String, record: &LicenceRecord) {
    let kind = match record.kind() {
        LicenceKind::Product => "product".green(),
        LicenceKind::Addon => "addon".cyan(),
    };
    out.push_str(&format!(
        "  #{} [{}] {}\n",
        record.logical_id,
        kind,
        record.product_name().bold()
    ));
    out.push_str(&format!("      serial:       {}\n", record.serial));
    out.push_str(&format!(
        "      product id:   {}  version code: {}  distribution: {}\n",
        record.product_id, record.version_code, record.distribution_type
    ));
    out.push_str(&format!("      licence id:   {}\n", record.licence_id));
}

/// Human readable listing of installations
pub fn format_apps(apps: &[AppInfo]) -> String {
    let mut out = String::new();

    if apps.is_empty() {
        out.push_str(&format!("{}\n", "No Ableton Live installations found".yellow()));
        return out;
    }

    for app in apps {
        let status = if app.ok { "OK".green().bold() } else { "PROBLEMS".red().bold() };
        out.push_str(&format!("{} {}\n", app.rel_path.bold(), status));
        out.push_str(&format!("  path:     {}\n", app.abs_path.display()));
        out.push_str(&format!("  version:  {} ({})\n", app.version, app.full_version));
        out.push_str(&format!("  variant:  {}\n", app.variant));
        let arch: Vec<String> = app.arch.iter().map(|a| a.to_string()).collect();
        out.push_str(&format!("  arch:     {}\n", arch.join(", ")));
        out.push_str(&format!("  min OS:   {}\n", app.min_system_version));

        match &app.licence {
            Some(l) => out.push_str(&format!("  licence:  {}\n", l.serial.green())),
            None => out.push_str(&format!("  licence:  {}\n", "none".red())),
        }
        if !app.addons.is_empty() {
            out.push_str(&format!("  addons:   {}\n", app.addons.len()));
        }
        for err in &app.errors {
            out.push_str(&format!("  {} {}\n", "!".red().bold(), err));
        }
        out.push('\n');
    }

    out
}

/// Human readable listing of a decoded store
pub fn format_licences(report: &LicenceReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} record(s)\n",
        report.source.bold(),
        report.decoded.records.len()
    ));

    for record in &report.decoded.records {
        format_record(&mut out, record);
    }

    for skipped in &report.decoded.skipped {
        out.push_str(&format!(
            "  {} truncated record at offset {} ({} bytes available)\n",
            "!".yellow().bold(),
            skipped.signature_offset,
            skipped.available
        ));
    }

    if let (Some(variant), Some(sorted)) = (&report.variant, &report.classification) {
        match &sorted.licence {
            Some(l) => out.push_str(&format!(
                "Licence for {}: #{} {}\n",
                variant,
                l.logical_id,
                l.serial.green()
            )),
            None => out.push_str(&format!(
                "{}\n",
                format!("Missing licence for {}", variant).red()
            )),
        }
        out.push_str(&format!("Addons: {}\n", sorted.addons.len()));
    }

    out
}
