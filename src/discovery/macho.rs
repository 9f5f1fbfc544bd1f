//! Mach-O header sniffing for the bundle executable.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;

/// Bytes needed to identify magic + cpu type
pub const HEADER_LEN: usize = 8;

/// CPU architecture of a bundle executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    X32,
    Arm64,
    Unknown,
}

impl Arch {
    /// Classify the first 8 bytes of a Mach-O (or fat) binary.
    pub fn from_header(header: &[u8]) -> Self {
        // Magic (MH_CIGAM*, FAT_MAGIC) followed by the first cpu type word
        match hex::encode(header).as_str() {
            // MH_CIGAM_64 / FAT_MAGIC, CPU_TYPE_I386 | CPU_ARCH_ABI64
            "cffaedfe07000001" | "cafebabe07000001" => Arch::X64,
            // MH_CIGAM / FAT_MAGIC, CPU_TYPE_I386
            "cefaedfe07000000" | "cafebabe07000000" => Arch::X32,
            // MH_CIGAM_64, CPU_TYPE_ARM | CPU_ARCH_ABI64
            "cffaedfe12000001" => Arch::Arm64,
            _ => Arch::Unknown,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Arch::X64 => "x64",
            Arch::X32 => "x32",
            Arch::Arm64 => "arm64",
            Arch::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Read the first `n` bytes of a file. `None` on any I/O failure.
pub async fn read_header_bytes(path: &Path, n: usize) -> Option<Vec<u8>> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Cannot open executable");
            return None;
        }
    };

    let mut buf = vec![0u8; n];
    match file.read_exact(&mut buf).await {
        Ok(_) => Some(buf),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Executable header too short");
            None
        }
    }
}

/// Architectures of the executable at `path`
pub async fn detect_arch(path: &Path) -> Vec<Arch> {
    let arch = read_header_bytes(path, HEADER_LEN)
        .await
        .map(|h| Arch::from_header(&h))
        .unwrap_or(Arch::Unknown);

    if arch == Arch::Unknown {
        tracing::warn!(path = %path.display(), "Unknown executable architecture");
    }

    vec![arch]
}
