//! Per-variant metadata sidecars written next to each post image.

use std::path::{Path, PathBuf};

use anyhow::Context;
use sha2::Digest as _;

use crate::{
    foundation::{
        core::{CanvasSize, PixelBox},
        error::{ForgeError, ForgeResult},
    },
    output::storage::write_json,
};

/// Sidecar contents. `logo_area_pct` is always written, as `null` when no logo was placed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Provenance {
    pub provider: String,
    pub product_id: String,
    pub ratio: String,
    pub locale: String,
    pub logo_area_pct: Option<f64>,
    pub seed: Option<u64>,
    pub variant_index: u32,
    /// Generation prompt; `None` when the hero came from a base asset.
    pub prompt: Option<String>,
    pub canvas: CanvasSize,
    pub logo_box: Option<PixelBox>,
    pub text_box: Option<PixelBox>,
    pub contrast_ratio: f64,
    pub backdrop: bool,
    /// Hex SHA-256 of the post's raw RGB8 pixels.
    pub pixels_sha256: String,
}

/// `<asset>.prov.json`
pub fn sidecar_path(asset: &Path) -> PathBuf {
    let mut s = asset.as_os_str().to_os_string();
    s.push(".prov.json");
    PathBuf::from(s)
}

pub fn pixels_sha256(raw: &[u8]) -> String {
    let digest = sha2::Sha256::digest(raw);
    let mut out = String::with_capacity(64);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Write the sidecar for `asset` and return its path.
pub fn write_provenance(asset: &Path, record: &Provenance) -> ForgeResult<PathBuf> {
    let path = sidecar_path(asset);
    write_json(&path, record)?;
    Ok(path)
}

/// Read a sidecar as loose JSON so callers can tell a missing key from an explicit `null`.
pub fn read_provenance_value(asset: &Path) -> ForgeResult<serde_json::Value> {
    let path = sidecar_path(asset);
    let text = std::fs::read_to_string(&path)
        .map_err(|e| ForgeError::storage(format!("read sidecar '{}': {e}", path.display())))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("parse sidecar '{}'", path.display()))?;
    Ok(value)
}

#[cfg(test)]
#[path = "../../tests/unit/output/provenance.rs"]
mod tests;
