use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbImage;

use crate::foundation::error::{ForgeError, ForgeResult};

const REMOTE_SCHEMES: [&str; 4] = ["s3://", "azure://", "dropbox://", "gs://"];

fn reject_remote(path: &Path) -> ForgeResult<()> {
    let s = path.to_string_lossy();
    if let Some(scheme) = REMOTE_SCHEMES.iter().find(|p| s.starts_with(**p)) {
        return Err(ForgeError::storage(format!(
            "{} storage is not implemented: '{s}'",
            scheme.trim_end_matches("://")
        )));
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> ForgeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))
            .map_err(|e| ForgeError::storage(format!("{e:#}")))?;
    }
    Ok(())
}

/// Save `image` as PNG at `path`, creating parent directories.
pub fn save_image(path: &Path, image: &RgbImage) -> ForgeResult<PathBuf> {
    reject_remote(path)?;
    ensure_parent(path)?;
    image::save_buffer_with_format(
        path,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
    .map_err(|e| ForgeError::storage(format!("{e:#}")))?;
    Ok(path.to_path_buf())
}

/// Write `value` as pretty UTF-8 JSON at `path`, creating parent directories.
pub fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> ForgeResult<()> {
    reject_remote(path)?;
    ensure_parent(path)?;
    let mut text = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize json for '{}'", path.display()))?;
    text.push('\n');
    std::fs::write(path, text)
        .with_context(|| format!("write json '{}'", path.display()))
        .map_err(|e| ForgeError::storage(format!("{e:#}")))
}

/// Write raw text at `path`, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> ForgeResult<()> {
    reject_remote(path)?;
    ensure_parent(path)?;
    std::fs::write(path, text)
        .with_context(|| format!("write '{}'", path.display()))
        .map_err(|e| ForgeError::storage(format!("{e:#}")))
}

#[cfg(test)]
#[path = "../../tests/unit/output/storage.rs"]
mod tests;
