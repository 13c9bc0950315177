use std::{path::Path, sync::Arc};

use anyhow::Context;
use image::{RgbImage, RgbaImage};

use crate::foundation::error::{ForgeError, ForgeResult};

/// Decode encoded image bytes into straight RGB8, dropping any alpha.
pub fn decode_rgb(bytes: &[u8]) -> ForgeResult<RgbImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgb8())
}

/// Load a raster image from disk as RGB8.
///
/// Missing or undecodable files are reported as [`ForgeError::Asset`].
pub fn load_rgb(path: &Path) -> ForgeResult<RgbImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| ForgeError::asset(format!("read image '{}': {e}", path.display())))?;
    decode_rgb(&bytes)
        .map_err(|e| ForgeError::asset(format!("decode image '{}': {e}", path.display())))
}

/// Brand logo, either raster (resampled on placement) or vector (rasterized at target size).
#[derive(Clone, Debug)]
pub enum Logo {
    Raster(Arc<RgbaImage>),
    Svg(Arc<usvg::Tree>),
}

impl Logo {
    /// Intrinsic size in pixels (SVG size is its viewport size).
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match self {
            Logo::Raster(img) => (f64::from(img.width()), f64::from(img.height())),
            Logo::Svg(tree) => (
                f64::from(tree.size().width()),
                f64::from(tree.size().height()),
            ),
        }
    }

    /// Width over height.
    pub fn aspect(&self) -> f64 {
        let (w, h) = self.intrinsic_size();
        if h <= 0.0 { 1.0 } else { w / h }
    }

    /// Produce a straight-alpha RGBA raster of exactly `width` x `height`.
    pub fn render(&self, width: u32, height: u32) -> ForgeResult<RgbaImage> {
        match self {
            Logo::Raster(img) => Ok(image::imageops::resize(
                img.as_ref(),
                width,
                height,
                image::imageops::FilterType::Lanczos3,
            )),
            Logo::Svg(tree) => {
                let mut data = rasterize_svg_to_premul_rgba8(tree, width, height)?;
                unpremultiply_rgba8_in_place(&mut data);
                RgbaImage::from_raw(width, height, data)
                    .ok_or_else(|| ForgeError::asset("svg raster buffer size mismatch"))
            }
        }
    }
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> ForgeResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Load a logo from disk; `.svg` files are parsed as vectors, everything else decoded as raster.
pub fn load_logo(path: &Path) -> ForgeResult<Logo> {
    let bytes = std::fs::read(path)
        .map_err(|e| ForgeError::asset(format!("read logo '{}': {e}", path.display())))?;
    let is_svg = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    let logo = if is_svg {
        let tree = parse_svg(&bytes)
            .map_err(|e| ForgeError::asset(format!("parse logo '{}': {e}", path.display())))?;
        Logo::Svg(Arc::new(tree))
    } else {
        let img = image::load_from_memory(&bytes)
            .map_err(|e| ForgeError::asset(format!("decode logo '{}': {e}", path.display())))?
            .to_rgba8();
        Logo::Raster(Arc::new(img))
    };

    let (w, h) = logo.intrinsic_size();
    if !(w > 0.0 && h > 0.0) {
        return Err(ForgeError::asset(format!(
            "logo '{}' has empty dimensions",
            path.display()
        )));
    }
    Ok(logo)
}

fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> ForgeResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ForgeError::asset("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
