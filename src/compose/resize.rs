use image::{RgbImage, imageops::FilterType};

use crate::foundation::{
    core::CanvasSize,
    error::{ForgeError, ForgeResult},
};

/// Scaled size before the center crop: uniform scale `max(tw/sw, th/sh)`, never smaller than
/// the target on either axis.
pub fn cover_scaled_size(src_w: u32, src_h: u32, target: CanvasSize) -> (u32, u32) {
    let scale = (f64::from(target.width) / f64::from(src_w))
        .max(f64::from(target.height) / f64::from(src_h));
    let nw = ((f64::from(src_w) * scale).floor() as u32).max(target.width);
    let nh = ((f64::from(src_h) * scale).floor() as u32).max(target.height);
    (nw, nh)
}

/// Fill `target` exactly: uniform scale to cover, then center-crop the excess.
pub fn cover_resize(src: &RgbImage, target: CanvasSize) -> ForgeResult<RgbImage> {
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return Err(ForgeError::validation("cannot cover-resize an empty image"));
    }
    if (sw, sh) == (target.width, target.height) {
        return Ok(src.clone());
    }

    let (nw, nh) = cover_scaled_size(sw, sh, target);
    let resized = image::imageops::resize(src, nw, nh, FilterType::Lanczos3);
    let left = (nw - target.width) / 2;
    let top = (nh - target.height) / 2;
    Ok(image::imageops::crop_imm(&resized, left, top, target.width, target.height).to_image())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/resize.rs"]
mod tests;
