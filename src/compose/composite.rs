//! Pixel blending onto an opaque RGB canvas.

use image::{RgbImage, RgbaImage};

use crate::foundation::{
    core::{PixelBox, Rgb8},
    error::{ForgeError, ForgeResult},
    math::mul_div255_u16,
};

/// Premultiplied source over an opaque destination pixel.
pub fn over_opaque(dst: [u8; 3], src_premul: [u8; 4]) -> [u8; 3] {
    let sa = u16::from(src_premul[3]);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mut out = [0u8; 3];
    for i in 0..3 {
        let v = u16::from(src_premul[i]) + mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = v.min(255) as u8;
    }
    out
}

fn premul(c: u8, a: u8) -> u8 {
    mul_div255_u16(u16::from(c), u16::from(a)) as u8
}

/// Blend a solid color with straight `alpha` over every pixel inside `region`.
pub fn fill_rect_blend(canvas: &mut RgbImage, region: PixelBox, color: Rgb8, alpha: u8) {
    let src = [
        premul(color.r, alpha),
        premul(color.g, alpha),
        premul(color.b, alpha),
        alpha,
    ];
    let x_end = (region.x + region.width).min(canvas.width());
    let y_end = (region.y + region.height).min(canvas.height());
    for y in region.y..y_end {
        for x in region.x..x_end {
            let px = canvas.get_pixel_mut(x, y);
            px.0 = over_opaque(px.0, src);
        }
    }
}

/// Composite a premultiplied RGBA8 layer of identical size over the canvas.
pub fn over_premul_layer(canvas: &mut RgbImage, layer: &[u8]) -> ForgeResult<()> {
    let expected = canvas.width() as usize * canvas.height() as usize * 4;
    if layer.len() != expected {
        return Err(ForgeError::validation(format!(
            "layer byte length {} does not match canvas ({expected})",
            layer.len()
        )));
    }
    for (dst, src) in canvas.pixels_mut().zip(layer.chunks_exact(4)) {
        dst.0 = over_opaque(dst.0, [src[0], src[1], src[2], src[3]]);
    }
    Ok(())
}

/// Alpha-composite a straight-alpha image with its top-left corner at `(x, y)`, clipped.
pub fn overlay_straight(canvas: &mut RgbImage, top: &RgbaImage, x: u32, y: u32) {
    for (tx, ty, px) in top.enumerate_pixels() {
        let (cx, cy) = (x + tx, y + ty);
        if cx >= canvas.width() || cy >= canvas.height() {
            continue;
        }
        let [r, g, b, a] = px.0;
        let dst = canvas.get_pixel_mut(cx, cy);
        dst.0 = over_opaque(dst.0, [premul(r, a), premul(g, a), premul(b, a), a]);
    }
}

/// Mean color of the pixels inside `region`, each channel truncated toward zero.
pub fn average_rgb(canvas: &RgbImage, region: PixelBox) -> Option<Rgb8> {
    let x_end = (region.x + region.width).min(canvas.width());
    let y_end = (region.y + region.height).min(canvas.height());
    let mut sum = [0u64; 3];
    let mut n = 0u64;
    for y in region.y..y_end {
        for x in region.x..x_end {
            let p = canvas.get_pixel(x, y).0;
            for i in 0..3 {
                sum[i] += u64::from(p[i]);
            }
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    Some(Rgb8::new(
        (sum[0] / n) as u8,
        (sum[1] / n) as u8,
        (sum[2] / n) as u8,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composite.rs"]
mod tests;
