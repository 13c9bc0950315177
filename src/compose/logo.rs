use image::RgbImage;

use crate::{
    assets::decode::Logo,
    brief::rules::BrandRules,
    compose::composite::overlay_straight,
    foundation::{
        core::{CanvasSize, PixelBox},
        error::{ForgeError, ForgeResult},
    },
};

/// Logo area percentage to use: the override clamped into the rule range, else the midpoint.
pub fn resolve_area_pct(rules: &BrandRules, override_pct: Option<f64>) -> f64 {
    let (lo, hi) = (
        rules.brand.logo_area_pct_min,
        rules.brand.logo_area_pct_max,
    );
    match override_pct {
        Some(p) if p.is_finite() => p.clamp(lo, hi),
        _ => rules.logo_area_midpoint(),
    }
}

/// Logo `(width, height)` covering `pct` percent of `canvas` at the given aspect ratio.
pub fn compute_logo_size(canvas: CanvasSize, aspect: f64, pct: f64) -> ForgeResult<(u32, u32)> {
    if !aspect.is_finite() || aspect <= 0.0 {
        return Err(ForgeError::validation(format!(
            "logo aspect must be finite and > 0, got {aspect}"
        )));
    }
    if !pct.is_finite() || pct <= 0.0 {
        return Err(ForgeError::validation(format!(
            "logo area pct must be finite and > 0, got {pct}"
        )));
    }
    let target = canvas.area() as f64 * pct / 100.0;
    let h = (target / aspect).sqrt().floor().max(1.0);
    let w = (h * aspect).floor().max(1.0);
    Ok((
        (w as u32).min(canvas.width),
        (h as u32).min(canvas.height),
    ))
}

/// Inset from the bottom-right corner.
pub fn logo_margin(canvas: CanvasSize) -> u32 {
    (canvas.min_side() / 40).max(16)
}

/// Where a logo ended up and how much of the canvas it covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogoPlacement {
    pub rect: PixelBox,
    pub area_pct: f64,
}

/// Render `logo` at the size for `pct` and composite it bottom-right.
#[tracing::instrument(skip(canvas, logo))]
pub fn place_logo(canvas: &mut RgbImage, logo: &Logo, pct: f64) -> ForgeResult<LogoPlacement> {
    let size = CanvasSize::new(canvas.width(), canvas.height())?;
    let (w, h) = compute_logo_size(size, logo.aspect(), pct)?;
    let margin = logo_margin(size);
    let x = size.width.saturating_sub(w + margin);
    let y = size.height.saturating_sub(h + margin);

    let rendered = logo.render(w, h)?;
    overlay_straight(canvas, &rendered, x, y);

    Ok(LogoPlacement {
        rect: PixelBox {
            x,
            y,
            width: w,
            height: h,
        },
        area_pct: pct,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/logo.rs"]
mod tests;
