//! WCAG relative luminance and contrast ratio.

use crate::foundation::core::Rgb8;

/// Contrast ratio recommended by WCAG AA for normal-size text.
pub const WCAG_AA_NORMAL_TEXT: f64 = 4.5;

fn linearize(c: u8) -> f64 {
    let v = f64::from(c) / 255.0;
    if v <= 0.03928 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of an sRGB color using BT.709 weights, in `[0, 1]`.
pub fn relative_luminance(c: Rgb8) -> f64 {
    0.2126 * linearize(c.r) + 0.7152 * linearize(c.g) + 0.0722 * linearize(c.b)
}

/// Contrast ratio between two luminances, in `[1, 21]`.
pub fn contrast_ratio_luminance(l1: f64, l2: f64) -> f64 {
    let lighter = l1.max(l2);
    let darker = l1.min(l2);
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast ratio between two colors. Symmetric in its arguments.
pub fn contrast_ratio(a: Rgb8, b: Rgb8) -> f64 {
    contrast_ratio_luminance(relative_luminance(a), relative_luminance(b))
}

#[cfg(test)]
#[path = "../../tests/unit/color/contrast.rs"]
mod tests;
