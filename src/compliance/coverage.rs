use image::RgbImage;

use crate::{
    color::hsv::HsvMatcher,
    foundation::core::Rgb8,
};

/// Width the post is reduced to before classification.
pub const COVERAGE_SAMPLE_WIDTH: u32 = 200;

/// Percentage of pixels matching the brand color, measured on a downscaled copy.
pub fn primary_coverage_pct(image: &RgbImage, matcher: &HsvMatcher) -> f64 {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let sw = w.min(COVERAGE_SAMPLE_WIDTH);
    let sh = ((u64::from(h) * u64::from(sw)) / u64::from(w)).max(1) as u32;
    let sample = if (sw, sh) == (w, h) {
        image.clone()
    } else {
        image::imageops::resize(image, sw, sh, image::imageops::FilterType::Triangle)
    };

    let total = sample.pixels().len();
    let matches = sample
        .pixels()
        .filter(|p| matcher.matches(Rgb8::new(p.0[0], p.0[1], p.0[2])))
        .count();
    matches as f64 / total.max(1) as f64 * 100.0
}
