use image::{Rgb, RgbImage};

use crate::{
    foundation::{
        error::ForgeResult,
        math::{Fnv1a64, SplitMix64},
    },
    provider::backend::{GenerateRequest, Generated, ImageProvider, ProviderKind},
};

/// Seed used when a request carries none.
pub const DEFAULT_SEED: u64 = 1234;

/// Offline renderer producing a reproducible image from `(seed, size, prompt)` alone.
///
/// The image is a seeded base color with a diagonal light falloff and prompt-derived
/// diagonal banding, so different prompts and seeds are visually distinguishable.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalRenderer;

impl LocalRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Base color for `seed`, each channel in `[32, 224]`.
    pub fn base_color(seed: Option<u64>) -> [u8; 3] {
        let mut rng = SplitMix64::new(seed.unwrap_or(DEFAULT_SEED));
        [
            rng.range_u8(32, 224),
            rng.range_u8(32, 224),
            rng.range_u8(32, 224),
        ]
    }

    pub fn render(req: &GenerateRequest) -> RgbImage {
        let base = Self::base_color(req.seed);
        let (w, h) = (req.size.width, req.size.height);

        let mut hasher = Fnv1a64::new_default();
        hasher.write_bytes(req.prompt.as_bytes());
        hasher.write_u64(req.seed.unwrap_or(DEFAULT_SEED));
        let mut rng = SplitMix64::new(hasher.finish());
        let period = 48 + (rng.next_u64() % 97) as u32;
        let band = period / 3 + 1;
        let slope = 1 + (rng.next_u64() % 3) as u32;
        let phase = (rng.next_u64() % u64::from(period)) as u32;

        let diag = f64::from(w) + f64::from(h);
        RgbImage::from_fn(w, h, |x, y| {
            // Light from the top-left, within +-24 levels.
            let t = (f64::from(x) + f64::from(y)) / diag;
            let shade = ((0.5 - t) * 48.0).round() as i16;
            let stripe: i16 = if (x + slope * y + phase) % period < band { 12 } else { 0 };
            let ch = |c: u8| (i16::from(c) + shade + stripe).clamp(0, 255) as u8;
            Rgb([ch(base[0]), ch(base[1]), ch(base[2])])
        })
    }
}

impl ImageProvider for LocalRenderer {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn health_check(&self) -> bool {
        true
    }

    fn generate_image(&self, req: &GenerateRequest) -> ForgeResult<Generated> {
        let image = Self::render(req);
        let mut metadata = serde_json::Map::new();
        metadata.insert("provider".into(), self.name().into());
        metadata.insert("seed".into(), req.seed.into());
        metadata.insert("prompt".into(), req.prompt.clone().into());
        metadata.insert(
            "size".into(),
            serde_json::json!({"width": req.size.width, "height": req.size.height}),
        );
        Ok(Generated { image, metadata })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/local.rs"]
mod tests;
