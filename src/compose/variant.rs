use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::{
    assets::{
        decode::Logo,
        font::{FontSource, TextLayoutEngine},
    },
    brief::{model::Brief, rules::BrandRules},
    compose::{
        logo::{LogoPlacement, place_logo, resolve_area_pct},
        resize::cover_resize,
        text::{DEFAULT_FONT_SIZE, TextBlockOutcome, TextStyle, draw_text_block},
    },
    foundation::{
        core::{CanvasSize, PixelBox, ratio_dir_name},
        error::{ForgeError, ForgeResult},
    },
    output::{
        provenance::{Provenance, pixels_sha256, write_provenance},
        storage::save_image,
    },
    resolve::source::ResolvedHero,
};

/// Per-run styling overrides. Passed explicitly into composition.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DesignOverrides {
    pub headline: Option<String>,
    pub cta: Option<String>,
    pub font_size: Option<f32>,
    pub logo_area_pct: Option<f64>,
    pub prompt_hints: Option<String>,
}

/// One rendered variant, as listed in the run report.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantResult {
    pub campaign_id: String,
    pub product_id: String,
    pub ratio: String,
    pub locale: String,
    pub seed: Option<u64>,
    pub path_post: PathBuf,
    pub path_hero: Option<PathBuf>,
    pub provider: String,
}

/// Identity of a single unit of work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantKey {
    pub product_id: String,
    pub ratio: String,
    pub locale: String,
    pub variant_index: u32,
    pub seed: Option<u64>,
}

/// Pixels and measurements of a composed post, before anything is written.
#[derive(Clone, Debug)]
pub struct ComposedPost {
    pub hero: RgbImage,
    pub post: RgbImage,
    pub text: TextBlockOutcome,
    pub logo: Option<LogoPlacement>,
}

/// `<out>/<campaign>/<product>/<ratio dir>/`
pub fn variant_dir(out_dir: &Path, campaign_id: &str, product_id: &str, ratio: &str) -> PathBuf {
    out_dir
        .join(campaign_id)
        .join(product_id)
        .join(ratio_dir_name(ratio))
}

/// Renders posts from resolved heroes under fixed brand rules.
pub struct Compositor {
    rules: BrandRules,
    logo: Option<Logo>,
    font: Option<FontSource>,
    overrides: DesignOverrides,
    out_dir: PathBuf,
}

impl Compositor {
    pub fn new(
        rules: BrandRules,
        logo: Option<Logo>,
        font: Option<FontSource>,
        overrides: DesignOverrides,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rules,
            logo,
            font,
            overrides,
            out_dir: out_dir.into(),
        }
    }

    pub fn rules(&self) -> &BrandRules {
        &self.rules
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn text_style(&self) -> TextStyle {
        TextStyle {
            font: self.font.clone(),
            size_px: self
                .overrides
                .font_size
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(DEFAULT_FONT_SIZE),
            min_contrast: self.rules.overlay.min_contrast_ratio,
        }
    }

    /// Headline and CTA for `locale`, after overrides.
    pub fn copy_lines<'a>(&'a self, brief: &'a Brief, locale: &str) -> (&'a str, &'a str) {
        let headline = self
            .overrides
            .headline
            .as_deref()
            .unwrap_or_else(|| brief.message_for(locale));
        let cta = self
            .overrides
            .cta
            .as_deref()
            .unwrap_or_else(|| brief.cta_for(locale));
        (headline, cta)
    }

    /// Cover-resize `hero`, then draw the text block and the logo.
    pub fn compose(
        &self,
        hero: &RgbImage,
        size: CanvasSize,
        headline: &str,
        cta: &str,
        engine: &mut TextLayoutEngine,
    ) -> ForgeResult<ComposedPost> {
        let hero = cover_resize(hero, size)?;
        let mut post = hero.clone();
        let text = draw_text_block(&mut post, &[headline, cta], &self.text_style(), engine)?;

        let logo = match &self.logo {
            Some(logo) => {
                let pct = resolve_area_pct(&self.rules, self.overrides.logo_area_pct);
                Some(place_logo(&mut post, logo, pct)?)
            }
            None => None,
        };

        Ok(ComposedPost {
            hero,
            post,
            text,
            logo,
        })
    }

    /// Compose one unit and write its hero, post and provenance sidecar.
    #[tracing::instrument(
        skip(self, brief, hero, engine),
        fields(product = %key.product_id, ratio = %key.ratio, locale = %key.locale, v = key.variant_index)
    )]
    pub fn render_variant(
        &self,
        brief: &Brief,
        key: &VariantKey,
        hero: &ResolvedHero,
        provider: &str,
        engine: &mut TextLayoutEngine,
    ) -> ForgeResult<VariantResult> {
        let size = CanvasSize::for_ratio(&key.ratio)
            .ok_or_else(|| ForgeError::validation(format!("unknown ratio '{}'", key.ratio)))?;
        let (headline, cta) = self.copy_lines(brief, &key.locale);
        let composed = self.compose(&hero.image, size, headline, cta, engine)?;

        let dir = variant_dir(&self.out_dir, &brief.campaign_id, &key.product_id, &key.ratio);
        let hero_path = dir.join(format!("hero-{}-v{}.png", key.locale, key.variant_index));
        let post_path = dir.join(format!("post-{}-v{}.png", key.locale, key.variant_index));
        save_image(&hero_path, &composed.hero)?;
        save_image(&post_path, &composed.post)?;

        let record = Provenance {
            provider: provider.to_string(),
            product_id: key.product_id.clone(),
            ratio: key.ratio.clone(),
            locale: key.locale.clone(),
            logo_area_pct: composed.logo.map(|l| l.area_pct),
            seed: key.seed,
            variant_index: key.variant_index,
            prompt: hero.prompt().map(str::to_string),
            canvas: size,
            logo_box: composed.logo.map(|l| l.rect),
            text_box: PixelBox::clipped(composed.text.text_rect, size),
            contrast_ratio: composed.text.contrast_ratio,
            backdrop: composed.text.backdrop,
            pixels_sha256: pixels_sha256(composed.post.as_raw()),
        };
        write_provenance(&post_path, &record)?;

        tracing::debug!(path = %post_path.display(), "variant written");
        Ok(VariantResult {
            campaign_id: brief.campaign_id.clone(),
            product_id: key.product_id.clone(),
            ratio: key.ratio.clone(),
            locale: key.locale.clone(),
            seed: key.seed,
            path_post: post_path,
            path_hero: Some(hero_path),
            provider: provider.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/variant.rs"]
mod tests;
