use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbImage;

use crate::{
    assets::decode::load_rgb,
    brief::model::{Brief, Product},
    foundation::{core::CanvasSize, error::ForgeResult},
    provider::backend::{GenerateRequest, ImageProvider},
};

/// Where a hero image came from.
#[derive(Clone, Debug, PartialEq)]
pub enum HeroOrigin {
    /// Loaded from the product's pre-existing asset.
    BaseAsset(PathBuf),
    /// Produced by a generation backend from `prompt`.
    Generated {
        provider: &'static str,
        prompt: String,
        metadata: serde_json::Map<String, serde_json::Value>,
    },
}

#[derive(Clone, Debug)]
pub struct ResolvedHero {
    pub image: RgbImage,
    pub origin: HeroOrigin,
}

impl ResolvedHero {
    pub fn prompt(&self) -> Option<&str> {
        match &self.origin {
            HeroOrigin::BaseAsset(_) => None,
            HeroOrigin::Generated { prompt, .. } => Some(prompt),
        }
    }
}

/// Build the generation prompt: `"{brand} {product}: {message}. {hints}"`, trimmed.
///
/// `extra_hints` are appended after the product's own hints.
pub fn build_prompt(
    brief: &Brief,
    product: &Product,
    locale: &str,
    extra_hints: Option<&str>,
) -> String {
    let msg = brief.message_for(locale);
    let hints: Vec<&str> = [product.prompt_hints.as_deref(), extra_hints]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .collect();
    format!(
        "{} {}: {}. {}",
        brief.brand,
        product.name,
        msg,
        hints.join(" ")
    )
    .trim()
    .to_string()
}

/// Supplies raw hero images: a product's base asset when usable, otherwise generation.
#[derive(Clone)]
pub struct SourceResolver {
    provider: Arc<dyn ImageProvider>,
    asset_root: PathBuf,
    extra_hints: Option<String>,
}

impl SourceResolver {
    /// `asset_root` anchors relative `base_asset` paths (usually the brief's directory).
    pub fn new(provider: Arc<dyn ImageProvider>, asset_root: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            asset_root: asset_root.into(),
            extra_hints: None,
        }
    }

    pub fn with_extra_hints(mut self, hints: Option<String>) -> Self {
        self.extra_hints = hints;
        self
    }

    pub fn provider(&self) -> &Arc<dyn ImageProvider> {
        &self.provider
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Absolute location of a product's base asset, if it names one.
    pub fn base_asset_path(&self, product: &Product) -> Option<PathBuf> {
        let raw = product.base_asset.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let p = Path::new(raw);
        Some(if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.asset_root.join(p)
        })
    }

    /// True when the product's base asset exists on disk.
    pub fn has_base_asset(&self, product: &Product) -> bool {
        self.base_asset_path(product).is_some_and(|p| p.is_file())
    }

    #[tracing::instrument(skip(self, brief, product), fields(product = %product.id))]
    pub fn resolve(
        &self,
        brief: &Brief,
        product: &Product,
        size: CanvasSize,
        locale: &str,
        seed: Option<u64>,
    ) -> ForgeResult<ResolvedHero> {
        if let Some(path) = self.base_asset_path(product) {
            match load_rgb(&path) {
                Ok(image) => {
                    return Ok(ResolvedHero {
                        image,
                        origin: HeroOrigin::BaseAsset(path),
                    });
                }
                Err(e) => tracing::warn!(
                    error = %e,
                    "base asset unusable; falling back to generation"
                ),
            }
        }

        let prompt = build_prompt(brief, product, locale, self.extra_hints.as_deref());
        let req = GenerateRequest::new(prompt.clone(), size, seed);
        let generated = self.provider.generate_image(&req)?;
        Ok(ResolvedHero {
            image: generated.image,
            origin: HeroOrigin::Generated {
                provider: self.provider.name(),
                prompt,
                metadata: generated.metadata,
            },
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/source.rs"]
mod tests;
