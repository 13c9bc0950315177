use std::{path::Path, sync::Arc};

use crate::foundation::error::{ForgeError, ForgeResult};

/// Where the overlay font bytes came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontOrigin {
    /// Loaded from the configured font file.
    File(String),
    /// Built-in fallback resolved from the system font database.
    SystemFallback(String),
}

/// Font bytes ready for layout and glyph rasterization.
#[derive(Clone)]
pub struct FontSource {
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    pub origin: FontOrigin,
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSource")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Resolve the overlay font: the configured file if it parses as a font, else a system
/// sans-serif face.
///
/// Returns `None` when neither is available; callers then measure text with
/// [`estimate_line_metrics`] and skip glyph drawing.
pub fn resolve_font(configured: Option<&Path>) -> Option<FontSource> {
    if let Some(path) = configured {
        match std::fs::read(path) {
            Ok(bytes) if registers_family(&bytes) => {
                return Some(FontSource {
                    bytes: Arc::new(bytes),
                    index: 0,
                    origin: FontOrigin::File(path.display().to_string()),
                });
            }
            Ok(_) => tracing::warn!(
                path = %path.display(),
                "overlay font file holds no usable font face; using fallback"
            ),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "overlay font unavailable")
            }
        }
    }
    system_fallback_font()
}

/// True when layout can register at least one family from `bytes`.
fn registers_family(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let mut font_ctx = parley::FontContext::default();
    !font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None)
        .is_empty()
}

fn system_fallback_font() -> Option<FontSource> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let families = [
        usvg::fontdb::Family::SansSerif,
        usvg::fontdb::Family::Serif,
        usvg::fontdb::Family::Monospace,
    ];
    let query = usvg::fontdb::Query {
        families: &families,
        ..usvg::fontdb::Query::default()
    };
    let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
    let name = db
        .face(id)
        .and_then(|f| f.families.first().map(|(n, _)| n.clone()))
        .unwrap_or_else(|| "unknown".to_string());
    let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;

    tracing::info!(family = %name, "using system fallback font for overlay text");
    Some(FontSource {
        bytes: Arc::new(bytes),
        index,
        origin: FontOrigin::SystemFallback(name),
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Approximate `(width, height)` of a single line when no font is available.
pub fn estimate_line_metrics(text: &str, size_px: f32) -> (f64, f64) {
    let chars = text.chars().count() as f64;
    let size = f64::from(size_px);
    (chars * size * 0.55, size * 1.2)
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family_name: None,
        }
    }

    /// Register `font_bytes` once and remember its primary family name.
    fn ensure_family(&mut self, font_bytes: &[u8]) -> ForgeResult<String> {
        if let Some(name) = &self.family_name {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ForgeError::asset("no font families registered from font bytes"))?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ForgeError::asset("registered font family has no name"))?
            .to_string();
        self.family_name = Some(family_name.clone());
        Ok(family_name)
    }

    /// Shape and lay out a single unwrapped line.
    pub fn layout_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ForgeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ForgeError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.ensure_family(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
