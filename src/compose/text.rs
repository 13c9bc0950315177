//! Bottom-left text block with a contrast guarantee.
//!
//! Text is always white. The average color behind the block is measured first; if white
//! would not reach the minimum contrast ratio, a translucent black backdrop is laid down
//! before the glyphs.

use image::RgbImage;

use crate::{
    assets::font::{FontSource, TextBrushRgba8, TextLayoutEngine, estimate_line_metrics},
    color::contrast::{WCAG_AA_NORMAL_TEXT, contrast_ratio},
    compose::composite::{average_rgb, fill_rect_blend, over_premul_layer},
    foundation::{
        core::{CanvasSize, PixelBox, Rect, Rgb8},
        error::{ForgeError, ForgeResult},
    },
};

pub const TEXT_PADDING: f64 = 32.0;
pub const LINE_GAP: f64 = 8.0;
pub const BACKDROP_ALPHA: u8 = 180;
pub const DEFAULT_FONT_SIZE: f32 = 48.0;

/// How the overlay text is set.
#[derive(Clone, Debug)]
pub struct TextStyle {
    pub font: Option<FontSource>,
    pub size_px: f32,
    pub min_contrast: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: None,
            size_px: DEFAULT_FONT_SIZE,
            min_contrast: WCAG_AA_NORMAL_TEXT,
        }
    }
}

/// Measured placement of the text block and the contrast decision taken for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBlockOutcome {
    /// Union of the line boxes, in canvas coordinates.
    pub text_rect: Rect,
    /// Background color sampled behind the text.
    pub background: Rgb8,
    /// White-on-background contrast before any backdrop was applied.
    pub contrast_ratio: f64,
    pub backdrop: bool,
    /// False when no font was available and only the layout was computed.
    pub glyphs_drawn: bool,
}

struct ShapedLine {
    layout: Option<parley::Layout<TextBrushRgba8>>,
    width: f64,
    height: f64,
}

/// Block geometry derived from line metrics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockGeometry {
    pub text: Rect,
    pub sample: Rect,
    pub backdrop: Rect,
}

/// Place a block of `line_sizes` bottom-left on `canvas`.
pub fn block_geometry(canvas: CanvasSize, line_sizes: &[(f64, f64)]) -> BlockGeometry {
    let text_w = line_sizes.iter().map(|(w, _)| *w).fold(0.0, f64::max);
    let gaps = line_sizes.len().saturating_sub(1) as f64 * LINE_GAP;
    let text_h = line_sizes.iter().map(|(_, h)| *h).sum::<f64>() + gaps;

    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let x = TEXT_PADDING;
    let y = ch - TEXT_PADDING - text_h - 16.0;

    BlockGeometry {
        text: Rect::new(x, y, x + text_w, y + text_h),
        sample: Rect::new(
            x,
            y,
            (cw - TEXT_PADDING).min(x + text_w + 16.0),
            y + text_h + 16.0,
        ),
        backdrop: Rect::new(x - 12.0, y - 12.0, x + text_w + 24.0, y + text_h + 24.0),
    }
}

const WHITE_BRUSH: TextBrushRgba8 = TextBrushRgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

fn shape_lines(
    lines: &[&str],
    style: &TextStyle,
    engine: &mut TextLayoutEngine,
) -> Vec<ShapedLine> {
    lines
        .iter()
        .map(|text| {
            let shaped = style.font.as_ref().and_then(|font| {
                engine
                    .layout_line(text, &font.bytes, style.size_px, WHITE_BRUSH)
                    .map_err(|e| tracing::warn!(error = %e, "text layout failed; using estimate"))
                    .ok()
            });
            match shaped {
                Some(layout) => {
                    let width = f64::from(layout.width());
                    let height = f64::from(layout.height());
                    ShapedLine {
                        layout: Some(layout),
                        width,
                        height,
                    }
                }
                None => {
                    let (width, height) = estimate_line_metrics(text, style.size_px);
                    ShapedLine {
                        layout: None,
                        width,
                        height,
                    }
                }
            }
        })
        .collect()
}

/// Measure, contrast-check and draw `lines` onto `canvas`.
pub fn draw_text_block(
    canvas: &mut RgbImage,
    lines: &[&str],
    style: &TextStyle,
    engine: &mut TextLayoutEngine,
) -> ForgeResult<TextBlockOutcome> {
    let size = CanvasSize::new(canvas.width(), canvas.height())?;
    let shaped = shape_lines(lines, style, engine);
    let sizes: Vec<(f64, f64)> = shaped.iter().map(|l| (l.width, l.height)).collect();
    let geom = block_geometry(size, &sizes);

    let background = PixelBox::clipped(geom.sample, size)
        .and_then(|b| average_rgb(canvas, b))
        .unwrap_or(Rgb8::BLACK);
    let ratio = contrast_ratio(Rgb8::WHITE, background);
    let backdrop = ratio < style.min_contrast;
    if backdrop && let Some(region) = PixelBox::clipped(geom.backdrop, size) {
        fill_rect_blend(canvas, region, Rgb8::BLACK, BACKDROP_ALPHA);
    }

    let mut glyphs_drawn = false;
    if let Some(font) = &style.font
        && shaped.iter().any(|l| l.layout.is_some())
    {
        let layer = rasterize_lines(size, &shaped, font, geom.text.x0, geom.text.y0)?;
        over_premul_layer(canvas, &layer)?;
        glyphs_drawn = true;
    } else {
        tracing::warn!("no overlay font available; text block reserved without glyphs");
    }

    Ok(TextBlockOutcome {
        text_rect: geom.text,
        background,
        contrast_ratio: ratio,
        backdrop,
        glyphs_drawn,
    })
}

/// Render shaped lines into a transparent premultiplied RGBA8 layer the size of the canvas.
fn rasterize_lines(
    size: CanvasSize,
    lines: &[ShapedLine],
    font: &FontSource,
    x: f64,
    y: f64,
) -> ForgeResult<Vec<u8>> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| ForgeError::validation("canvas width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| ForgeError::validation("canvas height exceeds u16"))?;

    let font_data = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
        font.index,
    );
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    let mut ctx = vello_cpu::RenderContext::new(w, h);

    let mut line_y = y;
    for line in lines {
        if let Some(layout) = &line.layout {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, line_y)));
            for pline in layout.lines() {
                for item in pline.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font_data)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
        line_y += line.height + LINE_GAP;
    }

    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/text.rs"]
mod tests;
