use image::Rgb;

use super::*;

fn no_font_style(min_contrast: f64) -> TextStyle {
    TextStyle {
        font: None,
        size_px: 20.0,
        min_contrast,
    }
}

#[test]
fn geometry_sits_bottom_left_with_padding() {
    let canvas = CanvasSize::new(400, 300).unwrap();
    let g = block_geometry(canvas, &[(100.0, 24.0), (60.0, 24.0)]);
    assert_eq!(g.text.x0, 32.0);
    assert_eq!(g.text.width(), 100.0);
    assert_eq!(g.text.height(), 56.0);
    // 300 - 32 - 56 - 16
    assert_eq!(g.text.y0, 196.0);
    assert_eq!(g.sample, Rect::new(32.0, 196.0, 148.0, 268.0));
    assert_eq!(g.backdrop, Rect::new(20.0, 184.0, 156.0, 276.0));
}

#[test]
fn sample_is_capped_by_right_padding() {
    let canvas = CanvasSize::new(100, 100).unwrap();
    let g = block_geometry(canvas, &[(500.0, 10.0)]);
    assert_eq!(g.sample.x1, 68.0);
}

#[test]
fn light_background_gets_backdrop() {
    let mut canvas = RgbImage::from_pixel(200, 120, Rgb([230, 230, 230]));
    let mut engine = TextLayoutEngine::new();
    let out = draw_text_block(
        &mut canvas,
        &["Fresh", "Buy"],
        &no_font_style(4.5),
        &mut engine,
    )
    .unwrap();
    assert!(out.backdrop);
    assert!(out.contrast_ratio < 4.5);
    assert_eq!(out.background, Rgb8::new(230, 230, 230));
    assert!(!out.glyphs_drawn);

    let inside = PixelBox::clipped(out.text_rect, CanvasSize::new(200, 120).unwrap()).unwrap();
    let darkened = canvas.get_pixel(inside.x + 1, inside.y + 1).0;
    assert!(darkened[0] < 100, "expected backdrop, got {darkened:?}");
    assert_eq!(canvas.get_pixel(199, 0).0, [230, 230, 230]);
}

#[test]
fn dark_background_is_left_untouched() {
    let mut canvas = RgbImage::from_pixel(200, 120, Rgb([20, 20, 40]));
    let before = canvas.clone();
    let mut engine = TextLayoutEngine::new();
    let out = draw_text_block(&mut canvas, &["Fresh", "Buy"], &no_font_style(4.5), &mut engine)
        .unwrap();
    assert!(!out.backdrop);
    assert!(out.contrast_ratio >= 4.5);
    assert_eq!(canvas.as_raw(), before.as_raw());
}

#[test]
fn backdrop_lifts_contrast_over_white() {
    let mut canvas = RgbImage::from_pixel(300, 200, Rgb([255, 255, 255]));
    let mut engine = TextLayoutEngine::new();
    let out = draw_text_block(&mut canvas, &["Sale", "Now"], &no_font_style(4.5), &mut engine)
        .unwrap();
    assert!(out.backdrop);
    let inside = PixelBox::clipped(out.text_rect, CanvasSize::new(300, 200).unwrap()).unwrap();
    let under = canvas.get_pixel(inside.x, inside.y).0;
    let after = contrast_ratio(Rgb8::WHITE, Rgb8::new(under[0], under[1], under[2]));
    assert!(after >= 4.5, "contrast after backdrop {after}");
}

fn system_font_style() -> Option<TextStyle> {
    let font = crate::assets::font::resolve_font(None)?;
    Some(TextStyle {
        font: Some(font),
        size_px: 32.0,
        min_contrast: 4.5,
    })
}

fn white_pixels(canvas: &RgbImage) -> Vec<(u32, u32)> {
    canvas
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0.iter().all(|c| *c > 200))
        .map(|(x, y, _)| (x, y))
        .collect()
}

#[test]
fn glyphs_land_inside_the_block_on_every_line() {
    let Some(style) = system_font_style() else {
        return;
    };
    let mut canvas = RgbImage::from_pixel(400, 240, Rgb([20, 20, 40]));
    let mut engine = TextLayoutEngine::new();
    let out = draw_text_block(&mut canvas, &["Fresh", "Buy"], &style, &mut engine).unwrap();
    assert!(out.glyphs_drawn);
    assert!(!out.backdrop);

    let white = white_pixels(&canvas);
    assert!(!white.is_empty());

    let bounds = Rect::new(
        out.text_rect.x0 - 12.0,
        out.text_rect.y0 - 12.0,
        out.text_rect.x1 + 24.0,
        out.text_rect.y1 + 24.0,
    );
    for &(x, y) in &white {
        let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
        assert!(
            px >= bounds.x0 && px <= bounds.x1 && py >= bounds.y0 && py <= bounds.y1,
            "ink at ({x},{y}) outside {bounds:?}"
        );
    }

    let mid = (out.text_rect.y0 + out.text_rect.y1) / 2.0;
    assert!(white.iter().any(|&(_, y)| f64::from(y) < mid), "first line missing");
    assert!(white.iter().any(|&(_, y)| f64::from(y) > mid), "second line missing");
}

#[test]
fn unusable_configured_font_still_draws_with_fallback() {
    if crate::assets::font::resolve_font(None).is_none() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ttf");
    std::fs::write(&path, b"garbage bytes, not a font").unwrap();
    let style = TextStyle {
        font: crate::assets::font::resolve_font(Some(&path)),
        size_px: 32.0,
        min_contrast: 4.5,
    };

    let mut canvas = RgbImage::from_pixel(400, 240, Rgb([20, 20, 40]));
    let mut engine = TextLayoutEngine::new();
    let out = draw_text_block(&mut canvas, &["Fresh", "Buy"], &style, &mut engine).unwrap();
    assert!(out.glyphs_drawn);
    assert!(!white_pixels(&canvas).is_empty());
}
