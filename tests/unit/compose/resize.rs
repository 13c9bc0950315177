use image::Rgb;

use super::*;
use crate::foundation::core::RATIO_TABLE;

#[test]
fn output_always_matches_target_size() {
    let sources = [(1, 1), (7, 3), (640, 480), (1080, 1920), (1999, 1001), (3, 500)];
    let targets = [
        CanvasSize::new(64, 64).unwrap(),
        CanvasSize::new(90, 160).unwrap(),
        CanvasSize::new(160, 90).unwrap(),
        CanvasSize::new(33, 17).unwrap(),
    ];
    for (sw, sh) in sources {
        let src = RgbImage::from_pixel(sw, sh, Rgb([10, 20, 30]));
        for t in targets {
            let out = cover_resize(&src, t).unwrap();
            assert_eq!(out.dimensions(), (t.width, t.height), "src {sw}x{sh}");
        }
    }
}

#[test]
fn scaled_size_covers_every_ratio_canvas() {
    for (_, canvas) in RATIO_TABLE {
        for (sw, sh) in [(1000, 1000), (1920, 1080), (1080, 1920), (333, 777)] {
            let (nw, nh) = cover_scaled_size(sw, sh, canvas);
            assert!(nw >= canvas.width && nh >= canvas.height);
            // One axis fits exactly (within rounding) so nothing is letterboxed or over-zoomed.
            assert!(nw - canvas.width <= 1 || nh - canvas.height <= 1);
        }
    }
}

#[test]
fn crop_is_centered() {
    // Left third red, middle third green, right third blue; target keeps only the middle.
    let src = RgbImage::from_fn(30, 10, |x, _| match x {
        0..=9 => Rgb([255, 0, 0]),
        10..=19 => Rgb([0, 255, 0]),
        _ => Rgb([0, 0, 255]),
    });
    let out = cover_resize(&src, CanvasSize::new(10, 10).unwrap()).unwrap();
    assert_eq!(out.get_pixel(5, 5).0, [0, 255, 0]);
}

#[test]
fn empty_source_is_rejected() {
    let src = RgbImage::new(0, 0);
    assert!(cover_resize(&src, CanvasSize::new(4, 4).unwrap()).is_err());
}
