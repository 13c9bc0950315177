use image::{Rgb, Rgba};

use super::*;

#[test]
fn over_with_zero_alpha_is_noop() {
    assert_eq!(over_opaque([1, 2, 3], [200, 200, 200, 0]), [1, 2, 3]);
}

#[test]
fn over_with_opaque_source_replaces() {
    assert_eq!(over_opaque([0, 0, 0], [255, 0, 0, 255]), [255, 0, 0]);
}

#[test]
fn backdrop_darkens_white_to_expected_level() {
    let mut canvas = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
    let region = PixelBox {
        x: 1,
        y: 1,
        width: 2,
        height: 2,
    };
    fill_rect_blend(&mut canvas, region, Rgb8::BLACK, 180);
    // 255 * (255 - 180) / 255 = 75
    assert_eq!(canvas.get_pixel(1, 1).0, [75, 75, 75]);
    assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(canvas.get_pixel(3, 3).0, [255, 255, 255]);
}

#[test]
fn overlay_is_clipped_to_canvas() {
    let mut canvas = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
    let top = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
    overlay_straight(&mut canvas, &top, 2, 2);
    assert_eq!(canvas.get_pixel(3, 3).0, [255, 255, 255]);
    assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0]);
}

#[test]
fn premul_layer_requires_matching_size() {
    let mut canvas = RgbImage::new(2, 2);
    assert!(over_premul_layer(&mut canvas, &[0; 12]).is_err());
    let mut layer = vec![0u8; 16];
    layer[..4].copy_from_slice(&[128, 128, 128, 128]);
    over_premul_layer(&mut canvas, &layer).unwrap();
    assert_eq!(canvas.get_pixel(0, 0).0, [128, 128, 128]);
    assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0]);
}

#[test]
fn average_of_half_black_half_white() {
    let canvas = RgbImage::from_fn(4, 2, |x, _| {
        if x < 2 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
    });
    let all = PixelBox {
        x: 0,
        y: 0,
        width: 4,
        height: 2,
    };
    assert_eq!(average_rgb(&canvas, all), Some(Rgb8::new(127, 127, 127)));
    let empty = PixelBox {
        x: 4,
        y: 0,
        width: 2,
        height: 2,
    };
    assert_eq!(average_rgb(&canvas, empty), None);
}
