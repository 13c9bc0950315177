use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn primaries_map_to_expected_hues() {
    let red = Hsv::from_rgb(Rgb8::new(255, 0, 0));
    assert!(approx(red.h, 0.0) && approx(red.s, 1.0) && approx(red.v, 1.0));
    assert!(approx(Hsv::from_rgb(Rgb8::new(0, 255, 0)).h, 120.0));
    assert!(approx(Hsv::from_rgb(Rgb8::new(0, 0, 255)).h, 240.0));
    assert!(approx(Hsv::from_rgb(Rgb8::new(255, 0, 255)).h, 300.0));
}

#[test]
fn grays_have_zero_hue_and_saturation() {
    let g = Hsv::from_rgb(Rgb8::new(128, 128, 128));
    assert_eq!(g.h, 0.0);
    assert_eq!(g.s, 0.0);
    assert!(approx(g.v, 128.0 / 255.0));
}

#[test]
fn hue_distance_wraps_around() {
    assert!(approx(hue_distance(355.0, 5.0), 10.0));
    assert!(approx(hue_distance(5.0, 355.0), 10.0));
    assert!(approx(hue_distance(90.0, 270.0), 180.0));
}

#[test]
fn matcher_accepts_near_red_across_zero_hue() {
    let m = HsvMatcher::new(Rgb8::new(230, 10, 20), HsvTolerance::default());
    // Slightly magenta-leaning red sits just below 360 degrees.
    assert!(m.matches(Rgb8::new(230, 10, 40)));
    assert!(m.matches(Rgb8::new(230, 10, 20)));
    assert!(!m.matches(Rgb8::new(20, 230, 220)));
    assert!(!m.matches(Rgb8::new(230, 200, 200)));
}

#[test]
fn tolerance_deserializes_with_defaults() {
    let tol: HsvTolerance = serde_json::from_str(r#"{"h": 15}"#).unwrap();
    assert_eq!(
        tol,
        HsvTolerance {
            h: 15.0,
            s: 35.0,
            v: 35.0
        }
    );
}
