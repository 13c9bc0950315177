//! HSV conversion and tolerance-based color matching.

use crate::foundation::core::Rgb8;

/// Color in HSV space: hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub fn from_rgb(c: Rgb8) -> Self {
        let r = f64::from(c.r) / 255.0;
        let g = f64::from(c.g) / 255.0;
        let b = f64::from(c.b) / 255.0;

        let maxc = r.max(g).max(b);
        let minc = r.min(g).min(b);
        let v = maxc;
        if maxc == minc {
            return Self { h: 0.0, s: 0.0, v };
        }

        let span = maxc - minc;
        let s = span / maxc;
        let rc = (maxc - r) / span;
        let gc = (maxc - g) / span;
        let bc = (maxc - b) / span;
        let h = if r == maxc {
            bc - gc
        } else if g == maxc {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };

        Self {
            h: (h / 6.0).rem_euclid(1.0) * 360.0,
            s,
            v,
        }
    }
}

/// Shortest angular distance between two hues, in degrees `[0, 180]`.
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    d.min(360.0 - d)
}

/// Matching tolerance around a target color.
///
/// `h` is in degrees; `s` and `v` are percentages (35 means ±0.35).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HsvTolerance {
    #[serde(default = "default_h")]
    pub h: f64,
    #[serde(default = "default_sv")]
    pub s: f64,
    #[serde(default = "default_sv")]
    pub v: f64,
}

fn default_h() -> f64 {
    10.0
}

fn default_sv() -> f64 {
    35.0
}

impl Default for HsvTolerance {
    fn default() -> Self {
        Self {
            h: default_h(),
            s: default_sv(),
            v: default_sv(),
        }
    }
}

/// Precomputed target color plus tolerance, reused across many pixel tests.
#[derive(Clone, Copy, Debug)]
pub struct HsvMatcher {
    target: Hsv,
    h_tol: f64,
    s_tol: f64,
    v_tol: f64,
}

impl HsvMatcher {
    pub fn new(target: Rgb8, tol: HsvTolerance) -> Self {
        Self {
            target: Hsv::from_rgb(target),
            h_tol: tol.h,
            s_tol: tol.s / 100.0,
            v_tol: tol.v / 100.0,
        }
    }

    pub fn target(&self) -> Hsv {
        self.target
    }

    pub fn matches(&self, c: Rgb8) -> bool {
        let hsv = Hsv::from_rgb(c);
        hue_distance(hsv.h, self.target.h) <= self.h_tol
            && (hsv.s - self.target.s).abs() <= self.s_tol
            && (hsv.v - self.target.v).abs() <= self.v_tol
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/hsv.rs"]
mod tests;
