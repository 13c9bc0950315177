use crate::foundation::error::{ForgeError, ForgeResult};

pub use kurbo::Rect;

/// Supported aspect-ratio tokens and their fixed canvas sizes.
pub const RATIO_TABLE: [(&str, CanvasSize); 3] = [
    (
        "1:1",
        CanvasSize {
            width: 1024,
            height: 1024,
        },
    ),
    (
        "9:16",
        CanvasSize {
            width: 1080,
            height: 1920,
        },
    ),
    (
        "16:9",
        CanvasSize {
            width: 1920,
            height: 1080,
        },
    ),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> ForgeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ForgeError::validation(format!(
                "canvas size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Look up the canvas for a ratio token such as `"16:9"`.
    pub fn for_ratio(token: &str) -> Option<Self> {
        RATIO_TABLE
            .iter()
            .find(|(t, _)| *t == token.trim())
            .map(|(_, size)| *size)
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }
}

/// Directory-safe form of a ratio token (`"16:9"` -> `"16x9"`).
pub fn ratio_dir_name(token: &str) -> String {
    token.trim().replace(':', "x")
}

/// Straight (non-premultiplied) 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional, case-insensitive).
    pub fn from_hex(s: &str) -> ForgeResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return Err(ForgeError::configuration(format!(
                "hex color must be #RRGGBB, got \"{s}\""
            )));
        }

        fn hex_byte(pair: &str) -> ForgeResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| ForgeError::configuration(format!("invalid hex byte \"{pair}\"")))
        }

        Ok(Self {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn complement(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
        }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Integer pixel rectangle, as recorded in provenance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelBox {
    /// Snap a float rect outward to whole pixels and clip it to `canvas`.
    ///
    /// Returns `None` when nothing of the rect lies inside the canvas.
    pub fn clipped(rect: Rect, canvas: CanvasSize) -> Option<Self> {
        let bounds = Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height));
        let r = rect.intersect(bounds);
        let x0 = r.x0.floor().max(0.0) as u32;
        let y0 = r.y0.floor().max(0.0) as u32;
        let x1 = (r.x1.ceil() as u32).min(canvas.width);
        let y1 = (r.y1.ceil() as u32).min(canvas.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}
