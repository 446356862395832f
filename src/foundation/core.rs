use crate::foundation::error::{RoundelError, RoundelResult};

pub use kurbo::{Point, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Output canvas dimensions in pixels.
pub struct Canvas {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Construct a canvas, rejecting zero-sized surfaces.
    pub fn new(width: u32, height: u32) -> RoundelResult<Self> {
        if width == 0 || height == 0 {
            return Err(RoundelError::validation("Canvas sides must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Shorter canvas side in pixels.
    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }

    /// Canvas center point.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Fully opaque color from RGB channels.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Channels as a `[r, g, b, a]` array.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Theme colors and metrics applied around the avatar disc.
pub struct Theme {
    /// Background fill behind the disc.
    pub surface: Rgba8,
    /// Accent color used for the placeholder glyph.
    pub accent: Rgba8,
    /// Border ring stroke color.
    pub border: Rgba8,
    /// Border ring stroke width in pixels.
    pub border_width: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface: Rgba8::opaque(0x1a, 0x1a, 0x1a),
            accent: Rgba8::opaque(0xf5, 0xcc, 0x42),
            border: Rgba8::opaque(0xf5, 0xcc, 0x42),
            border_width: 6.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
