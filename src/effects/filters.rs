use crate::effects::blur::gaussian_blur_rgba8;
use crate::foundation::math::clamp_channel;

/// CSS-equivalent blur radius in pixels (`blur(2px)`).
const BLUR_SIGMA: f32 = 2.0;
const BLUR_RADIUS: u32 = 4;
/// CSS-equivalent brightness gain (`brightness(1.25)`).
const BRIGHTNESS_GAIN: f64 = 1.25;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Visual filter applied to the drawn avatar image only, never to the
/// background fill or the border ring.
pub enum FilterKind {
    /// No filter.
    #[default]
    None,
    /// Full grayscale using the CSS luma coefficients.
    Grayscale,
    /// Full sepia using the CSS sepia matrix.
    Sepia,
    /// Gaussian blur equivalent to CSS `blur(2px)`.
    Blur,
    /// Brightness boost equivalent to CSS `brightness(1.25)`.
    Brightness,
}

impl FilterKind {
    /// Parse a UI filter value; unknown values fall back to no filter,
    /// matching the select element's default branch.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "grayscale" => Self::Grayscale,
            "sepia" => Self::Sepia,
            "blur" => Self::Blur,
            "brightness" => Self::Brightness,
            _ => Self::None,
        }
    }
}

/// Apply a filter to a straight RGBA8 buffer of `width * height` pixels.
///
/// Color filters leave the alpha channel untouched; blur spreads all four
/// channels with clamp-to-edge sampling.
pub fn apply_filter(kind: FilterKind, pixels: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
    match kind {
        FilterKind::None => pixels,
        FilterKind::Grayscale => map_rgb(pixels, |r, g, b| {
            let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            (y, y, y)
        }),
        FilterKind::Sepia => map_rgb(pixels, |r, g, b| {
            (
                0.393 * r + 0.769 * g + 0.189 * b,
                0.349 * r + 0.686 * g + 0.168 * b,
                0.272 * r + 0.534 * g + 0.131 * b,
            )
        }),
        FilterKind::Brightness => map_rgb(pixels, |r, g, b| {
            (
                r * BRIGHTNESS_GAIN,
                g * BRIGHTNESS_GAIN,
                b * BRIGHTNESS_GAIN,
            )
        }),
        FilterKind::Blur => gaussian_blur_rgba8(&pixels, width, height, BLUR_RADIUS, BLUR_SIGMA),
    }
}

fn map_rgb(mut pixels: Vec<u8>, f: impl Fn(f64, f64, f64) -> (f64, f64, f64)) -> Vec<u8> {
    for px in pixels.chunks_exact_mut(4) {
        let (r, g, b) = f(f64::from(px[0]), f64::from(px[1]), f64::from(px[2]));
        px[0] = clamp_channel(r);
        px[1] = clamp_channel(g);
        px[2] = clamp_channel(b);
    }
    pixels
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filters.rs"]
mod tests;
