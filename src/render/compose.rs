use kurbo::Point;
use rayon::prelude::*;

use crate::{
    assets::decode::DecodedImage,
    effects::filters::{FilterKind, apply_filter},
    foundation::core::{Canvas, Rgba8, Theme},
    foundation::math::mix_u8,
    render::frame::FrameRGBA,
};

/// Lower bound for the zoom factor; keeps the crop math away from zero.
pub const MIN_ZOOM: f64 = 0.1;

/// Fraction of the shorter canvas side covered by the disc at zoom 1.
const FIT_FRACTION: f64 = 0.9;

/// Placeholder glyph geometry, matching the empty-state canvas art.
const PLACEHOLDER_RADIUS: f64 = 70.0;
const PLACEHOLDER_CENTER_Y: f64 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// How a selected image is composed into the avatar disc.
pub struct RenderParams {
    /// Zoom factor; values below [`MIN_ZOOM`] are clamped.
    pub zoom: f64,
    /// Visual filter applied to the drawn image only.
    pub filter: FilterKind,
    /// Horizontal pan offset in source pixels.
    pub offset_x: f64,
    /// Vertical pan offset in source pixels.
    pub offset_y: f64,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            filter: FilterKind::None,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
/// Render input resolved ahead of composition.
pub enum AvatarScene<'a> {
    /// No selection is active; draw the placeholder glyph.
    Empty,
    /// A selection exists but its image failed to resolve; draw the
    /// background fill only, never a stale frame.
    Unavailable,
    /// Decoded pixels of the selected image.
    Image(&'a DecodedImage),
}

/// Centered square crop origin, shiftable by pan offsets.
///
/// The origin is clamped at zero on the left/top edge so the crop never
/// starts outside the image. No clamp is applied on the right/bottom edge:
/// a large zoom-out combined with a large positive offset can read past the
/// image bounds and yields transparent samples there. That asymmetry is a
/// documented limitation carried over from the original canvas math, kept
/// rather than silently symmetrized.
pub fn crop_origin(
    img_width: u32,
    img_height: u32,
    draw_size: f64,
    offset_x: f64,
    offset_y: f64,
) -> (f64, f64) {
    let sx = ((f64::from(img_width) - draw_size) / 2.0 - offset_x).max(0.0);
    let sy = ((f64::from(img_height) - draw_size) / 2.0 - offset_y).max(0.0);
    (sx, sy)
}

/// Compose one avatar frame.
///
/// Pure and deterministic: identical inputs produce pixel-identical
/// frames. The full canvas is cleared with the theme surface color first;
/// there is no differential redraw.
pub fn compose(
    canvas: Canvas,
    scene: AvatarScene<'_>,
    params: &RenderParams,
    theme: &Theme,
) -> FrameRGBA {
    let mut frame = FrameRGBA::solid(canvas, theme.surface);

    match scene {
        AvatarScene::Empty => {
            draw_placeholder_glyph(&mut frame, canvas, theme);
            frame
        }
        AvatarScene::Unavailable => frame,
        AvatarScene::Image(img) => {
            draw_image_disc(&mut frame, canvas, img, params, theme);
            frame
        }
    }
}

fn draw_placeholder_glyph(frame: &mut FrameRGBA, canvas: Canvas, theme: &Theme) {
    let center = Point::new(
        f64::from(canvas.width) / 2.0,
        f64::from(canvas.height) * PLACEHOLDER_CENTER_Y,
    );
    for y in 0..canvas.height {
        for x in 0..canvas.width {
            let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let cov = disc_coverage((p - center).hypot(), PLACEHOLDER_RADIUS);
            if cov > 0.0 {
                blend_pixel(frame, x, y, theme.accent, cov);
            }
        }
    }
}

fn draw_image_disc(
    frame: &mut FrameRGBA,
    canvas: Canvas,
    img: &DecodedImage,
    params: &RenderParams,
    theme: &Theme,
) {
    let min_side = f64::from(canvas.min_side());
    let center = canvas.center();
    let clip_r = (min_side / 2.0 - theme.border_width).max(0.0);

    let zoom = params.zoom.max(MIN_ZOOM);
    let draw_size = min_side * FIT_FRACTION * zoom;
    let (sx, sy) = crop_origin(img.width, img.height, draw_size, params.offset_x, params.offset_y);

    // Destination square, centered on the canvas. Source and destination
    // sides are both draw_size, so the mapping is 1:1 in source pixels.
    let dx0 = center.x - draw_size / 2.0;
    let dy0 = center.y - draw_size / 2.0;

    // Only the part of the crop square that can land on the canvas is
    // materialized; at high zoom the full square would dwarf the canvas.
    // The extra two pixels keep the bilinear neighbors of every sampled
    // coordinate inside the window.
    let side = (draw_size.ceil() as u64).max(1);
    let window_w = side.min(u64::from(canvas.width) + 2) as u32;
    let window_h = side.min(u64::from(canvas.height) + 2) as u32;
    let ox = (-dx0).floor().max(0.0);
    let oy = (-dy0).floor().max(0.0);
    let crop = extract_crop(img, sx + ox, sy + oy, window_w, window_h);
    let crop = apply_filter(params.filter, crop, window_w, window_h);

    let stride = canvas.width as usize * 4;
    frame
        .rgba8
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..canvas.width as usize {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let dist = (p - center).hypot();

                let clip_cov = disc_coverage(dist, clip_r);
                if clip_cov > 0.0 {
                    let fx = p.x - dx0;
                    let fy = p.y - dy0;
                    if fx >= 0.0 && fx < draw_size && fy >= 0.0 && fy < draw_size {
                        let s = sample_bilinear(
                            &crop,
                            window_w,
                            window_h,
                            fx - 0.5 - ox,
                            fy - 0.5 - oy,
                        );
                        let t = f64::from(s[3]) / 255.0 * clip_cov;
                        if t > 0.0 {
                            blend_row_pixel(row, x, Rgba8::opaque(s[0], s[1], s[2]), t);
                        }
                    }
                }

                // Border ring strokes over the image edge, drawn last.
                let ring = ring_coverage(dist, clip_r, theme.border_width);
                if ring > 0.0 {
                    blend_row_pixel(row, x, theme.border, ring);
                }
            }
        });
}

/// Copy the window `[sx, sx + w) x [sy, sy + h)` out of the source image.
/// Samples outside the image are transparent, which is where the unclamped
/// right/bottom overread becomes visible.
fn extract_crop(img: &DecodedImage, sx: f64, sy: f64, w: u32, h: u32) -> Vec<u8> {
    let mut out = vec![0u8; w as usize * h as usize * 4];
    for j in 0..h {
        for i in 0..w {
            let px = sample_source(img, sx + f64::from(i), sy + f64::from(j));
            let idx = (j as usize * w as usize + i as usize) * 4;
            out[idx..idx + 4].copy_from_slice(&px);
        }
    }
    out
}

/// Bilinear sample of the source image at a fractional coordinate, with
/// transparent black outside the bounds.
fn sample_source(img: &DecodedImage, u: f64, v: f64) -> [u8; 4] {
    let x0 = u.floor();
    let y0 = v.floor();
    let tx = u - x0;
    let ty = v - y0;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let fetch = |x: i64, y: i64| img.pixel(x, y).unwrap_or([0, 0, 0, 0]);
    let c00 = fetch(x0, y0);
    let c10 = fetch(x0 + 1, y0);
    let c01 = fetch(x0, y0 + 1);
    let c11 = fetch(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(c00[c]) + (f64::from(c10[c]) - f64::from(c00[c])) * tx;
        let bot = f64::from(c01[c]) + (f64::from(c11[c]) - f64::from(c01[c])) * tx;
        out[c] = (top + (bot - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Bilinear sample of the crop window with clamp-to-edge indices.
fn sample_bilinear(crop: &[u8], w: u32, h: u32, x: f64, y: f64) -> [u8; 4] {
    let max_x = i64::from(w) - 1;
    let max_y = i64::from(h) - 1;
    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;

    let fetch = |x: i64, y: i64| {
        let cx = x.clamp(0, max_x) as usize;
        let cy = y.clamp(0, max_y) as usize;
        let idx = (cy * w as usize + cx) * 4;
        [crop[idx], crop[idx + 1], crop[idx + 2], crop[idx + 3]]
    };
    let x0 = x0 as i64;
    let y0 = y0 as i64;
    let c00 = fetch(x0, y0);
    let c10 = fetch(x0 + 1, y0);
    let c01 = fetch(x0, y0 + 1);
    let c11 = fetch(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(c00[c]) + (f64::from(c10[c]) - f64::from(c00[c])) * tx;
        let bottom = f64::from(c01[c]) + (f64::from(c11[c]) - f64::from(c01[c])) * tx;
        out[c] = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Antialiased coverage of a disc of radius `r` at distance `dist` from the
/// center, with a one-pixel smoothing band.
fn disc_coverage(dist: f64, r: f64) -> f64 {
    (r - dist + 0.5).clamp(0.0, 1.0)
}

/// Coverage of the border ring centered on radius `r` with stroke width `w`.
fn ring_coverage(dist: f64, r: f64, w: f64) -> f64 {
    let outer = disc_coverage(dist, r + w / 2.0);
    let inner = disc_coverage(dist, r - w / 2.0);
    (outer - inner).clamp(0.0, 1.0)
}

fn blend_pixel(frame: &mut FrameRGBA, x: u32, y: u32, color: Rgba8, t: f64) {
    let idx = (y as usize * frame.width as usize + x as usize) * 4;
    blend_at(&mut frame.rgba8[idx..idx + 4], color, t);
}

fn blend_row_pixel(row: &mut [u8], x: usize, color: Rgba8, t: f64) {
    let idx = x * 4;
    blend_at(&mut row[idx..idx + 4], color, t);
}

fn blend_at(px: &mut [u8], color: Rgba8, t: f64) {
    let t = t * f64::from(color.a) / 255.0;
    px[0] = mix_u8(px[0], color.r, t);
    px[1] = mix_u8(px[1], color.g, t);
    px[2] = mix_u8(px[2], color.b, t);
    px[3] = mix_u8(px[3], 255, t);
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
