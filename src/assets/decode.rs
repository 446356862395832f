use std::io::Cursor;

use anyhow::Context;

use crate::foundation::error::{RoundelError, RoundelResult};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded raster image in straight (non-premultiplied) RGBA8 form.
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major straight RGBA8.
    pub rgba8: Vec<u8>,
}

impl DecodedImage {
    /// Read one pixel, or `None` outside the image bounds.
    pub fn pixel(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.rgba8[idx],
            self.rgba8[idx + 1],
            self.rgba8[idx + 2],
            self.rgba8[idx + 3],
        ])
    }
}

#[derive(Clone, Debug)]
/// One file handed to the ingest pipeline by an upload surface.
pub struct RawUpload {
    /// Original file name, used only for reporting.
    pub file_name: String,
    /// Declared media type, e.g. `image/png`. May be spoofed; decoding
    /// still validates the actual bytes.
    pub media_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug)]
/// Output of the ingest pipeline: resized pixels plus a lossless encoding.
pub struct NormalizedImage {
    /// Width in pixels after normalization.
    pub width: u32,
    /// Height in pixels after normalization.
    pub height: u32,
    /// PNG-encoded payload of the normalized pixels.
    pub png: Vec<u8>,
}

/// Decode encoded image bytes into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> RoundelResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| RoundelError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

/// Proportionally fit `(w, h)` within `max` on the longer edge.
///
/// Images already within the bound keep their exact dimensions (no
/// upscaling). The shorter edge is scaled by the same ratio and rounded to
/// the nearest pixel, which may drift the aspect ratio by at most 1 px.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    if width > height {
        let scaled = (f64::from(height) * f64::from(max) / f64::from(width)).round() as u32;
        (max, scaled.max(1))
    } else {
        let scaled = (f64::from(width) * f64::from(max) / f64::from(height)).round() as u32;
        (scaled.max(1), max)
    }
}

/// Normalize one uploaded file: validate its media type, decode, resize to
/// the maximum-dimension bound and re-encode losslessly.
///
/// Fails with [`RoundelError::UnsupportedType`] for non-image media types
/// and [`RoundelError::Decode`] for corrupt or unreadable bytes. A failure
/// registers nothing anywhere; callers skip the file and continue their
/// batch.
#[tracing::instrument(skip(raw), fields(file = %raw.file_name))]
pub fn normalize_upload(raw: &RawUpload, max_image_size: u32) -> RoundelResult<NormalizedImage> {
    if max_image_size == 0 {
        return Err(RoundelError::validation("max_image_size must be > 0"));
    }
    if !raw.media_type.starts_with("image/") {
        return Err(RoundelError::unsupported_type(raw.media_type.clone()));
    }

    let decoded = decode_image(&raw.bytes)?;
    let (width, height) = fit_within(decoded.width, decoded.height, max_image_size);

    let rgba = image::RgbaImage::from_raw(decoded.width, decoded.height, decoded.rgba8)
        .ok_or_else(|| RoundelError::decode("decoded buffer size mismatch"))?;
    let resized = if (width, height) == (decoded.width, decoded.height) {
        rgba
    } else {
        image::imageops::resize(&rgba, width, height, image::imageops::FilterType::CatmullRom)
    };

    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(resized)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("encode normalized image as png")?;

    tracing::debug!(width, height, bytes = png.len(), "normalized upload");
    Ok(NormalizedImage { width, height, png })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
