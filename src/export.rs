use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    foundation::error::{RoundelError, RoundelResult},
    render::frame::FrameRGBA,
};

/// Media type of exported avatar blobs.
pub const EXPORT_MEDIA_TYPE: &str = "image/png";

#[derive(Clone, Debug)]
/// Encoded export payload offered to a share surface or written to disk.
pub struct ExportBlob {
    /// Fixed download file name.
    pub filename: String,
    /// Blob media type (always PNG).
    pub media_type: &'static str,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// How an export left the editor.
pub enum ExportOutcome {
    /// The platform share surface accepted the blob.
    Shared,
    /// The blob was written as a direct download.
    Downloaded(PathBuf),
}

/// Platform share surface collaborator.
///
/// When a surface is present and accepts the blob, export prefers it over
/// the download fallback; a share failure falls back to download rather
/// than surfacing an error.
pub trait ShareSurface {
    /// Whether the surface can accept this blob.
    fn can_share(&self, blob: &ExportBlob) -> bool;

    /// Hand the blob to the platform share sheet.
    fn share(&self, blob: &ExportBlob) -> RoundelResult<()>;
}

/// Encode a rendered frame as PNG bytes.
///
/// Pure reader of the frame; no recomputation of the avatar happens here.
pub fn encode_png(frame: &FrameRGBA) -> RoundelResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.rgba8.clone())
        .ok_or_else(|| RoundelError::validation("frame buffer does not match its dimensions"))?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("encode frame as png")?;
    Ok(png)
}

/// Export a frame: share when possible, otherwise download.
#[tracing::instrument(skip(frame, share))]
pub fn export_frame(
    frame: &FrameRGBA,
    filename: &str,
    share: Option<&dyn ShareSurface>,
    download_dir: &Path,
) -> RoundelResult<ExportOutcome> {
    let blob = ExportBlob {
        filename: filename.to_string(),
        media_type: EXPORT_MEDIA_TYPE,
        bytes: encode_png(frame)?,
    };

    if let Some(surface) = share {
        if surface.can_share(&blob) {
            match surface.share(&blob) {
                Ok(()) => return Ok(ExportOutcome::Shared),
                Err(err) => {
                    tracing::warn!(%err, "share failed, falling back to download");
                }
            }
        }
    }

    std::fs::create_dir_all(download_dir)
        .with_context(|| format!("create download dir '{}'", download_dir.display()))?;
    let path = download_dir.join(&blob.filename);
    std::fs::write(&path, &blob.bytes)
        .with_context(|| format!("write download '{}'", path.display()))?;
    Ok(ExportOutcome::Downloaded(path))
}

#[cfg(test)]
#[path = "../tests/unit/export.rs"]
mod tests;
