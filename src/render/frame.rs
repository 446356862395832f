use crate::foundation::core::{Canvas, Rgba8};

#[derive(Clone, Debug, PartialEq, Eq)]
/// One rendered frame in row-major straight RGBA8.
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel bytes, `width * height * 4` long.
    pub rgba8: Vec<u8>,
}

impl FrameRGBA {
    /// Frame filled with a single color.
    pub fn solid(canvas: Canvas, color: Rgba8) -> Self {
        let px = color.to_array();
        let count = canvas.width as usize * canvas.height as usize;
        let mut rgba8 = Vec::with_capacity(count * 4);
        for _ in 0..count {
            rgba8.extend_from_slice(&px);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            rgba8,
        }
    }

    /// Read one pixel, or `None` outside the frame bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
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

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
