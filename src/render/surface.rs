use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::foundation::math::mul_div255_u8;

/// A rendered or decoded frame in RGBA8 format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent premultiplied frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; pixel_count(width, height) * 4],
            premultiplied: true,
        }
    }

    /// Premultiplied frame filled with one premultiplied colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(pixel_count(width, height) * 4);
        for _ in 0..pixel_count(width, height) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }

    /// Wrap straight-alpha RGBA8 bytes, checking the buffer length.
    pub fn from_straight_rgba8(width: u32, height: u32, data: Vec<u8>) -> ClipweaveResult<Self> {
        let frame = Self {
            width,
            height,
            data,
            premultiplied: false,
        };
        frame.check_len()?;
        Ok(frame)
    }

    /// Return an error unless `data` holds exactly `width * height` pixels.
    pub fn check_len(&self) -> ClipweaveResult<()> {
        let expected = pixel_count(self.width, self.height) * 4;
        if self.data.len() != expected {
            return Err(ClipweaveError::media(format!(
                "frame {}x{} expects {expected} bytes, got {}",
                self.width,
                self.height,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Convert straight alpha to premultiplied alpha in place. No-op when already premultiplied.
    pub fn premultiply(&mut self) {
        if self.premultiplied {
            return;
        }
        for px in self.data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            px[0] = mul_div255_u8(u16::from(px[0]), a);
            px[1] = mul_div255_u8(u16::from(px[1]), a);
            px[2] = mul_div255_u8(u16::from(px[2]), a);
        }
        self.premultiplied = true;
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Pixel at `(x, y)`; `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    pub(crate) fn set_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&px);
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
