//! Owned RGBA pixel storage.
//!
//! A [`PixelBuffer`] is the unit every filter, capture and export operation
//! works on: a row-major sequence of 8-bit R, G, B, A samples whose length is
//! always `width * height * 4`.

use crate::error::{Error, Result};

/// Number of channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// A rectangular RGBA8 frame buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a fully transparent black buffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    /// Wrap existing RGBA samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBuffer`] if `data.len() != width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(Error::InvalidBuffer {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer where every pixel has the same value.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(Self::byte_len(width, height))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw samples, row-major RGBA.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw samples. The length cannot change through this slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its samples.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Check whether the buffer has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over pixels as `[r, g, b, a]` slices.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Iterate mutably over pixels.
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(CHANNELS)
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    /// Read the pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        let px = self.data.get(i..i + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Write the pixel at `(x, y)`. Returns `false` when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.data[i..i + CHANNELS].copy_from_slice(&rgba);
                true
            }
            None => false,
        }
    }

    /// Row `y` as a byte slice.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let stride = self.width as usize * CHANNELS;
        let start = self.offset(0, y)?;
        self.data.get(start..start + stride)
    }

    /// Copy of this buffer with columns reversed (column `x` reads `width-1-x`).
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let stride = self.width as usize * CHANNELS;
        let mut data = Vec::with_capacity(self.data.len());
        if stride > 0 {
            for row in self.data.chunks_exact(stride) {
                for px in row.chunks_exact(CHANNELS).rev() {
                    data.extend_from_slice(px);
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }
}
