//! Image representation for the grading pipeline.

use crate::error::GradeError;

/// Bytes per interleaved RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// An owned RGBA8 pixel buffer with its dimensions.
///
/// The length invariant (`width × height × 4`) is checked once at
/// construction, so every transform downstream can walk the data in
/// whole pixels and whole rows without re-validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap interleaved RGBA8 samples.
    ///
    /// Fails fast when the length is not a multiple of 4 or disagrees with
    /// the declared dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, GradeError> {
        let len = data.len();
        if len % CHANNELS != 0 {
            return Err(GradeError::UnalignedBuffer { len });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if len != expected {
            return Err(GradeError::DimensionMismatch {
                width,
                height,
                len,
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer filled with one RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            data: rgba.repeat(pixels),
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Bytes per row.
    pub fn row_stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Raw interleaved samples.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Samples viewed as whole pixels.
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    /// The pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels().get(idx).copied()
    }

    /// Give the storage back, e.g. to return it to a [`BufferPool`](crate::pipeline::pool::BufferPool).
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Build an output buffer from storage of the right length.
    pub(crate) fn from_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * CHANNELS);
        Self {
            width,
            height,
            data,
        }
    }
}

impl From<image::RgbaImage> for PixelBuffer {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl From<PixelBuffer> for image::RgbaImage {
    fn from(buffer: PixelBuffer) -> Self {
        let PixelBuffer {
            width,
            height,
            data,
        } = buffer;
        // Length was validated at construction, so the container always fits.
        image::RgbaImage::from_raw(width, height, data)
            .unwrap_or_else(|| image::RgbaImage::new(width, height))
    }
}
