//! Pixel buffer views passed across the module boundary
//!
//! Image decoding is an external concern: the embedding application hands the
//! engine already-decoded pixels in a known layout. [`ImageFrame`] borrows
//! that buffer for the duration of a detection or OCR call; the core never
//! copies it.

use image::GrayImage;

use crate::error::{Error, ErrorCode, Result};

/// Pixel layouts the dispatch layer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit grayscale, one byte per pixel.
    Gray8,
    /// Interleaved RGB, three bytes per pixel.
    Rgb8,
    /// Interleaved BGRA, four bytes per pixel (common for capture sources).
    Bgra8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Bgra8 => 4,
        }
    }
}

/// Borrowed view of a decoded image.
///
/// The buffer must stay valid for the duration of the call it is passed to.
#[derive(Debug, Clone, Copy)]
pub struct ImageFrame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl<'a> ImageFrame<'a> {
    /// Wrap a raw pixel buffer. Fails if the buffer does not match the
    /// declared dimensions and layout.
    pub fn new(data: &'a [u8], width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if width == 0 || height == 0 || data.len() < expected {
            return Err(Error::new(
                ErrorCode::BadArgument,
                format!(
                    "pixel buffer of {} bytes does not hold a {}x{} {:?} image",
                    data.len(),
                    width,
                    height,
                    format
                ),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// View over an owned grayscale image.
    pub fn from_gray(image: &'a GrayImage) -> Self {
        Self {
            data: image.as_raw(),
            width: image.width(),
            height: image.height(),
            format: PixelFormat::Gray8,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Copy an axis-aligned region out of the frame as a grayscale crop.
    /// The region is clamped to the frame bounds first.
    pub fn crop_gray(&self, x: u32, y: u32, width: u32, height: u32) -> GrayImage {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);

        let mut out = GrayImage::new(width.max(1), height.max(1));
        let bpp = self.format.bytes_per_pixel();

        for row in 0..height {
            for col in 0..width {
                let idx = ((y + row) as usize * self.width as usize + (x + col) as usize) * bpp;
                let value = match self.format {
                    PixelFormat::Gray8 => self.data[idx],
                    PixelFormat::Rgb8 => {
                        let r = self.data[idx] as f32;
                        let g = self.data[idx + 1] as f32;
                        let b = self.data[idx + 2] as f32;
                        (0.299 * r + 0.587 * g + 0.114 * b) as u8
                    }
                    PixelFormat::Bgra8 => {
                        let b = self.data[idx] as f32;
                        let g = self.data[idx + 1] as f32;
                        let r = self.data[idx + 2] as f32;
                        (0.299 * r + 0.587 * g + 0.114 * b) as u8
                    }
                };
                out.put_pixel(col, row, image::Luma([value]));
            }
        }

        out
    }
}
