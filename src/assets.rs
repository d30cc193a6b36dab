use std::sync::Arc;

use image::RgbImage;

use crate::foundation::error::{HerodoError, HerodoResult};

pub(crate) mod audio;
pub(crate) mod decode;

/// A decoded still image: opaque RGB8, row-major, tightly packed.
///
/// Cloning is cheap; the pixel buffer is shared and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAsset {
    pixels: Arc<RgbImage>,
}

impl ImageAsset {
    pub fn from_image(pixels: RgbImage) -> HerodoResult<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(HerodoError::unsupported_image(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    /// Wrap a raw RGB8 buffer of `width * height * 3` bytes.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> HerodoResult<Self> {
        let expected = width as usize * height as usize * 3;
        let got = data.len();
        let pixels = RgbImage::from_raw(width, height, data).ok_or_else(|| {
            HerodoError::unsupported_image(format!(
                "rgb8 buffer has {got} bytes, expected {expected} for {width}x{height}"
            ))
        })?;
        Self::from_image(pixels)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}
