use image::imageops::{self, FilterType};

use crate::assets::ImageAsset;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::HerodoResult;

/// An image resampled to exactly the canvas size.
#[derive(Clone, Debug)]
pub struct NormalizedImage {
    /// Canvas-sized pixels.
    pub image: ImageAsset,
    /// Region of the source image that ended up visible, in source pixels.
    pub source_crop: Rect,
}

/// Cover-fit `image` onto `canvas`: uniform scale until both canvas dimensions are filled,
/// then center-crop the overflow. Never pads, never stretches.
///
/// Sources smaller than the canvas are upscaled by the same rule and lose sharpness accordingly.
pub fn normalize(image: &ImageAsset, canvas: Canvas) -> HerodoResult<NormalizedImage> {
    canvas.validate()?;
    let (w, h) = image.dimensions();
    let (crop_x, crop_y, crop_w, crop_h) = cover_crop(w, h, canvas);
    let source_crop = Rect::new(
        f64::from(crop_x),
        f64::from(crop_y),
        f64::from(crop_x + crop_w),
        f64::from(crop_y + crop_h),
    );

    let cropped = imageops::crop_imm(image.as_image(), crop_x, crop_y, crop_w, crop_h).to_image();
    let pixels = if (crop_w, crop_h) == (canvas.width, canvas.height) {
        cropped
    } else {
        imageops::resize(&cropped, canvas.width, canvas.height, FilterType::Lanczos3)
    };

    tracing::debug!(
        src_w = w,
        src_h = h,
        crop_x,
        crop_y,
        crop_w,
        crop_h,
        upscale = crop_w < canvas.width,
        "normalized image to canvas"
    );

    Ok(NormalizedImage {
        image: ImageAsset::from_image(pixels)?,
        source_crop,
    })
}

/// Centered source rectangle `(x, y, w, h)` whose aspect matches the canvas as closely as whole
/// pixels allow. One side always spans the full source dimension.
pub(crate) fn cover_crop(src_w: u32, src_h: u32, canvas: Canvas) -> (u32, u32, u32, u32) {
    let scale = (f64::from(canvas.width) / f64::from(src_w))
        .max(f64::from(canvas.height) / f64::from(src_h));
    let crop_w = ((f64::from(canvas.width) / scale).round() as u32).clamp(1, src_w);
    let crop_h = ((f64::from(canvas.height) / scale).round() as u32).clamp(1, src_h);
    ((src_w - crop_w) / 2, (src_h - crop_h) / 2, crop_w, crop_h)
}

#[cfg(test)]
#[path = "../../tests/unit/visual/normalize.rs"]
mod tests;
