use std::path::Path;

use crate::assets::ImageAsset;
use crate::foundation::error::{HerodoError, HerodoResult};

/// Decode encoded image bytes (PNG, JPEG, ...) into an opaque RGB8 asset.
///
/// Alpha is dropped; sources are expected to be photographs.
pub fn decode_image(bytes: &[u8]) -> HerodoResult<ImageAsset> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| HerodoError::unsupported_image(format!("decode image from memory: {e}")))?;
    ImageAsset::from_image(dyn_img.to_rgb8())
}

/// Read and decode the image at `path`.
pub fn load_image(path: &Path) -> HerodoResult<ImageAsset> {
    let bytes = std::fs::read(path).map_err(|e| {
        HerodoError::unsupported_image(format!("read image '{}': {e}", path.display()))
    })?;
    decode_image(&bytes).map_err(|e| match e {
        HerodoError::UnsupportedImageFormat(msg) => {
            HerodoError::unsupported_image(format!("'{}': {msg}", path.display()))
        }
        other => other,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
