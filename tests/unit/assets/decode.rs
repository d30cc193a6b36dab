use std::io::Cursor;

use super::*;

fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_dimensions_and_drops_alpha() {
    let src = image::RgbaImage::from_raw(2, 1, vec![100, 50, 200, 128, 1, 2, 3, 255]).unwrap();
    let asset = decode_image(&png_bytes(image::DynamicImage::ImageRgba8(src))).unwrap();
    assert_eq!(asset.dimensions(), (2, 1));
    assert_eq!(asset.as_raw(), &[100, 50, 200, 1, 2, 3]);
}

#[test]
fn garbage_bytes_are_unsupported() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, HerodoError::UnsupportedImageFormat(_)));
}

#[test]
fn load_image_names_the_path() {
    let dir = std::env::temp_dir().join(format!("herodo_decode_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let bad = dir.join("broken.png");
    std::fs::write(&bad, b"\x89PNG broken").unwrap();

    let err = load_image(&bad).unwrap_err();
    match err {
        HerodoError::UnsupportedImageFormat(msg) => assert!(msg.contains("broken.png")),
        other => panic!("unexpected error: {other:?}"),
    }

    let missing = load_image(&dir.join("missing.png")).unwrap_err();
    assert!(matches!(missing, HerodoError::UnsupportedImageFormat(_)));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn raw_buffer_length_is_checked() {
    assert!(ImageAsset::from_rgb8(2, 2, vec![0; 12]).is_ok());
    assert!(matches!(
        ImageAsset::from_rgb8(2, 2, vec![0; 11]),
        Err(HerodoError::UnsupportedImageFormat(_))
    ));
    assert!(ImageAsset::from_rgb8(0, 2, vec![]).is_err());
}
