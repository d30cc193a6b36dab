use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_rounds_to_nearest_frame() {
    let fps = Fps::integer(30).unwrap();
    assert_eq!(fps.secs_to_frames_round(3.0), 90);
    assert_eq!(fps.secs_to_frames_round(0.049), 1);
    assert_eq!(fps.secs_to_frames_round(0.016), 0);
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
}

#[test]
fn fps_rational_frames_secs_roundtrip() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_round(secs), 123);
}

#[test]
fn canvas_default_is_vertical_hd() {
    let canvas = Canvas::default();
    assert_eq!((canvas.width, canvas.height), (1080, 1920));
    assert!((canvas.aspect() - 9.0 / 16.0).abs() < 1e-12);
    assert_eq!(canvas.rect(), Rect::new(0.0, 0.0, 1080.0, 1920.0));
}

#[test]
fn canvas_rejects_empty_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(2, 2).is_ok());
}
