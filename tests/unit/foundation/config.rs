use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = ComposerConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.canvas, Canvas::VERTICAL_HD);
    assert_eq!(cfg.fps, Fps::integer(30).unwrap());
    assert_eq!(cfg.attenuation, 0.10);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: ComposerConfig = serde_json::from_str(
        r#"{ "canvas": { "width": 64, "height": 96 }, "motion_paths": ["zoom_out_center"] }"#,
    )
    .unwrap();
    assert_eq!(cfg.canvas, Canvas::new(64, 96).unwrap());
    assert_eq!(cfg.motion_paths, vec![MotionPath::ZoomOutCenter]);
    assert_eq!(cfg.min_segment_secs, 1.0);
    cfg.validate().unwrap();
}

#[test]
fn unknown_fields_are_rejected() {
    let res: Result<ComposerConfig, _> = serde_json::from_str(r#"{ "canvass": null }"#);
    assert!(res.is_err());
}

#[test]
fn validate_rejects_bad_knobs() {
    let bad = [
        ComposerConfig {
            min_segment_secs: 0.0,
            ..ComposerConfig::default()
        },
        ComposerConfig {
            attenuation: 0.0,
            ..ComposerConfig::default()
        },
        ComposerConfig {
            attenuation: 1.5,
            ..ComposerConfig::default()
        },
        ComposerConfig {
            motion_paths: vec![],
            ..ComposerConfig::default()
        },
        ComposerConfig {
            threads: Some(0),
            ..ComposerConfig::default()
        },
        ComposerConfig {
            chunk_size: 0,
            ..ComposerConfig::default()
        },
        ComposerConfig {
            segment_timeout_secs: f64::NAN,
            ..ComposerConfig::default()
        },
    ];
    for cfg in bad {
        assert!(
            matches!(cfg.validate(), Err(HerodoError::Validation(_))),
            "{cfg:?}"
        );
    }
}

#[test]
fn motion_cycles_by_index() {
    let cfg = ComposerConfig {
        motion_paths: vec![MotionPath::ZoomInCenter, MotionPath::PanTopToBottom],
        ..ComposerConfig::default()
    };
    assert_eq!(cfg.motion_for(0), MotionPath::ZoomInCenter);
    assert_eq!(cfg.motion_for(1), MotionPath::PanTopToBottom);
    assert_eq!(cfg.motion_for(4), MotionPath::ZoomInCenter);
}

#[test]
fn from_path_reads_json() {
    let dir = std::env::temp_dir().join(format!("herodo_config_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cfg.json");
    std::fs::write(&path, r#"{ "fps": { "num": 24, "den": 1 }, "attenuation": 0.25 }"#).unwrap();

    let cfg = ComposerConfig::from_path(&path).unwrap();
    assert_eq!(cfg.fps, Fps::integer(24).unwrap());
    assert_eq!(cfg.attenuation, 0.25);

    std::fs::write(&path, r#"{ "attenuation": 2.0 }"#).unwrap();
    assert!(ComposerConfig::from_path(&path).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
