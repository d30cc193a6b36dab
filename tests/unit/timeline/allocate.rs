use super::*;
use crate::visual::motion::{PAN_ZOOM, ZOOM_PEAK};

fn cfg() -> ComposerConfig {
    ComposerConfig {
        canvas: Canvas::new(90, 160).unwrap(),
        ..ComposerConfig::default()
    }
}

#[test]
fn three_images_nine_seconds_thirty_fps() {
    let plan = allocate_count(3, 9.0, &cfg()).unwrap();
    assert_eq!(plan.len(), 3);
    for (i, seg) in plan.segments.iter().enumerate() {
        assert_eq!(seg.frame_count, 90);
        assert_eq!(seg.start_frame, 90 * i as u64);
        assert!((seg.duration_secs - 3.0).abs() < 1e-12);
    }
    assert_eq!(plan.total_frames(), 270);
    assert_eq!(plan.dropped_images, 0);
}

#[test]
fn durations_and_frames_add_up() {
    let cfg = ComposerConfig {
        min_segment_secs: 0.5,
        ..cfg()
    };
    for count in 1..=9 {
        for total in [1.0, 2.37, 7.1, 9.999, 13.0, 31.4159, 60.02] {
            let plan = allocate_count(count, total, &cfg).unwrap();
            let fps = plan.fps;
            assert!((plan.duration_secs() - total).abs() < 1e-9);
            assert!(plan.total_frames().abs_diff(fps.secs_to_frames_round(total)) <= 1);
            // Frame counts agree with durations and segments are contiguous.
            let mut next = 0;
            for seg in &plan.segments {
                assert_eq!(seg.frame_count, fps.secs_to_frames_round(seg.duration_secs));
                assert_eq!(seg.start_frame, next);
                next = seg.end_frame();
            }
            // Only the last segment may differ from the others.
            let first = plan.segments[0].frame_count;
            for seg in &plan.segments[..plan.len() - 1] {
                assert_eq!(seg.frame_count, first);
            }
            assert!(plan.segments[plan.len() - 1].frame_count >= first);
        }
    }
}

#[test]
fn remainder_goes_to_last_segment() {
    let plan = allocate_count(3, 10.0, &cfg()).unwrap();
    let frames: Vec<u64> = plan.segments.iter().map(|s| s.frame_count).collect();
    assert_eq!(frames, vec![100, 100, 100]);

    let plan = allocate_count(4, 10.0, &cfg()).unwrap();
    let frames: Vec<u64> = plan.segments.iter().map(|s| s.frame_count).collect();
    assert_eq!(frames, vec![75, 75, 75, 75]);

    let plan = allocate_count(7, 10.0, &cfg()).unwrap();
    let frames: Vec<u64> = plan.segments.iter().map(|s| s.frame_count).collect();
    assert_eq!(frames, vec![42, 42, 42, 42, 42, 42, 48]);
    assert!((plan.segments[6].duration_secs - (10.0 - 6.0 * 1.4)).abs() < 1e-9);
}

#[test]
fn half_frame_remainder_keeps_last_segment_consistent() {
    let plan = allocate_count(4, 35.25, &cfg()).unwrap();
    let fps = plan.fps;
    let last = &plan.segments[3];
    assert_eq!(last.frame_count, fps.secs_to_frames_round(last.duration_secs));
    assert!((plan.duration_secs() - 35.25).abs() < 1e-9);
    let by_duration: u64 = plan
        .segments
        .iter()
        .map(|s| fps.secs_to_frames_round(s.duration_secs))
        .sum();
    assert_eq!(plan.total_frames(), by_duration);
    assert!(plan.total_frames().abs_diff(fps.secs_to_frames_round(35.25)) <= 1);
}

#[test]
fn frame_counts_match_durations_across_rates() {
    for (num, den) in [(24, 1), (25, 1), (30, 1), (30000, 1001)] {
        let cfg = ComposerConfig {
            fps: Fps::new(num, den).unwrap(),
            ..cfg()
        };
        for count in 1..=8 {
            for total in [9.22, 20.18, 35.25, 3.0002, 7.5, 12.345] {
                let plan = allocate_count(count, total, &cfg).unwrap();
                for seg in &plan.segments {
                    assert_eq!(
                        seg.frame_count,
                        cfg.fps.secs_to_frames_round(seg.duration_secs),
                        "fps={num}/{den} total={total} n={count} seg={}",
                        seg.index
                    );
                    assert!(
                        seg.duration_secs >= cfg.min_segment_secs - 1e-9,
                        "fps={num}/{den} total={total} n={count} seg={} dur={}",
                        seg.index,
                        seg.duration_secs
                    );
                }
            }
        }
    }
}

#[test]
fn quantized_segments_never_fall_under_minimum() {
    let cfg = ComposerConfig {
        fps: Fps::new(30000, 1001).unwrap(),
        ..cfg()
    };
    let plan = allocate_count(3, 3.0002, &cfg).unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.dropped_images, 1);
    assert!(plan.segments.iter().all(|s| s.duration_secs >= 1.0));
}

#[test]
fn segment_exposes_motion_endpoints() {
    let cfg = ComposerConfig {
        motion_paths: vec![MotionPath::PanLeftToRight, MotionPath::ZoomInCenter],
        ..cfg()
    };
    let plan = allocate_count(2, 4.0, &cfg).unwrap();

    let pan = &plan.segments[0];
    assert_eq!(pan.start_zoom(), PAN_ZOOM);
    assert_eq!(pan.end_zoom(), PAN_ZOOM);
    assert!(pan.start_crop().x0.abs() < 1e-9);
    assert!((pan.end_crop().x1 - 90.0).abs() < 1e-9);
    assert!((pan.start_crop().width() - 90.0 / PAN_ZOOM).abs() < 1e-9);
    assert_eq!(pan.start_crop().center().y, pan.end_crop().center().y);

    let zoom = &plan.segments[1];
    assert_eq!(zoom.start_zoom(), 1.0);
    assert_eq!(zoom.end_zoom(), ZOOM_PEAK);
    assert_eq!(zoom.start_crop(), cfg.canvas.rect());
    let (end, full) = (zoom.end_crop().center(), cfg.canvas.rect().center());
    assert!((end.x - full.x).abs() < 1e-9 && (end.y - full.y).abs() < 1e-9);
    assert!(zoom.end_crop().width() < zoom.start_crop().width());
}

#[test]
fn excess_images_are_dropped_from_the_end() {
    let plan = allocate_count(10, 3.5, &cfg()).unwrap();
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.dropped_images, 7);
    let used: Vec<usize> = plan.segments.iter().map(|s| s.image_index).collect();
    assert_eq!(used, vec![0, 1, 2]);
    assert!(plan.segments.iter().all(|s| s.duration_secs >= 1.0));
}

#[test]
fn narration_shorter_than_minimum_segment_fails() {
    let err = allocate_count(1, 0.1, &cfg()).unwrap_err();
    assert!(matches!(err, HerodoError::InvalidSegmentDuration(_)));
}

#[test]
fn no_images_is_no_visual_content() {
    let err = allocate(&[], 5.0, &cfg()).unwrap_err();
    assert!(matches!(err, HerodoError::NoVisualContent(_)));
}

#[test]
fn non_positive_total_is_rejected() {
    for total in [0.0, -2.0, f64::INFINITY, f64::NAN] {
        let err = allocate_count(2, total, &cfg()).unwrap_err();
        assert!(matches!(err, HerodoError::InvalidSegmentDuration(_)));
    }
}

#[test]
fn motion_paths_cycle_deterministically() {
    let cfg = ComposerConfig {
        min_segment_secs: 0.25,
        ..cfg()
    };
    let plan = allocate_count(6, 6.0, &cfg).unwrap();
    let cycle = MotionPath::default_cycle();
    for seg in &plan.segments {
        assert_eq!(seg.motion, cycle[seg.index % cycle.len()]);
        assert_eq!(seg.motion_keys, seg.motion.keys(cfg.canvas));
    }
    for pair in plan.segments.windows(2) {
        assert_ne!(pair[0].motion, pair[1].motion);
    }
    assert_eq!(plan, allocate_count(6, 6.0, &cfg).unwrap());
}

#[test]
fn plan_serializes_to_json() {
    let plan = allocate_count(2, 4.0, &cfg()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["segments"][1]["motion"], "pan_left_to_right");
    assert_eq!(json["segments"][1]["start_frame"], 60);
    let back: SegmentPlan = serde_json::from_value(json).unwrap();
    assert_eq!(back.len(), plan.len());
    assert_eq!(back.total_frames(), plan.total_frames());
    assert_eq!(back.segments[0].motion, plan.segments[0].motion);
}
