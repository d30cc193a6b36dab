use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        HerodoError::no_visual_content("x")
            .to_string()
            .contains("no visual content:")
    );
    assert!(
        HerodoError::unsupported_image("x")
            .to_string()
            .contains("unsupported image format:")
    );
    assert!(
        HerodoError::invalid_duration("x")
            .to_string()
            .contains("invalid segment duration:")
    );
    assert!(
        HerodoError::incompatible_audio("x")
            .to_string()
            .contains("incompatible audio format:")
    );
    assert!(
        HerodoError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn in_segment_adds_context_and_keeps_variant() {
    let err = HerodoError::invalid_duration("zero frames").in_segment(3, 5);
    match err {
        HerodoError::InvalidSegmentDuration(msg) => {
            assert!(msg.contains("segment 3"));
            assert!(msg.contains("image 5"));
            assert!(msg.contains("zero frames"));
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn timeout_reports_segment_and_limit() {
    let err = HerodoError::SegmentRenderTimeout {
        segment: 2,
        image: 4,
        elapsed_ms: 1500,
        limit_ms: 1000,
    }
    .in_segment(9, 9);
    let text = err.to_string();
    assert!(text.contains("segment 2"));
    assert!(text.contains("limit 1000 ms"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = HerodoError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
