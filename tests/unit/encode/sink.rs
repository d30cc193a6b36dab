use super::*;

fn frame() -> Frame {
    Frame {
        width: 1,
        height: 1,
        data: vec![1, 2, 3],
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 1,
        height: 1,
        fps: Fps::integer(30).unwrap(),
        audio: None,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.push_frame(FrameIndex(1), &frame()).unwrap();
    sink.end().unwrap();
    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config().unwrap().width, 1);
}

#[test]
fn in_memory_sink_rejects_gaps() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    assert!(sink.push_frame(FrameIndex(2), &frame()).is_err());
}

#[test]
fn abort_discards_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.abort();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}

#[test]
fn end_without_begin_fails() {
    let mut sink = InMemorySink::new();
    assert!(sink.end().is_err());
}
