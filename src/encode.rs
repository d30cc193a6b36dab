/// `ffmpeg` subprocess sink.
pub mod ffmpeg;
/// Sink trait and the in-memory sink.
pub mod sink;
