use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{HerodoError, HerodoResult};
use crate::visual::animate::Frame;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Optional raw PCM audio file to mux alongside the frames.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that encode audio.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Consumer of rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called with strictly increasing, gap-free `FrameIndex`
/// values starting at 0. `end` finalizes the output; `abort` discards it.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> HerodoResult<()>;
    /// Push one frame in timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> HerodoResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> HerodoResult<()>;
    /// Called instead of `end` when composition fails. Must not leave a partial output behind.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Frame)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Whether `end` completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> HerodoResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> HerodoResult<()> {
        let expected = self.frames.len() as u64;
        if idx.0 != expected {
            return Err(HerodoError::encode(format!(
                "in-memory sink expected frame {expected}, got {}",
                idx.0
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> HerodoResult<()> {
        if self.cfg.is_none() {
            return Err(HerodoError::encode("in-memory sink not started"));
        }
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.finished = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
