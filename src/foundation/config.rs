use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{HerodoError, HerodoResult};
use crate::visual::ease::Ease;
use crate::visual::motion::MotionPath;

/// Default music attenuation relative to narration.
pub const DEFAULT_ATTENUATION: f32 = 0.10;

/// Run-wide composition settings.
///
/// Threaded explicitly through every stage; nothing reads ambient state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposerConfig {
    /// Output frame size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Shortest segment worth showing; extra images are dropped to respect it.
    pub min_segment_secs: f64,
    /// Music gain in `(0, 1]` applied before summing with narration.
    pub attenuation: f32,
    /// Motion paths cycled over segments in plan order.
    pub motion_paths: Vec<MotionPath>,
    /// Progress curve for every segment.
    pub ease: Ease,
    /// Wall-clock bound for rendering a single segment.
    pub segment_timeout_secs: f64,
    /// Worker threads for segment rendering. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames rendered per parallel batch when streaming to a sink.
    pub chunk_size: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::VERTICAL_HD,
            fps: Fps::default(),
            min_segment_secs: 1.0,
            attenuation: DEFAULT_ATTENUATION,
            motion_paths: MotionPath::default_cycle(),
            ease: Ease::default(),
            segment_timeout_secs: 120.0,
            threads: None,
            chunk_size: 16,
        }
    }
}

impl ComposerConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> HerodoResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes).map_err(|e| {
            HerodoError::validation(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> HerodoResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if !(self.min_segment_secs.is_finite() && self.min_segment_secs > 0.0) {
            return Err(HerodoError::validation(format!(
                "min_segment_secs must be > 0, got {}",
                self.min_segment_secs
            )));
        }
        validate_attenuation(self.attenuation)?;
        if self.motion_paths.is_empty() {
            return Err(HerodoError::validation("motion_paths must not be empty"));
        }
        if !(self.segment_timeout_secs.is_finite() && self.segment_timeout_secs > 0.0) {
            return Err(HerodoError::validation(format!(
                "segment_timeout_secs must be > 0, got {}",
                self.segment_timeout_secs
            )));
        }
        if self.threads == Some(0) {
            return Err(HerodoError::validation("threads must be > 0 when set"));
        }
        if self.chunk_size == 0 {
            return Err(HerodoError::validation("chunk_size must be > 0"));
        }
        Ok(())
    }

    pub fn segment_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.segment_timeout_secs).unwrap_or(Duration::MAX)
    }

    /// Motion path for the segment at `index`.
    pub fn motion_for(&self, index: usize) -> MotionPath {
        self.motion_paths[index % self.motion_paths.len()]
    }
}

pub(crate) fn validate_attenuation(attenuation: f32) -> HerodoResult<()> {
    if !(attenuation > 0.0 && attenuation <= 1.0) {
        return Err(HerodoError::validation(format!(
            "attenuation must be in (0, 1], got {attenuation}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
