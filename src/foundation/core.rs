use crate::foundation::error::{HerodoError, HerodoResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// Zero-based frame index on the visual timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> HerodoResult<Self> {
        if den == 0 {
            return Err(HerodoError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(HerodoError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Integer frame rate, e.g. `Fps::integer(30)`.
    pub fn integer(num: u32) -> HerodoResult<Self> {
        Self::new(num, 1)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Nearest whole frame count for `secs` (half away from zero).
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Fixed output frame size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// 1080x1920, the 9:16 vertical short-video format.
    pub const VERTICAL_HD: Canvas = Canvas {
        width: 1080,
        height: 1920,
    };

    pub fn new(width: u32, height: u32) -> HerodoResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    pub fn validate(self) -> HerodoResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(HerodoError::validation(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// The full canvas as a rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.size())
    }

    pub(crate) fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::VERTICAL_HD
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
