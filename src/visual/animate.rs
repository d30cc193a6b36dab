//! Ken Burns frame generation.
//!
//! A frame is a pure function of `(image, motion keys, ease, frame index, frame count)`:
//! progress is `i / (T - 1)` (zero for single-frame segments), passed through the configured
//! [`Ease`], and the interpolated crop rectangle is resampled bilinearly to the canvas.

use crate::assets::ImageAsset;
use crate::foundation::config::ComposerConfig;
use crate::foundation::core::{Canvas, Fps, FrameIndex, Rect};
use crate::foundation::error::{HerodoError, HerodoResult};
use crate::timeline::allocate::Segment;
use crate::timeline::compose::FrameSource;
use crate::visual::ease::Ease;
use crate::visual::motion::{MotionKeys, MotionPath};

/// A rendered frame as packed RGB8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Pan/zoom animator bound to one canvas and easing curve.
#[derive(Clone, Copy, Debug)]
pub struct KenBurnsAnimator {
    canvas: Canvas,
    ease: Ease,
}

impl KenBurnsAnimator {
    pub fn new(canvas: Canvas, ease: Ease) -> Self {
        Self { canvas, ease }
    }

    pub fn from_config(cfg: &ComposerConfig) -> Self {
        Self::new(cfg.canvas, cfg.ease)
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Animate a normalized image along `motion` for `duration_secs`.
    ///
    /// The sequence has `round(duration_secs * fps)` frames.
    pub fn render<'a>(
        &self,
        image: &'a ImageAsset,
        duration_secs: f64,
        motion: MotionPath,
        fps: Fps,
    ) -> HerodoResult<FrameSequence<'a>> {
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return Err(HerodoError::invalid_duration(format!(
                "segment duration must be > 0, got {duration_secs}"
            )));
        }
        let frames = fps.secs_to_frames_round(duration_secs);
        self.sequence(image, motion.keys(self.canvas), frames)
    }

    /// Sequence of exactly `frame_count` frames between precomputed motion keys.
    pub fn sequence<'a>(
        &self,
        image: &'a ImageAsset,
        keys: MotionKeys,
        frame_count: u64,
    ) -> HerodoResult<FrameSequence<'a>> {
        if frame_count == 0 {
            return Err(HerodoError::invalid_duration(
                "segment is shorter than one frame",
            ));
        }
        if image.dimensions() != (self.canvas.width, self.canvas.height) {
            return Err(HerodoError::validation(format!(
                "animator expects a {}x{} normalized image, got {}x{}",
                self.canvas.width,
                self.canvas.height,
                image.width(),
                image.height()
            )));
        }
        Ok(FrameSequence {
            image,
            keys,
            ease: self.ease,
            canvas: self.canvas,
            total: frame_count,
            next: 0,
        })
    }
}

impl FrameSource for KenBurnsAnimator {
    fn render_frame(
        &self,
        image: &ImageAsset,
        segment: &Segment,
        frame: FrameIndex,
    ) -> HerodoResult<Frame> {
        self.sequence(image, segment.motion_keys, segment.frame_count)?
            .frame(frame)
    }
}

/// Lazy, finite, restartable frames of one segment.
///
/// Cloning or calling [`FrameSequence::restart`] replays the exact same frames.
#[derive(Clone, Debug)]
pub struct FrameSequence<'a> {
    image: &'a ImageAsset,
    keys: MotionKeys,
    ease: Ease,
    canvas: Canvas,
    total: u64,
    next: u64,
}

impl FrameSequence<'_> {
    pub fn len_frames(&self) -> u64 {
        self.total
    }

    pub fn restart(&mut self) {
        self.next = 0;
    }

    /// Eased progress of frame `i`.
    pub fn progress(&self, i: u64) -> f64 {
        if self.total <= 1 {
            return self.ease.apply(0.0);
        }
        self.ease.apply(i as f64 / (self.total - 1) as f64)
    }

    /// Crop rectangle shown at frame `i`, in canvas space.
    pub fn crop_at(&self, i: u64) -> Rect {
        self.keys.at(self.progress(i)).rect
    }

    /// Render frame `idx` without advancing the iterator.
    pub fn frame(&self, idx: FrameIndex) -> HerodoResult<Frame> {
        if idx.0 >= self.total {
            return Err(HerodoError::validation(format!(
                "frame {} is outside a {}-frame segment",
                idx.0, self.total
            )));
        }
        Ok(render_crop(self.image, self.crop_at(idx.0), self.canvas))
    }
}

impl Iterator for FrameSequence<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.next >= self.total {
            return None;
        }
        let frame = render_crop(self.image, self.crop_at(self.next), self.canvas);
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = (self.total - self.next) as usize;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for FrameSequence<'_> {}

/// Bilinearly resample `crop` (source pixel space, pixel centers at `+0.5`) to `canvas`.
fn render_crop(src: &ImageAsset, crop: Rect, canvas: Canvas) -> Frame {
    let (sw, sh) = src.dimensions();
    let cols: Vec<AxisTap> = (0..canvas.width)
        .map(|x| AxisTap::new(crop.x0, crop.width(), canvas.width, x, sw))
        .collect();
    let rows: Vec<AxisTap> = (0..canvas.height)
        .map(|y| AxisTap::new(crop.y0, crop.height(), canvas.height, y, sh))
        .collect();

    let raw = src.as_raw();
    let src_stride = sw as usize * 3;
    let dst_stride = canvas.width as usize * 3;
    let mut data = vec![0u8; canvas.pixel_count() * 3];

    for (row, out) in rows.iter().zip(data.chunks_exact_mut(dst_stride)) {
        let top = &raw[row.i0 * src_stride..(row.i0 + 1) * src_stride];
        let bottom = &raw[row.i1 * src_stride..(row.i1 + 1) * src_stride];
        for (col, px) in cols.iter().zip(out.chunks_exact_mut(3)) {
            let (a, b) = (col.i0 * 3, col.i1 * 3);
            for c in 0..3 {
                let t = lerp(f32::from(top[a + c]), f32::from(top[b + c]), col.frac);
                let u = lerp(f32::from(bottom[a + c]), f32::from(bottom[b + c]), col.frac);
                px[c] = lerp(t, u, row.frac).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Frame {
        width: canvas.width,
        height: canvas.height,
        data,
    }
}

#[derive(Clone, Copy, Debug)]
struct AxisTap {
    i0: usize,
    i1: usize,
    frac: f32,
}

impl AxisTap {
    fn new(origin: f64, span: f64, out_len: u32, i: u32, src_len: u32) -> Self {
        let max = f64::from(src_len - 1);
        let pos = (origin + (f64::from(i) + 0.5) * span / f64::from(out_len) - 0.5).clamp(0.0, max);
        let i0 = pos.floor() as usize;
        Self {
            i0,
            i1: (i0 + 1).min(src_len as usize - 1),
            frac: (pos - i0 as f64) as f32,
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/visual/animate.rs"]
mod tests;
