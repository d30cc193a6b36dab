use crate::assets::ImageAsset;
use crate::foundation::config::ComposerConfig;
use crate::foundation::core::{Canvas, Fps, Rect};
use crate::foundation::error::{HerodoError, HerodoResult};
use crate::visual::motion::{MotionKeys, MotionPath};

/// One image's slot on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Position in plan order.
    pub index: usize,
    /// Index into the caller's image list.
    pub image_index: usize,
    /// First frame of the segment on the visual track.
    pub start_frame: u64,
    /// Always `round(duration_secs * fps)`.
    pub frame_count: u64,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub motion: MotionPath,
    pub motion_keys: MotionKeys,
}

impl Segment {
    /// One past the last frame of the segment.
    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.frame_count
    }

    pub fn start_crop(&self) -> Rect {
        self.motion_keys.start.rect
    }

    pub fn end_crop(&self) -> Rect {
        self.motion_keys.end.rect
    }

    pub fn start_zoom(&self) -> f64 {
        self.motion_keys.start.zoom
    }

    pub fn end_zoom(&self) -> f64 {
        self.motion_keys.end.zoom
    }
}

/// Immutable partition of the narration into per-image segments.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SegmentPlan {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Narration duration the plan was built for.
    pub total_secs: f64,
    /// Images left out because they would have been shorter than the minimum segment.
    pub dropped_images: usize,
    pub segments: Vec<Segment>,
}

impl SegmentPlan {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_frames(&self) -> u64 {
        self.segments.iter().map(|s| s.frame_count).sum()
    }

    /// Sum of segment durations.
    pub fn duration_secs(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_secs).sum()
    }
}

/// Partition `total_secs` over `images`.
pub fn allocate(
    images: &[ImageAsset],
    total_secs: f64,
    cfg: &ComposerConfig,
) -> HerodoResult<SegmentPlan> {
    allocate_count(images.len(), total_secs, cfg)
}

/// Partition `total_secs` over `image_count` ranked images.
///
/// Segments are as even as whole frames allow; the last one absorbs the remainder so durations sum
/// to `total_secs`. Every segment has `round(duration_secs * fps)` frames, so the frame total is
/// `round(total_secs * fps)` except when the remainder lands on a half frame, where it may differ
/// by one. When a segment would be shorter than `min_segment_secs`, the lowest-ranked (last)
/// images are dropped. A total shorter than one minimum segment is rejected rather than clamped.
#[tracing::instrument(skip(cfg), fields(fps = cfg.fps.as_f64()))]
pub fn allocate_count(
    image_count: usize,
    total_secs: f64,
    cfg: &ComposerConfig,
) -> HerodoResult<SegmentPlan> {
    cfg.validate()?;
    if image_count == 0 {
        return Err(HerodoError::no_visual_content(
            "at least one image is required to build a timeline",
        ));
    }
    if !(total_secs.is_finite() && total_secs > 0.0) {
        return Err(HerodoError::invalid_duration(format!(
            "narration duration must be > 0, got {total_secs}"
        )));
    }
    if total_secs < cfg.min_segment_secs {
        return Err(HerodoError::invalid_duration(format!(
            "narration of {total_secs:.3}s is shorter than the minimum segment of {:.3}s",
            cfg.min_segment_secs
        )));
    }

    let fps = cfg.fps;
    let total_frames = fps.secs_to_frames_round(total_secs);
    if total_frames == 0 {
        return Err(HerodoError::invalid_duration(format!(
            "narration of {total_secs:.3}s is shorter than one frame at {} fps",
            fps.as_f64()
        )));
    }

    let by_duration = (total_secs / cfg.min_segment_secs).floor() as usize;
    let mut used = image_count
        .min(by_duration.max(1))
        .min(usize::try_from(total_frames).unwrap_or(usize::MAX));
    // Whole-frame segments can land just under the minimum; drop one more image until they fit.
    while used > 1 && !fits_minimum(total_frames, total_secs, used, cfg) {
        used -= 1;
    }
    let dropped = image_count - used;
    if dropped > 0 {
        tracing::warn!(
            image_count,
            used,
            dropped,
            min_segment_secs = cfg.min_segment_secs,
            "dropping lowest-ranked images to respect minimum segment duration"
        );
    }

    let base_frames = total_frames / used as u64;
    let base_secs = fps.frames_to_secs(base_frames);
    let mut segments = Vec::with_capacity(used);
    let mut start_frame = 0u64;
    let mut start_secs = 0.0f64;
    for index in 0..used {
        let last = index + 1 == used;
        let (frame_count, duration_secs) = if last {
            let rest = total_secs - start_secs;
            (fps.secs_to_frames_round(rest), rest)
        } else {
            (base_frames, base_secs)
        };
        let motion = cfg.motion_for(index);
        segments.push(Segment {
            index,
            image_index: index,
            start_frame,
            frame_count,
            start_secs,
            duration_secs,
            motion,
            motion_keys: motion.keys(cfg.canvas),
        });
        start_frame += frame_count;
        start_secs += duration_secs;
    }

    if segments.last().is_some_and(|s| s.frame_count == 0) {
        return Err(HerodoError::invalid_duration(format!(
            "last segment of a {total_secs:.3}s narration is shorter than one frame"
        )));
    }

    tracing::debug!(
        segments = used,
        total_frames = start_frame,
        base_frames,
        last_frames = segments.last().map(|s| s.frame_count),
        "allocated segment plan"
    );

    Ok(SegmentPlan {
        canvas: cfg.canvas,
        fps,
        total_secs,
        dropped_images: dropped,
        segments,
    })
}

/// Whether `used` segments of `total_frames / used` frames, remainder last, all reach
/// `min_segment_secs` (within float noise).
fn fits_minimum(total_frames: u64, total_secs: f64, used: usize, cfg: &ComposerConfig) -> bool {
    const EPS: f64 = 1e-9;
    let base_secs = cfg.fps.frames_to_secs(total_frames / used as u64);
    let last_secs = total_secs - base_secs * (used - 1) as f64;
    base_secs >= cfg.min_segment_secs - EPS && last_secs >= cfg.min_segment_secs - EPS
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/allocate.rs"]
mod tests;
