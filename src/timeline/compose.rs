use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::assets::ImageAsset;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::config::ComposerConfig;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{HerodoError, HerodoResult};
use crate::timeline::allocate::{Segment, SegmentPlan};
use crate::visual::animate::Frame;

/// Produces the frames of a segment.
///
/// Implementations must be pure: the same `(image, segment, frame)` always yields the same
/// pixels, and calls for different segments may run concurrently. Each call must return in
/// bounded time: the segment timeout is only checked between frames, so a call that never
/// returns stalls the composition.
pub trait FrameSource: Sync {
    /// Render local frame `frame` (0-based within the segment).
    fn render_frame(
        &self,
        image: &ImageAsset,
        segment: &Segment,
        frame: FrameIndex,
    ) -> HerodoResult<Frame>;
}

/// Threading and time bounds for composition.
#[derive(Clone, Debug)]
pub struct ComposeOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Wall-clock bound per segment; exceeding it fails the composition.
    ///
    /// Checked before and after every frame, so an overrun is reported once the frame in flight
    /// returns. It cannot interrupt a single [`FrameSource::render_frame`] call.
    pub segment_timeout: Duration,
    /// Frames rendered per parallel batch in [`compose_into`].
    pub chunk_size: usize,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self::from_config(&ComposerConfig::default())
    }
}

impl ComposeOpts {
    pub fn from_config(cfg: &ComposerConfig) -> Self {
        Self {
            threads: cfg.threads,
            segment_timeout: cfg.segment_timeout(),
            chunk_size: cfg.chunk_size,
        }
    }
}

/// Every frame of the composition, in plan order.
#[derive(Clone, Debug)]
pub struct VisualTrack {
    pub canvas: Canvas,
    pub fps: Fps,
    frames: Vec<Frame>,
    segment_starts: Vec<u64>,
}

impl VisualTrack {
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count())
    }

    pub fn segment_count(&self) -> usize {
        self.segment_starts.len()
    }

    /// Frames belonging to segment `index`.
    pub fn segment_frames(&self, index: usize) -> Option<&[Frame]> {
        let start = *self.segment_starts.get(index)? as usize;
        let end = self
            .segment_starts
            .get(index + 1)
            .map_or(self.frames.len(), |&e| e as usize);
        self.frames.get(start..end)
    }
}

/// Counters from a streamed composition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComposeStats {
    pub segments: usize,
    pub frames: u64,
}

enum SlotError {
    Failed(HerodoError),
    Cancelled,
}

/// Render every segment of `plan` and concatenate them in plan order.
///
/// Segments render independently on a worker pool into one slot each; the slots are joined in
/// index order once all of them finished. The first failing segment (in plan order) aborts the
/// whole composition and the remaining workers stop at their next frame.
#[tracing::instrument(skip_all, fields(segments = plan.len(), frames = plan.total_frames()))]
pub fn compose<S: FrameSource + ?Sized>(
    plan: &SegmentPlan,
    images: &[ImageAsset],
    source: &S,
    opts: &ComposeOpts,
) -> HerodoResult<VisualTrack> {
    check_plan(plan, images)?;
    let pool = build_thread_pool(opts.threads)?;
    let abort = AtomicBool::new(false);

    let slots: Vec<Result<Vec<Frame>, SlotError>> = pool.install(|| {
        plan.segments
            .par_iter()
            .map(|seg| {
                let res = render_segment(
                    plan.canvas,
                    seg,
                    &images[seg.image_index],
                    source,
                    opts.segment_timeout,
                    &abort,
                );
                if res.is_err() {
                    abort.store(true, Ordering::Relaxed);
                }
                res
            })
            .collect()
    });

    // Joined in plan order, so the reported failure is the earliest failing segment.
    let mut frames = Vec::with_capacity(plan.total_frames() as usize);
    let mut segment_starts = Vec::with_capacity(plan.len());
    let mut cancelled = false;
    for slot in slots {
        match slot {
            Ok(mut seg_frames) => {
                segment_starts.push(frames.len() as u64);
                frames.append(&mut seg_frames);
            }
            Err(SlotError::Failed(err)) => return Err(err),
            Err(SlotError::Cancelled) => cancelled = true,
        }
    }
    if cancelled {
        return Err(HerodoError::validation(
            "segment cancelled without a failing segment",
        ));
    }

    tracing::info!(
        segments = segment_starts.len(),
        frames = frames.len(),
        "composed visual track"
    );

    Ok(VisualTrack {
        canvas: plan.canvas,
        fps: plan.fps,
        frames,
        segment_starts,
    })
}

/// Stream the composition into `sink` without holding the whole track in memory.
///
/// Segments are emitted strictly in plan order; frames within a segment are rendered in parallel
/// batches of `opts.chunk_size`. On failure the sink is aborted and no output is finalized.
#[tracing::instrument(skip_all, fields(segments = plan.len(), frames = plan.total_frames()))]
pub fn compose_into<S: FrameSource + ?Sized>(
    plan: &SegmentPlan,
    images: &[ImageAsset],
    source: &S,
    opts: &ComposeOpts,
    audio: Option<AudioInputConfig>,
    sink: &mut dyn FrameSink,
) -> HerodoResult<ComposeStats> {
    check_plan(plan, images)?;
    let pool = build_thread_pool(opts.threads)?;

    sink.begin(SinkConfig {
        width: plan.canvas.width,
        height: plan.canvas.height,
        fps: plan.fps,
        audio,
    })?;

    match stream_segments(plan, images, source, opts, &pool, sink) {
        Ok(stats) => {
            sink.end()?;
            tracing::info!(
                segments = stats.segments,
                frames = stats.frames,
                "streamed visual track"
            );
            Ok(stats)
        }
        Err(err) => {
            sink.abort();
            Err(err)
        }
    }
}

fn stream_segments<S: FrameSource + ?Sized>(
    plan: &SegmentPlan,
    images: &[ImageAsset],
    source: &S,
    opts: &ComposeOpts,
    pool: &rayon::ThreadPool,
    sink: &mut dyn FrameSink,
) -> HerodoResult<ComposeStats> {
    let chunk = opts.chunk_size.max(1) as u64;
    let mut stats = ComposeStats::default();

    for seg in &plan.segments {
        let image = &images[seg.image_index];
        let started = Instant::now();
        let mut chunk_start = 0u64;
        while chunk_start < seg.frame_count {
            check_deadline(seg, started, opts.segment_timeout)?;
            let chunk_end = (chunk_start + chunk).min(seg.frame_count);
            let rendered: Vec<HerodoResult<Frame>> = pool.install(|| {
                (chunk_start..chunk_end)
                    .into_par_iter()
                    .map(|i| source.render_frame(image, seg, FrameIndex(i)))
                    .collect()
            });
            for (i, frame) in (chunk_start..chunk_end).zip(rendered) {
                let frame = frame.map_err(|e| e.in_segment(seg.index, seg.image_index))?;
                check_frame_size(plan.canvas, seg, &frame)?;
                sink.push_frame(FrameIndex(seg.start_frame + i), &frame)?;
            }
            chunk_start = chunk_end;
        }
        check_deadline(seg, started, opts.segment_timeout)?;
        tracing::debug!(
            segment = seg.index,
            image = seg.image_index,
            frames = seg.frame_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "segment streamed"
        );
        stats.segments += 1;
        stats.frames += seg.frame_count;
    }
    Ok(stats)
}

fn render_segment<S: FrameSource + ?Sized>(
    canvas: Canvas,
    seg: &Segment,
    image: &ImageAsset,
    source: &S,
    timeout: Duration,
    abort: &AtomicBool,
) -> Result<Vec<Frame>, SlotError> {
    let started = Instant::now();
    let mut frames = Vec::with_capacity(seg.frame_count as usize);
    for i in 0..seg.frame_count {
        if abort.load(Ordering::Relaxed) {
            return Err(SlotError::Cancelled);
        }
        check_deadline(seg, started, timeout).map_err(SlotError::Failed)?;
        let frame = source
            .render_frame(image, seg, FrameIndex(i))
            .map_err(|e| SlotError::Failed(e.in_segment(seg.index, seg.image_index)))?;
        check_frame_size(canvas, seg, &frame).map_err(SlotError::Failed)?;
        frames.push(frame);
    }
    check_deadline(seg, started, timeout).map_err(SlotError::Failed)?;

    tracing::debug!(
        segment = seg.index,
        image = seg.image_index,
        frames = seg.frame_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "segment rendered"
    );
    Ok(frames)
}

fn check_plan(plan: &SegmentPlan, images: &[ImageAsset]) -> HerodoResult<()> {
    if plan.is_empty() {
        return Err(HerodoError::no_visual_content("segment plan has no segments"));
    }
    let mut next = 0u64;
    for seg in &plan.segments {
        if seg.image_index >= images.len() {
            return Err(HerodoError::validation(format!(
                "segment {} references image {} but only {} images were supplied",
                seg.index,
                seg.image_index,
                images.len()
            )));
        }
        if seg.frame_count == 0 {
            return Err(HerodoError::invalid_duration(format!(
                "segment {} (image {}) has no frames",
                seg.index, seg.image_index
            )));
        }
        if seg.start_frame != next {
            return Err(HerodoError::validation(format!(
                "segment {} starts at frame {} but the previous segment ends at {next}",
                seg.index, seg.start_frame
            )));
        }
        next = seg.end_frame();
    }
    Ok(())
}

fn check_deadline(seg: &Segment, started: Instant, limit: Duration) -> HerodoResult<()> {
    let elapsed = started.elapsed();
    if elapsed > limit {
        tracing::warn!(
            segment = seg.index,
            image = seg.image_index,
            elapsed_ms = elapsed.as_millis() as u64,
            "segment render exceeded its time bound"
        );
        return Err(HerodoError::SegmentRenderTimeout {
            segment: seg.index,
            image: seg.image_index,
            elapsed_ms: elapsed.as_millis(),
            limit_ms: limit.as_millis(),
        });
    }
    Ok(())
}

fn check_frame_size(canvas: Canvas, seg: &Segment, frame: &Frame) -> HerodoResult<()> {
    if frame.width != canvas.width
        || frame.height != canvas.height
        || frame.data.len() != canvas.pixel_count() * 3
    {
        return Err(HerodoError::validation(format!(
            "segment {} (image {}) produced a {}x{} frame for a {}x{} canvas",
            seg.index, seg.image_index, frame.width, frame.height, canvas.width, canvas.height
        )));
    }
    Ok(())
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> HerodoResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(HerodoError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| HerodoError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/compose.rs"]
mod tests;
