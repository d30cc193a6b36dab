//! End-to-end documentary assembly.
//!
//! Narration duration drives everything: it sizes the segment plan, bounds the music bed and
//! fixes the length of the output. Stages run strictly in order and any failure aborts the run
//! before the sink is finalized.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::assets::ImageAsset;
use crate::assets::audio::{AudioTrack, write_f32le_file};
use crate::audio::mix::mix;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink};
use crate::foundation::config::ComposerConfig;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{HerodoError, HerodoResult};
use crate::timeline::allocate::{SegmentPlan, allocate_count};
use crate::timeline::compose::{ComposeOpts, build_thread_pool, compose_into};
use crate::visual::animate::KenBurnsAnimator;
use crate::visual::normalize::normalize;

/// Everything a documentary is assembled from.
#[derive(Clone, Debug)]
pub struct DocumentaryInputs {
    /// Images in rank order; the last ones may be dropped when narration is short.
    pub images: Vec<ImageAsset>,
    /// Voice track. Its duration is the duration of the output.
    pub narration: AudioTrack,
    /// Optional background bed, looped or trimmed under the narration.
    pub music: Option<AudioTrack>,
}

/// Summary of a finished composition.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FinalAsset {
    /// Encoded file, when the sink wrote one.
    pub out_path: Option<PathBuf>,
    pub canvas: Canvas,
    pub fps: Fps,
    pub frames: u64,
    pub duration_secs: f64,
    pub segments: usize,
    pub dropped_images: usize,
    pub music_mixed: bool,
}

/// Assemble `inputs` and stream the result into `sink`.
#[tracing::instrument(skip_all, fields(
    images = inputs.images.len(),
    narration_secs = inputs.narration.duration_secs(),
    music = inputs.music.is_some()
))]
pub fn compose_documentary(
    inputs: &DocumentaryInputs,
    cfg: &ComposerConfig,
    sink: &mut dyn FrameSink,
) -> HerodoResult<FinalAsset> {
    cfg.validate()?;
    inputs.narration.validate()?;

    let plan = allocate_count(inputs.images.len(), inputs.narration.duration_secs(), cfg)?;
    tracing::info!(
        segments = plan.len(),
        dropped = plan.dropped_images,
        frames = plan.total_frames(),
        "planned timeline"
    );

    let normalized = normalize_used(&inputs.images, &plan, cfg)?;
    tracing::info!(images = normalized.len(), "normalized images");

    let mixed = mix(&inputs.narration, inputs.music.as_ref(), cfg.attenuation)?;
    tracing::info!(
        secs = mixed.duration_secs(),
        music = inputs.music.is_some(),
        "mixed audio"
    );

    let path = std::env::temp_dir().join(format!(
        "herodo_audio_mix_{}_{}.f32le",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    let (_audio_tmp, audio) = stage_mix(&mixed, path)?;

    let animator = KenBurnsAnimator::from_config(cfg);
    let stats = compose_into(
        &plan,
        &normalized,
        &animator,
        &ComposeOpts::from_config(cfg),
        Some(audio),
        sink,
    )?;
    tracing::info!(frames = stats.frames, "encoded visual track");

    Ok(FinalAsset {
        out_path: None,
        canvas: plan.canvas,
        fps: plan.fps,
        frames: stats.frames,
        duration_secs: plan.fps.frames_to_secs(stats.frames),
        segments: stats.segments,
        dropped_images: plan.dropped_images,
        music_mixed: inputs.music.is_some(),
    })
}

/// Assemble `inputs` into an MP4 through `ffmpeg`.
pub fn render_documentary(
    inputs: &DocumentaryInputs,
    cfg: &ComposerConfig,
    opts: FfmpegSinkOpts,
) -> HerodoResult<FinalAsset> {
    let out_path = opts.out_path.clone();
    let mut sink = FfmpegSink::new(opts);
    let asset = compose_documentary(inputs, cfg, &mut sink)?;
    tracing::info!(out = %out_path.display(), secs = asset.duration_secs, "wrote documentary");
    Ok(FinalAsset {
        out_path: Some(out_path),
        ..asset
    })
}

fn normalize_used(
    images: &[ImageAsset],
    plan: &SegmentPlan,
    cfg: &ComposerConfig,
) -> HerodoResult<Vec<ImageAsset>> {
    let used = plan
        .segments
        .iter()
        .map(|s| s.image_index + 1)
        .max()
        .unwrap_or(0);
    let used = images.get(..used).ok_or_else(|| {
        HerodoError::validation(format!(
            "plan needs {used} images but only {} were supplied",
            images.len()
        ))
    })?;

    let pool = build_thread_pool(cfg.threads)?;
    pool.install(|| {
        used.par_iter()
            .enumerate()
            .map(|(i, img)| {
                normalize(img, cfg.canvas)
                    .map(|n| n.image)
                    .map_err(|e| e.in_segment(i, i))
            })
            .collect()
    })
}

/// Write `mixed` to `path` for the sink to read. The file is removed when the guard drops,
/// including after a failed or partial write.
fn stage_mix(
    mixed: &AudioTrack,
    path: PathBuf,
) -> HerodoResult<(TempFileGuard, AudioInputConfig)> {
    let guard = TempFileGuard(Some(path.clone()));
    write_f32le_file(mixed, &path)?;
    Ok((
        guard,
        AudioInputConfig {
            path,
            sample_rate: mixed.sample_rate,
            channels: mixed.channels,
        },
    ))
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
