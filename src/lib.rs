//! Herodo turns ranked still images and a narration track into a short vertical documentary.
//!
//! The pipeline is linear:
//!
//! - [`allocate`] splits the narration duration into one [`Segment`] per image
//! - [`normalize`] cover-fits every image onto the [`Canvas`]
//! - [`KenBurnsAnimator`] turns each segment into a pan/zoom [`FrameSequence`]
//! - [`compose`] / [`compose_into`] render segments in parallel and join them in order
//! - [`mix`] lays optional music under the narration
//! - a [`FrameSink`] (usually [`FfmpegSink`]) receives frames and audio
//!
//! [`compose_documentary`] drives all of it from a [`DocumentaryInputs`] value.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod audio;
/// Output sinks.
pub mod encode;
pub(crate) mod pipeline;
pub(crate) mod script;
pub(crate) mod timeline;
pub(crate) mod visual;

pub use crate::foundation::config::{ComposerConfig, DEFAULT_ATTENUATION};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Size, Vec2};
pub use crate::foundation::error::{HerodoError, HerodoResult};

pub use crate::assets::ImageAsset;
pub use crate::assets::audio::{AudioTrack, MIX_SAMPLE_RATE, decode_audio};
pub use crate::assets::decode::{decode_image, load_image};

pub use crate::audio::mix::{loop_to_length, mix};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::pipeline::{DocumentaryInputs, FinalAsset, compose_documentary, render_documentary};
pub use crate::script::{WORDS_PER_SECOND, estimate_narration_secs};
pub use crate::timeline::allocate::{Segment, SegmentPlan, allocate, allocate_count};
pub use crate::timeline::compose::{
    ComposeOpts, ComposeStats, FrameSource, VisualTrack, compose, compose_into,
};
pub use crate::visual::animate::{Frame, FrameSequence, KenBurnsAnimator};
pub use crate::visual::ease::Ease;
pub use crate::visual::motion::{CropState, MotionKeys, MotionPath, PAN_ZOOM, ZOOM_PEAK};
pub use crate::visual::normalize::{NormalizedImage, normalize};
