/// Convenience result type used across herodo.
pub type HerodoResult<T> = Result<T, HerodoError>;

/// Error taxonomy for composition runs.
///
/// Every variant aborts the current run; nothing is retried here.
#[derive(thiserror::Error, Debug)]
pub enum HerodoError {
    /// No images were supplied, so there is nothing to animate.
    #[error("no visual content: {0}")]
    NoVisualContent(String),

    /// An image could not be decoded to a raster buffer.
    #[error("unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// A segment or total duration is non-positive or too short to render.
    #[error("invalid segment duration: {0}")]
    InvalidSegmentDuration(String),

    /// Narration and music cannot be merged into one track.
    #[error("incompatible audio format: {0}")]
    IncompatibleAudioFormat(String),

    /// A segment exceeded its wall-clock render bound.
    #[error("segment {segment} (image {image}) render timed out after {elapsed_ms} ms (limit {limit_ms} ms)")]
    SegmentRenderTimeout {
        /// Segment index in plan order.
        segment: usize,
        /// Source image index of the segment.
        image: usize,
        /// Time spent before the render was aborted.
        elapsed_ms: u128,
        /// Configured limit.
        limit_ms: u128,
    },

    /// Invalid configuration or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failures while encoding or writing the output asset.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HerodoError {
    /// Build a [`HerodoError::NoVisualContent`] value.
    pub fn no_visual_content(msg: impl Into<String>) -> Self {
        Self::NoVisualContent(msg.into())
    }

    /// Build a [`HerodoError::UnsupportedImageFormat`] value.
    pub fn unsupported_image(msg: impl Into<String>) -> Self {
        Self::UnsupportedImageFormat(msg.into())
    }

    /// Build a [`HerodoError::InvalidSegmentDuration`] value.
    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidSegmentDuration(msg.into())
    }

    /// Build a [`HerodoError::IncompatibleAudioFormat`] value.
    pub fn incompatible_audio(msg: impl Into<String>) -> Self {
        Self::IncompatibleAudioFormat(msg.into())
    }

    /// Build a [`HerodoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`HerodoError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Prefix the message with the segment it came from.
    ///
    /// Timeouts already carry their segment and pass through unchanged.
    pub fn in_segment(self, segment: usize, image: usize) -> Self {
        let ctx = |msg: String| format!("segment {segment} (image {image}): {msg}");
        match self {
            Self::NoVisualContent(m) => Self::NoVisualContent(ctx(m)),
            Self::UnsupportedImageFormat(m) => Self::UnsupportedImageFormat(ctx(m)),
            Self::InvalidSegmentDuration(m) => Self::InvalidSegmentDuration(ctx(m)),
            Self::IncompatibleAudioFormat(m) => Self::IncompatibleAudioFormat(ctx(m)),
            Self::Validation(m) => Self::Validation(ctx(m)),
            Self::Encode(m) => Self::Encode(ctx(m)),
            Self::Other(e) => Self::Other(e.context(format!("segment {segment} (image {image})"))),
            timeout @ Self::SegmentRenderTimeout { .. } => timeout,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
