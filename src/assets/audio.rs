use std::path::Path;

use crate::foundation::error::{HerodoError, HerodoResult};

/// Sample rate used for decoding, mixing and encoding.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Interleaved floating-point PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioTrack {
    pub fn new(sample_rate: u32, channels: u16, interleaved_f32: Vec<f32>) -> HerodoResult<Self> {
        let track = Self {
            sample_rate,
            channels,
            interleaved_f32,
        };
        track.validate()?;
        Ok(track)
    }

    /// A silent track of `secs` seconds.
    pub fn silence(sample_rate: u32, channels: u16, secs: f64) -> HerodoResult<Self> {
        let frames = (secs.max(0.0) * f64::from(sample_rate)).round() as usize;
        Self::new(
            sample_rate,
            channels,
            vec![0.0; frames * usize::from(channels)],
        )
    }

    pub(crate) fn validate(&self) -> HerodoResult<()> {
        if self.sample_rate == 0 {
            return Err(HerodoError::incompatible_audio("sample rate must be non-zero"));
        }
        if self.channels == 0 {
            return Err(HerodoError::incompatible_audio("channel count must be non-zero"));
        }
        if !self
            .interleaved_f32
            .len()
            .is_multiple_of(usize::from(self.channels))
        {
            return Err(HerodoError::incompatible_audio(format!(
                "{} samples do not divide into {} channels",
                self.interleaved_f32.len(),
                self.channels
            )));
        }
        Ok(())
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode any audio file `ffmpeg` understands to stereo interleaved `f32` PCM.
pub fn decode_audio(path: &Path, sample_rate: u32) -> HerodoResult<AudioTrack> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| HerodoError::encode(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(HerodoError::incompatible_audio(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(HerodoError::incompatible_audio(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let pcm = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    AudioTrack::new(sample_rate, 2, pcm)
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub(crate) fn write_f32le_file(track: &AudioTrack, out_path: &Path) -> HerodoResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            HerodoError::encode(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(track.interleaved_f32.len() * 4);
    for &sample in &track.interleaved_f32 {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        HerodoError::encode(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/audio.rs"]
mod tests;
