use crate::assets::audio::AudioTrack;
use crate::foundation::config::validate_attenuation;
use crate::foundation::error::{HerodoError, HerodoResult};

/// Lay `music` under `narration`.
///
/// Without music the narration is returned unchanged. Music is converted to the narration's
/// layout, looped from its start (or trimmed) to exactly the narration's length, scaled by
/// `attenuation`, and summed. Narration samples are never rescaled; the sum is hard-clamped to
/// `[-1, 1]`, widened to the narration sample itself when that already lies outside the range.
#[tracing::instrument(skip_all, fields(
    narration_secs = narration.duration_secs(),
    music_secs = music.map(|m| m.duration_secs()),
    attenuation = attenuation
))]
pub fn mix(
    narration: &AudioTrack,
    music: Option<&AudioTrack>,
    attenuation: f32,
) -> HerodoResult<AudioTrack> {
    validate_attenuation(attenuation)?;
    narration.validate()?;
    let Some(music) = music else {
        return Ok(narration.clone());
    };
    music.validate()?;

    let conformed = conform(music, narration.sample_rate, narration.channels)?;
    let bed = loop_to_length(&conformed, narration.frames())?;
    if conformed.frames() < narration.frames() {
        tracing::debug!(
            loops = narration.frames().div_ceil(conformed.frames()),
            "looping music under narration"
        );
    }

    let interleaved_f32 = narration
        .interleaved_f32
        .iter()
        .zip(&bed.interleaved_f32)
        .map(|(&voice, &m)| add_under(voice, m * attenuation))
        .collect();

    Ok(AudioTrack {
        sample_rate: narration.sample_rate,
        channels: narration.channels,
        interleaved_f32,
    })
}

/// `voice + music`, clipped to `[-1, 1]` or to `voice` when it is out of that range.
fn add_under(voice: f32, music: f32) -> f32 {
    (voice + music).clamp(voice.min(-1.0), voice.max(1.0))
}

/// Repeat `track` from its start until it spans `frames` sample frames, then cut it there.
pub fn loop_to_length(track: &AudioTrack, frames: usize) -> HerodoResult<AudioTrack> {
    track.validate()?;
    let channels = usize::from(track.channels);
    if frames > 0 && track.frames() == 0 {
        return Err(HerodoError::incompatible_audio(
            "cannot loop an empty audio track",
        ));
    }
    let interleaved_f32 = track
        .interleaved_f32
        .iter()
        .copied()
        .cycle()
        .take(frames * channels)
        .collect();
    Ok(AudioTrack {
        sample_rate: track.sample_rate,
        channels: track.channels,
        interleaved_f32,
    })
}

/// Convert `track` to `channels` at `sample_rate`.
///
/// Supports mono/stereo up- and down-mixing and linear resampling; any other layout change is
/// rejected.
fn conform(track: &AudioTrack, sample_rate: u32, channels: u16) -> HerodoResult<AudioTrack> {
    if track.frames() == 0 {
        return Err(HerodoError::incompatible_audio("music track is empty"));
    }
    let remixed = remix_channels(track, channels)?;
    if remixed.sample_rate == sample_rate {
        return Ok(remixed);
    }
    Ok(resample_linear(&remixed, sample_rate))
}

fn remix_channels(track: &AudioTrack, channels: u16) -> HerodoResult<AudioTrack> {
    let samples = &track.interleaved_f32;
    let interleaved_f32 = match (track.channels, channels) {
        (a, b) if a == b => samples.clone(),
        (1, 2) => samples.iter().flat_map(|&s| [s, s]).collect(),
        (2, 1) => samples
            .chunks_exact(2)
            .map(|lr| (lr[0] + lr[1]) * 0.5)
            .collect(),
        (from, to) => {
            return Err(HerodoError::incompatible_audio(format!(
                "cannot convert {from}-channel music to {to}-channel narration"
            )));
        }
    };
    Ok(AudioTrack {
        sample_rate: track.sample_rate,
        channels,
        interleaved_f32,
    })
}

fn resample_linear(track: &AudioTrack, sample_rate: u32) -> AudioTrack {
    let channels = usize::from(track.channels);
    let src_frames = track.frames();
    let ratio = f64::from(track.sample_rate) / f64::from(sample_rate);
    let dst_frames = ((src_frames as f64) / ratio).round().max(1.0) as usize;
    let src = &track.interleaved_f32;

    let mut out = Vec::with_capacity(dst_frames * channels);
    for j in 0..dst_frames {
        let pos = (j as f64 * ratio).min((src_frames - 1) as f64);
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(src_frames - 1);
        let frac = (pos - i0 as f64) as f32;
        for c in 0..channels {
            let a = src[i0 * channels + c];
            let b = src[i1 * channels + c];
            out.push(a + (b - a) * frac);
        }
    }

    AudioTrack {
        sample_rate,
        channels: track.channels,
        interleaved_f32: out,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
