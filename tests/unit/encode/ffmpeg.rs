use super::*;
use crate::encode::sink::AudioInputConfig;

fn args(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn cfg(audio: Option<AudioInputConfig>) -> SinkConfig {
    SinkConfig {
        width: 1080,
        height: 1920,
        fps: Fps::new(30000, 1001).unwrap(),
        audio,
    }
}

#[test]
fn video_only_command_streams_rgb24_without_audio() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("out/video.mp4"));
    let argv = args(&sink.build_command(&cfg(None)).unwrap());
    let joined = argv.join(" ");
    assert!(joined.contains("-pix_fmt rgb24 -s 1080x1920"));
    assert!(joined.contains("-r 30000/1001 -i pipe:0"));
    assert!(argv.contains(&"-an".to_string()));
    assert_eq!(argv.last().unwrap(), "out/video.mp4");
}

#[test]
fn audio_command_muxes_f32le_as_aac() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("final.mp4"));
    let audio = AudioInputConfig {
        path: PathBuf::from("mix.f32le"),
        sample_rate: 48_000,
        channels: 2,
    };
    let argv = args(&sink.build_command(&cfg(Some(audio))).unwrap());
    let joined = argv.join(" ");
    assert!(joined.contains("-f f32le -ar 48000 -ac 2 -i mix.f32le"));
    assert!(joined.contains("-c:a aac"));
    assert!(!argv.contains(&"-an".to_string()));
}

#[test]
fn zero_audio_rate_is_rejected() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("final.mp4"));
    let audio = AudioInputConfig {
        path: PathBuf::from("mix.f32le"),
        sample_rate: 0,
        channels: 2,
    };
    assert!(sink.build_command(&cfg(Some(audio))).is_err());
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
        std::env::temp_dir().join("herodo_odd.mp4"),
    ));
    let res = sink.begin(SinkConfig {
        width: 1081,
        height: 1920,
        fps: Fps::integer(30).unwrap(),
        audio: None,
    });
    assert!(matches!(res, Err(HerodoError::Validation(_))));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("never.mp4"));
    let frame = Frame {
        width: 2,
        height: 2,
        data: vec![0; 12],
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}
