// Unit tests for domain models

use super::*;
use std::time::Duration;

fn descriptor(width: u32, height: u32) -> MediaDescriptor {
    MediaDescriptor {
        duration_seconds: 125.4,
        size_bytes: 10 * 1024 * 1024,
        video_codec: "h264".to_string(),
        audio_codec: Some("aac".to_string()),
        has_audio: true,
        width,
        height,
    }
}

#[test]
fn test_time_range_rejects_inverted_bounds() {
    assert!(TimeRange::new(0.0, 10.0).is_ok());
    assert!(TimeRange::new(10.0, 10.0).is_err());
    assert!(TimeRange::new(10.0, 5.0).is_err());
    assert!(TimeRange::new(-1.0, 5.0).is_err());
    assert!(TimeRange::new(0.0, f64::NAN).is_err());
}

#[test]
fn test_time_range_duration() {
    let range = TimeRange::new(200.0, 400.0).unwrap();
    assert_eq!(range.duration(), 200.0);
}

#[test]
fn test_descriptor_resolution_label() {
    assert_eq!(descriptor(1920, 1080).resolution_label(), "1920x1080");
    assert_eq!(descriptor(0, 0).resolution_label(), "unknown");
    assert_eq!(descriptor(1920, 0).known_height(), None);
    assert_eq!(descriptor(1280, 720).known_height(), Some(720));
}

#[test]
fn test_zero_duration_is_invalid_input() {
    let mut desc = descriptor(1920, 1080);
    desc.duration_seconds = 0.0;
    assert!(matches!(
        desc.ensure_plannable(),
        Err(DomainError::InvalidInput(_))
    ));
}

#[test]
fn test_media_summary_fields() {
    let summary = MediaSummary::new(Path::new("/videos/clip.mp4"), &descriptor(640, 360));
    assert_eq!(summary.filename, "clip.mp4");
    assert_eq!(summary.duration_formatted, "2:05");
    assert_eq!(summary.resolution, "640x360");
    assert_eq!(summary.video_codec, "h264");
}

#[test]
fn test_quality_preset_parse() {
    assert_eq!("low".parse::<QualityPreset>().unwrap(), QualityPreset::Low);
    assert_eq!(" Medium ".parse::<QualityPreset>().unwrap(), QualityPreset::Medium);
    assert_eq!("HIGH".parse::<QualityPreset>().unwrap(), QualityPreset::High);
    assert!(matches!(
        "ultra".parse::<QualityPreset>(),
        Err(DomainError::InvalidInput(_))
    ));
}

#[test]
fn test_quality_preset_tables() {
    assert_eq!(QualityPreset::Low.crf(), 28);
    assert_eq!(QualityPreset::Medium.crf(), 23);
    assert_eq!(QualityPreset::High.crf(), 18);
    assert_eq!(QualityPreset::Low.size_ratio(), 0.3);
    assert_eq!(QualityPreset::Medium.size_ratio(), 0.5);
    assert_eq!(QualityPreset::High.size_ratio(), 0.7);
}

#[test]
fn test_target_height_parse() {
    assert_eq!("720p".parse::<TargetHeight>().unwrap(), TargetHeight::P720);
    assert_eq!("2160".parse::<TargetHeight>().unwrap(), TargetHeight::P2160);
    assert!("900p".parse::<TargetHeight>().is_err());
    assert!("hd".parse::<TargetHeight>().is_err());
    assert_eq!(TargetHeight::P1080.to_string(), "1080p");
}

#[test]
fn test_target_size_request_validation() {
    assert!(CompressionRequest::target_size(10.0).is_ok());
    assert!(CompressionRequest::target_size(0.0).is_err());
    assert!(CompressionRequest::target_size(-5.0).is_err());
    assert!(CompressionRequest::target_size(f64::INFINITY).is_err());
}

#[test]
fn test_invocation_builder_and_lookup() {
    let invocation = Invocation::new(Tool::Ffmpeg, Duration::from_secs(600))
        .arg("-y")
        .args(["-crf", "23"])
        .path_arg(Path::new("out.mp4"));

    assert_eq!(invocation.flag_value("-crf"), Some("23"));
    assert!(invocation.has_flag("-y"));
    assert!(!invocation.has_flag("-an"));
    assert_eq!(invocation.output_target(), Some("out.mp4"));
    assert_eq!(invocation.to_string(), "ffmpeg -y -crf 23 out.mp4");
}

#[test]
fn test_encode_outcome_success_only_on_zero_exit() {
    let ok = EncodeOutcome::from_exit(ExitInfo::Code(0), String::new(), String::new());
    assert!(ok.success);

    let failed = EncodeOutcome::from_exit(ExitInfo::Code(1), String::new(), "line one\nNo such file\n\n".into());
    assert!(!failed.success);
    assert_eq!(failed.stderr_tail(), "No such file");

    let timed_out = EncodeOutcome::from_exit(
        ExitInfo::TimedOut(Duration::from_secs(5)),
        String::new(),
        String::new(),
    );
    assert!(!timed_out.success);
    assert!(timed_out.timed_out());
}

#[test]
fn test_tool_status_first_missing() {
    let status = ToolStatus { ffmpeg: false, ffprobe: true };
    assert_eq!(status.first_missing(), Some(Tool::Ffmpeg));
    assert!(!status.all_available());

    let status = ToolStatus { ffmpeg: true, ffprobe: true };
    assert_eq!(status.first_missing(), None);
}
