//! Engine behaviour against scripted fake ports
//!
//! The fakes write real files into a temporary directory so that output
//! verification and rollback are exercised end to end without ffmpeg.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use media_toolkit::adapters::{LocalFsAdapter, ZipArchiveAdapter};
use media_toolkit::app::{
    AppContainer, CompressRequest, DefaultAppContainer, Operation, OperationDispatcher,
    OperationResult, SplitRequest,
};
use media_toolkit::config_initialization::ToolkitConfig;
use media_toolkit::domain::errors::{DomainError, ErrorClass};
use media_toolkit::domain::model::*;
use media_toolkit::engine::reencode::NULL_SINK;
use media_toolkit::engine::{EngineSettings, MediaEngine};
use media_toolkit::output::{OperationId, OutputLayout};
use media_toolkit::ports::{ProbePort, TranscodePort};

const MB: u64 = 1024 * 1024;

// Test utilities

/// What the fake transcoder does for one invocation
#[derive(Debug, Clone, Copy)]
struct Step {
    exit: ExitInfo,
    /// Bytes written to the output target, if any
    write: Option<usize>,
}

impl Step {
    fn ok(bytes: usize) -> Self {
        Self { exit: ExitInfo::Code(0), write: Some(bytes) }
    }

    fn ok_without_output() -> Self {
        Self { exit: ExitInfo::Code(0), write: None }
    }

    fn fail() -> Self {
        Self { exit: ExitInfo::Code(1), write: None }
    }

    fn fail_with_partial(bytes: usize) -> Self {
        Self { exit: ExitInfo::Code(1), write: Some(bytes) }
    }

    fn timeout() -> Self {
        Self { exit: ExitInfo::TimedOut(Duration::from_secs(600)), write: None }
    }
}

struct FakeTranscoder {
    available: bool,
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Invocation>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTranscoder {
    fn new(script: Vec<Step>) -> Self {
        Self {
            available: true,
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn unavailable() -> Self {
        Self { available: false, ..Self::new(Vec::new()) }
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscodePort for FakeTranscoder {
    async fn invoke(&self, invocation: &Invocation) -> Result<EncodeOutcome, DomainError> {
        self.calls.lock().unwrap().push(invocation.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::ok(5000));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(bytes) = step.write {
            if invocation.flag_value("-pass") == Some("1") {
                let passlog = invocation.flag_value("-passlogfile").unwrap();
                fs::write(format!("{}-0.log", passlog), b"stats").unwrap();
            } else {
                let target = invocation.output_target().unwrap();
                fs::write(target, vec![0u8; bytes]).unwrap();
            }
        }

        Ok(EncodeOutcome::from_exit(step.exit, String::new(), "encoder said no".to_string()))
    }

    async fn is_available(&self) -> bool {
        self.available
    }
}

struct FakeProbe {
    descriptor: MediaDescriptor,
    failure: Option<DomainError>,
    full_probes: AtomicUsize,
}

impl FakeProbe {
    fn with_duration(duration_seconds: f64) -> Self {
        Self {
            descriptor: MediaDescriptor {
                duration_seconds,
                size_bytes: 100 * MB,
                video_codec: "h264".to_string(),
                audio_codec: Some("aac".to_string()),
                has_audio: true,
                width: 1920,
                height: 1080,
            },
            failure: None,
            full_probes: AtomicUsize::new(0),
        }
    }

    fn failing(failure: DomainError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::with_duration(600.0)
        }
    }
}

#[async_trait]
impl ProbePort for FakeProbe {
    async fn probe(&self, _path: &Path) -> Result<MediaDescriptor, DomainError> {
        self.full_probes.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(self.descriptor.clone()),
        }
    }

    async fn probe_duration(&self, _path: &Path) -> Result<f64, DomainError> {
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(self.descriptor.duration_seconds),
        }
    }

    async fn is_available(&self) -> bool {
        !matches!(self.failure, Some(DomainError::ToolUnavailable { .. }))
    }
}

struct Fixture {
    dir: TempDir,
    source: PathBuf,
    transcoder: Arc<FakeTranscoder>,
    engine: MediaEngine,
}

impl Fixture {
    fn new(duration: f64, script: Vec<Step>) -> Self {
        Self::with_transcoder(duration, FakeTranscoder::new(script))
    }

    fn with_transcoder(duration: f64, transcoder: FakeTranscoder) -> Self {
        Self::build(FakeProbe::with_duration(duration), transcoder)
    }

    fn with_probe(probe: FakeProbe) -> Self {
        Self::build(probe, FakeTranscoder::new(Vec::new()))
    }

    fn build(probe: FakeProbe, transcoder: FakeTranscoder) -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("clip.mp4");
        let file = fs::File::create(&source).unwrap();
        file.set_len(100 * MB).unwrap();

        let work_dir = dir.path().join("work");
        fs::create_dir_all(&work_dir).unwrap();
        let settings = EngineSettings {
            work_dir,
            ..EngineSettings::default()
        };

        let transcoder = Arc::new(transcoder);
        let engine = MediaEngine::new(
            Arc::new(probe),
            Arc::clone(&transcoder) as Arc<dyn TranscodePort>,
            Arc::new(LocalFsAdapter::new()),
            settings,
        );

        Self { dir, source, transcoder, engine }
    }

    fn layout(&self) -> OutputLayout {
        OutputLayout::new(self.dir.path().join("out"), OperationId::generate())
    }

    fn outputs(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.dir.path().join("out")) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn work_entries(&self) -> usize {
        fs::read_dir(self.dir.path().join("work")).unwrap().count()
    }
}

// Split tests

#[tokio::test]
async fn test_split_produces_every_part_with_stream_copy() {
    let fx = Fixture::new(600.0, Vec::new());
    let layout = fx.layout();

    let segments = fx.engine.split(&fx.source, 3, &layout).await.unwrap();

    assert_eq!(segments.len(), 3);
    for (i, segment) in segments.iter().enumerate() {
        assert_eq!(segment.index, i + 1);
        assert!(segment.path.exists());
        assert_eq!(segment.path, layout.segment_path(&fx.source, i + 1));
    }

    let calls = fx.transcoder.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.flag_value("-c") == Some("copy")));
    assert_eq!(calls[1].flag_value("-ss"), Some("200.000"));
    assert_eq!(calls[2].flag_value("-t"), Some("200.000"));
}

#[tokio::test]
async fn test_tiny_stream_copy_output_falls_back_to_reencode() {
    let fx = Fixture::new(60.0, vec![Step::ok(500), Step::ok(5000)]);
    let layout = fx.layout();

    let segments = fx.engine.split(&fx.source, 2, &layout).await.unwrap();
    assert_eq!(segments.len(), 2);

    let calls = fx.transcoder.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].flag_value("-c"), Some("copy"));
    assert_eq!(calls[1].flag_value("-c:v"), Some("libx264"));
    assert_eq!(calls[1].flag_value("-crf"), Some("23"));
    assert_eq!(calls[1].flag_value("-b:a"), Some("128k"));
    assert_eq!(calls[1].output_target(), calls[0].output_target());
    assert_eq!(fs::metadata(&segments[0].path).unwrap().len(), 5000);
}

#[tokio::test]
async fn test_failed_middle_segment_rolls_back_earlier_parts() {
    let fx = Fixture::new(500.0, vec![Step::ok(5000), Step::ok(5000), Step::fail(), Step::fail()]);
    let layout = fx.layout();

    let err = fx.engine.split(&fx.source, 5, &layout).await.unwrap_err();

    assert!(matches!(err, DomainError::ExtractionFailed { index: 3, timed_out: false }));
    assert_eq!(err.to_string(), "Failed to split video at part 3");
    assert!(fx.outputs().is_empty(), "left behind: {:?}", fx.outputs());
    // Parts 4 and 5 were never attempted
    assert_eq!(fx.transcoder.calls().len(), 4);
}

#[tokio::test]
async fn test_partial_output_of_failed_attempt_is_removed() {
    let fx = Fixture::new(10.0, vec![Step::fail_with_partial(20_000), Step::fail_with_partial(300)]);
    let layout = fx.layout();

    let err = fx.engine.split(&fx.source, 2, &layout).await.unwrap_err();
    assert!(matches!(err, DomainError::ExtractionFailed { index: 1, .. }));
    assert!(fx.outputs().is_empty());
}

#[tokio::test]
async fn test_segment_timeouts_are_retryable() {
    let fx = Fixture::new(120.0, vec![Step::timeout(), Step::timeout()]);
    let err = fx.engine.split(&fx.source, 4, &fx.layout()).await.unwrap_err();

    assert!(matches!(err, DomainError::ExtractionFailed { index: 1, timed_out: true }));
    assert_eq!(err.class(), ErrorClass::Retryable);
}

#[tokio::test]
async fn test_split_refuses_when_transcoder_missing() {
    let fx = Fixture::with_transcoder(60.0, FakeTranscoder::unavailable());
    let err = fx.engine.split(&fx.source, 2, &fx.layout()).await.unwrap_err();

    assert!(matches!(err, DomainError::ToolUnavailable { ref tool } if tool == "ffmpeg"));
    assert_eq!(err.class(), ErrorClass::ServiceUnavailable);
    assert!(fx.transcoder.calls().is_empty());
}

#[tokio::test]
async fn test_zero_duration_media_is_invalid_input() {
    let fx = Fixture::new(0.0, Vec::new());
    let err = fx.engine.split(&fx.source, 2, &fx.layout()).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert!(fx.transcoder.calls().is_empty());
}

#[tokio::test]
async fn test_missing_source_is_invalid_input() {
    let fx = Fixture::new(60.0, Vec::new());
    let missing = fx.dir.path().join("nope.mp4");
    let err = fx.engine.split(&missing, 2, &fx.layout()).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[tokio::test]
async fn test_preview_split_touches_nothing() {
    let fx = Fixture::new(3725.0, Vec::new());
    let preview = fx.engine.preview_split(&fx.source, 2).await.unwrap();

    assert_eq!(preview.total_duration_formatted, "1:02:05");
    assert_eq!(preview.parts[0].end_formatted, "31:02");
    assert!(fx.transcoder.calls().is_empty());
    assert!(fx.outputs().is_empty());
}

// Compression tests

#[tokio::test]
async fn test_quality_compression_single_pass() {
    let fx = Fixture::new(600.0, vec![Step::ok(40_000)]);
    let layout = fx.layout();
    let request = CompressionRequest::Quality { preset: QualityPreset::Medium };

    let artifact = fx.engine.compress(&fx.source, &request, &layout).await.unwrap();

    assert_eq!(artifact.path, layout.compressed_path(&fx.source));
    assert_eq!(artifact.size_bytes, 40_000);
    let calls = fx.transcoder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].flag_value("-crf"), Some("23"));
    assert!(!calls[0].has_flag("-vf"));
    assert_eq!(calls[0].timeout, Duration::from_secs(3600));
}

#[tokio::test]
async fn test_resolution_compression_scales_and_applies_crf() {
    let fx = Fixture::new(600.0, vec![Step::ok(40_000)]);
    let request = CompressionRequest::Resolution {
        preset: QualityPreset::Low,
        height: TargetHeight::P480,
    };

    fx.engine.compress(&fx.source, &request, &fx.layout()).await.unwrap();

    let calls = fx.transcoder.calls();
    assert_eq!(calls[0].flag_value("-vf"), Some("scale=-2:480"));
    assert_eq!(calls[0].flag_value("-crf"), Some("28"));
}

#[tokio::test]
async fn test_target_size_runs_two_passes() {
    let fx = Fixture::new(600.0, vec![Step::ok(0), Step::ok(90_000)]);
    let layout = fx.layout();
    let request = CompressionRequest::target_size(100.0).unwrap();

    let artifact = fx.engine.compress(&fx.source, &request, &layout).await.unwrap();
    assert_eq!(artifact.size_bytes, 90_000);

    let calls = fx.transcoder.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].flag_value("-pass"), Some("1"));
    assert_eq!(calls[0].flag_value("-b:v"), Some("1237k"));
    assert!(calls[0].has_flag("-an"));
    assert_eq!(calls[0].output_target(), Some(NULL_SINK));
    assert_eq!(calls[1].flag_value("-pass"), Some("2"));
    assert_eq!(calls[1].flag_value("-passlogfile"), calls[0].flag_value("-passlogfile"));
    assert_eq!(
        calls[1].output_target().map(PathBuf::from),
        Some(layout.compressed_path(&fx.source))
    );

    let passlog = calls[0].flag_value("-passlogfile").unwrap();
    assert!(Path::new(passlog).starts_with(fx.dir.path().join("work")));
    // Scratch directory is gone once the encode finishes
    assert_eq!(fx.work_entries(), 0);
}

#[tokio::test]
async fn test_failed_first_pass_skips_second() {
    let fx = Fixture::new(600.0, vec![Step::fail()]);
    let request = CompressionRequest::target_size(100.0).unwrap();

    let err = fx.engine.compress(&fx.source, &request, &fx.layout()).await.unwrap_err();

    assert!(matches!(err, DomainError::CompressionFailed { timed_out: false, .. }));
    assert_eq!(fx.transcoder.calls().len(), 1);
    assert!(fx.outputs().is_empty());
    assert_eq!(fx.work_entries(), 0);
}

#[tokio::test]
async fn test_first_pass_without_stats_log_skips_second() {
    let fx = Fixture::new(600.0, vec![Step::ok_without_output()]);
    let request = CompressionRequest::target_size(100.0).unwrap();

    let err = fx.engine.compress(&fx.source, &request, &fx.layout()).await.unwrap_err();

    assert!(matches!(err, DomainError::CompressionFailed { .. }));
    assert_eq!(fx.transcoder.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_second_pass_deletes_partial_output() {
    let fx = Fixture::new(600.0, vec![Step::ok(0), Step::fail_with_partial(70_000)]);
    let request = CompressionRequest::target_size(100.0).unwrap();

    let err = fx.engine.compress(&fx.source, &request, &fx.layout()).await.unwrap_err();

    assert!(matches!(err, DomainError::CompressionFailed { .. }));
    assert_eq!(fx.transcoder.calls().len(), 2);
    assert!(fx.outputs().is_empty());
}

#[tokio::test]
async fn test_compression_without_output_fails() {
    let fx = Fixture::new(600.0, vec![Step::ok_without_output()]);
    let request = CompressionRequest::Quality { preset: QualityPreset::High };
    let err = fx.engine.compress(&fx.source, &request, &fx.layout()).await.unwrap_err();
    assert!(matches!(err, DomainError::CompressionFailed { timed_out: false, .. }));
}

#[tokio::test]
async fn test_compression_timeout_is_retryable() {
    let fx = Fixture::new(600.0, vec![Step::timeout()]);
    let request = CompressionRequest::Quality { preset: QualityPreset::Low };
    let err = fx.engine.compress(&fx.source, &request, &fx.layout()).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Retryable);
}

#[tokio::test]
async fn test_target_too_small_never_invokes_encoder() {
    let fx = Fixture::new(600.0, Vec::new());
    let request = CompressionRequest::target_size(10.0).unwrap();

    let err = fx.engine.compress(&fx.source, &request, &fx.layout()).await.unwrap_err();

    assert!(matches!(err, DomainError::TargetTooSmall { floor_kbps: 100, .. }));
    assert_eq!(err.class(), ErrorClass::RejectedRequest);
    assert!(fx.transcoder.calls().is_empty());
}

// Estimation tests

#[tokio::test]
async fn test_estimate_quality_medium() {
    let fx = Fixture::new(600.0, Vec::new());
    let request = CompressionRequest::Quality { preset: QualityPreset::Medium };

    let estimate = fx.engine.estimate(&fx.source, &request).await.unwrap();

    assert_eq!(estimate.original_size_mb, 100.0);
    assert_eq!(estimate.estimated_size_mb, 50.0);
    assert_eq!(estimate.reduction_percent, 50.0);
    assert!(fx.transcoder.calls().is_empty());
}

#[tokio::test]
async fn test_estimate_resolution_uses_probed_height() {
    let fx = Fixture::new(600.0, Vec::new());
    let request = CompressionRequest::Resolution {
        preset: QualityPreset::Medium,
        height: TargetHeight::P720,
    };

    let first = fx.engine.estimate(&fx.source, &request).await.unwrap();
    let second = fx.engine.estimate(&fx.source, &request).await.unwrap();

    // (720 / 1080)^2 * 0.5 * 100 MB
    assert_eq!(first.estimated_size_mb, 22.22);
    assert_eq!(first.reduction_percent, 77.8);
    assert_eq!(first, second);
    assert!(fx.transcoder.calls().is_empty());
}

#[tokio::test]
async fn test_estimate_quality_without_prober_is_unavailable() {
    let fx = Fixture::with_probe(FakeProbe::failing(DomainError::ToolUnavailable {
        tool: "ffprobe".to_string(),
    }));
    let request = CompressionRequest::Quality { preset: QualityPreset::Low };

    let err = fx.engine.estimate(&fx.source, &request).await.unwrap_err();

    assert!(matches!(err, DomainError::ToolUnavailable { .. }));
    assert_eq!(err.class(), ErrorClass::ServiceUnavailable);
}

#[tokio::test]
async fn test_estimate_resolution_on_unreadable_media_fails() {
    let fx = Fixture::with_probe(FakeProbe::failing(DomainError::ProbeFailed {
        reason: "no streams".to_string(),
        timed_out: false,
    }));
    let request = CompressionRequest::Resolution {
        preset: QualityPreset::Medium,
        height: TargetHeight::P720,
    };

    let err = fx.engine.estimate(&fx.source, &request).await.unwrap_err();

    assert!(matches!(err, DomainError::ProbeFailed { .. }));
}

#[tokio::test]
async fn test_estimate_target_size_probes_first() {
    let fx = Fixture::with_probe(FakeProbe::failing(DomainError::ToolUnavailable {
        tool: "ffprobe".to_string(),
    }));
    let request = CompressionRequest::TargetSize { target_size_mb: 25.0 };

    let result = fx.engine.estimate(&fx.source, &request).await;

    assert!(matches!(result, Err(DomainError::ToolUnavailable { .. })));
}

#[tokio::test]
async fn test_estimate_resolution_unknown_height_uses_flat_ratio() {
    let mut probe = FakeProbe::with_duration(600.0);
    probe.descriptor.width = 0;
    probe.descriptor.height = 0;
    let fx = Fixture::with_probe(probe);
    let request = CompressionRequest::Resolution {
        preset: QualityPreset::Low,
        height: TargetHeight::P720,
    };

    let estimate = fx.engine.estimate(&fx.source, &request).await.unwrap();

    assert_eq!(estimate.estimated_size_mb, 50.0);
}

#[tokio::test]
async fn test_estimate_uses_file_size_when_container_reports_none() {
    let mut probe = FakeProbe::with_duration(600.0);
    probe.descriptor.size_bytes = 0;
    let fx = Fixture::with_probe(probe);
    let request = CompressionRequest::Quality { preset: QualityPreset::Medium };

    let estimate = fx.engine.estimate(&fx.source, &request).await.unwrap();

    assert_eq!(estimate.original_size_mb, 100.0);
}

// Application layer tests

fn container_config(dir: &Path) -> ToolkitConfig {
    ToolkitConfig {
        output_dir: dir.join("out"),
        work_dir: dir.join("work"),
        ..ToolkitConfig::default()
    }
}

fn fake_container(dir: &Path, transcoder: Arc<FakeTranscoder>) -> Arc<dyn AppContainer> {
    Arc::new(DefaultAppContainer::with_ports(
        &container_config(dir),
        Arc::new(FakeProbe::with_duration(600.0)),
        transcoder,
        Arc::new(LocalFsAdapter::new()),
        Arc::new(ZipArchiveAdapter::new()),
    ))
}

#[tokio::test]
async fn test_split_with_archive_leaves_only_the_zip() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("talk.mov");
    fs::write(&source, vec![0u8; 4096]).unwrap();
    let container = fake_container(dir.path(), Arc::new(FakeTranscoder::new(Vec::new())));

    let response = container
        .split_interactor()
        .execute(SplitRequest { input: source, parts: 4, archive: true })
        .await
        .unwrap();

    assert_eq!(response.num_parts, 4);
    assert!(response.segments.is_empty());
    let archive = response.archive.unwrap();
    assert_eq!(
        archive.file_name().unwrap().to_string_lossy(),
        format!("{}_talk_split.zip", response.op_id)
    );

    let remaining: Vec<PathBuf> = fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(remaining, vec![archive.clone()]);

    let zip = zip::ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
    assert_eq!(zip.len(), 4);
}

#[tokio::test]
async fn test_compress_reports_sizes_with_a_single_duration_probe() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("clip.mp4");
    fs::write(&source, vec![0u8; 40_000]).unwrap();
    let probe = Arc::new(FakeProbe::with_duration(600.0));
    let container = DefaultAppContainer::with_ports(
        &container_config(dir.path()),
        Arc::clone(&probe) as Arc<dyn ProbePort>,
        Arc::new(FakeTranscoder::new(vec![Step::ok(10_000)])),
        Arc::new(LocalFsAdapter::new()),
        Arc::new(ZipArchiveAdapter::new()),
    );

    let response = container
        .compress_interactor()
        .execute(CompressRequest {
            input: source,
            request: CompressionRequest::Quality { preset: QualityPreset::Medium },
        })
        .await
        .unwrap();

    assert_eq!(response.original_size, 40_000);
    assert_eq!(response.compressed_size, 10_000);
    assert_eq!(response.reduction_percent, 75.0);
    assert_eq!(probe.full_probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_dispatcher_bounds_concurrent_operations() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("clip.mp4");
    fs::write(&source, vec![0u8; 4096]).unwrap();

    let transcoder = Arc::new(FakeTranscoder {
        delay: Duration::from_millis(50),
        ..FakeTranscoder::new(Vec::new())
    });
    let dispatcher = OperationDispatcher::new(fake_container(dir.path(), Arc::clone(&transcoder)), 2);

    let handles: Vec<_> = (0..6)
        .map(|_| {
            dispatcher.submit(Operation::Compress(CompressRequest {
                input: source.clone(),
                request: CompressionRequest::Quality { preset: QualityPreset::Medium },
            }))
        })
        .collect();

    let mut outputs = Vec::new();
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            OperationResult::Compress(response) => outputs.push(response.output),
            other => panic!("unexpected result {:?}", other),
        }
    }

    outputs.sort();
    outputs.dedup();
    assert_eq!(outputs.len(), 6, "operations must not share output paths");
    assert!(transcoder.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert_eq!(dispatcher.available_permits(), 2);
}

#[tokio::test]
async fn test_closed_dispatcher_rejects_work() {
    let dir = TempDir::new().unwrap();
    let dispatcher =
        OperationDispatcher::new(fake_container(dir.path(), Arc::new(FakeTranscoder::new(Vec::new()))), 1);
    dispatcher.close();

    let result = dispatcher
        .submit(Operation::Inspect(dir.path().join("any.mp4")))
        .await
        .unwrap();
    let err = result.unwrap_err();
    assert!(matches!(err, DomainError::Closed));
    assert_eq!(err.class(), ErrorClass::ServiceUnavailable);
}
