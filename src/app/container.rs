use std::sync::Arc;

use crate::adapters::{
    resolve_tool, FfmpegAdapter, FfprobeAdapter, LocalFsAdapter, TokioProcessRunner,
    ZipArchiveAdapter,
};
use crate::app::{
    compress_interactor::CompressInteractor, inspect_interactor::InspectInteractor,
    split_interactor::SplitInteractor,
};
use crate::config_initialization::ToolkitConfig;
use crate::engine::{EngineSettings, MediaEngine};
use crate::ports::{ArchivePort, FsPort, ProbePort, ProcessRunner, TranscodePort};

pub trait AppContainer: Send + Sync {
    fn split_interactor(&self) -> Arc<SplitInteractor>;
    fn compress_interactor(&self) -> Arc<CompressInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    split_interactor: Arc<SplitInteractor>,
    compress_interactor: Arc<CompressInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire the production adapters for `config`
    pub fn new(config: &ToolkitConfig) -> Self {
        let timeouts = &config.timeouts;
        let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new());

        let probe_port = Arc::new(FfprobeAdapter::new(
            Arc::clone(&runner),
            resolve_tool(config.ffprobe_path.as_deref(), "ffprobe"),
            timeouts.probe(),
            timeouts.capability(),
        ));
        let transcode_port = Arc::new(FfmpegAdapter::new(
            Arc::clone(&runner),
            resolve_tool(config.ffmpeg_path.as_deref(), "ffmpeg"),
            timeouts.capability(),
        ));

        Self::with_ports(
            config,
            probe_port,
            transcode_port,
            Arc::new(LocalFsAdapter::new()),
            Arc::new(ZipArchiveAdapter::new()),
        )
    }

    /// Wire interactors around arbitrary port implementations
    pub fn with_ports(
        config: &ToolkitConfig,
        probe_port: Arc<dyn ProbePort>,
        transcode_port: Arc<dyn TranscodePort>,
        fs_port: Arc<dyn FsPort>,
        archive_port: Arc<dyn ArchivePort>,
    ) -> Self {
        let engine = Arc::new(MediaEngine::new(
            probe_port,
            transcode_port,
            Arc::clone(&fs_port),
            EngineSettings::from(config),
        ));

        let split_interactor = Arc::new(SplitInteractor::new(
            Arc::clone(&engine),
            archive_port,
            fs_port,
            config.output_dir.clone(),
        ));
        let compress_interactor = Arc::new(CompressInteractor::new(
            Arc::clone(&engine),
            config.output_dir.clone(),
        ));
        let inspect_interactor = Arc::new(InspectInteractor::new(engine));

        Self {
            split_interactor,
            compress_interactor,
            inspect_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn split_interactor(&self) -> Arc<SplitInteractor> {
        Arc::clone(&self.split_interactor)
    }

    fn compress_interactor(&self) -> Arc<CompressInteractor> {
        Arc::clone(&self.compress_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
