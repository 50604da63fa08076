// Adapters - External system implementations

pub mod archive_zip;
pub mod exec_ffmpeg;
pub mod fs_local;
pub mod probe_ffprobe;
pub mod process_tokio;
pub mod toml_config;

// Re-export adapters
pub use archive_zip::ZipArchiveAdapter;
pub use exec_ffmpeg::FfmpegAdapter;
pub use fs_local::LocalFsAdapter;
pub use probe_ffprobe::FfprobeAdapter;
pub use process_tokio::{resolve_tool, TokioProcessRunner};
pub use toml_config::TomlConfigAdapter;
