//! mtk - split and compress videos with ffmpeg
//!
//! # Usage
//!
//! ```bash
//! mtk check
//! mtk info --input talk.mp4
//! mtk split --input talk.mp4 --parts 4 --zip
//! mtk compress --input talk.mp4 --mode target-size --target-size-mb 50
//! mtk estimate --input talk.mp4 --mode resolution --resolution 720p --preset high
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use media_toolkit::adapters::TomlConfigAdapter;
use media_toolkit::cli::commands::{self, CommandContext};
use media_toolkit::cli::{Cli, Commands};
use media_toolkit::config_initialization::{initialize_configuration_hierarchy, ConfigOverrides};
use media_toolkit::utils::logging::init_logging;
use media_toolkit::DomainError;

/// Main entry point for the mtk CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.downcast_ref::<DomainError>() {
                Some(domain) => {
                    eprintln!("Error: {}", domain.user_message());
                    domain.class().exit_code()
                }
                None => {
                    eprintln!("Error: {:#}", err);
                    1
                }
            };
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = ConfigOverrides {
        output_dir: cli.output_dir.clone(),
        log_level: cli.log_level.clone(),
        log_format: cli.log_format,
    };
    let config_port = TomlConfigAdapter::new(cli.config.clone());
    let config = initialize_configuration_hierarchy(&config_port, &overrides)
        .context("Failed to load configuration")?;

    init_logging(&config.log_level, config.log_format);
    debug!(?config, "Effective configuration");

    let ctx = CommandContext::new(&config, cli.json);
    match cli.command {
        Commands::Check => commands::check(&ctx).await,
        Commands::Info(args) => commands::info(&ctx, args).await,
        Commands::SplitPreview(args) => commands::split_preview(&ctx, args).await,
        Commands::Split(args) => commands::split(&ctx, args).await,
        Commands::Compress(args) => commands::compress(&ctx, args).await,
        Commands::Estimate(args) => commands::estimate(&ctx, args).await,
    }?;

    info!("Done");
    Ok(())
}
