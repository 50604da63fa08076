//! Command implementations

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::app::{
    AppContainer, CompressRequest, DefaultAppContainer, Operation, OperationDispatcher,
    OperationResult, SplitRequest,
};
use crate::cli::args::{CompressArgs, InfoArgs, SplitArgs, SplitPreviewArgs};
use crate::config_initialization::ToolkitConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{MediaSummary, SizeEstimate, SplitPreview, ToolStatus};
use crate::utils::format_file_size;

/// Everything a command needs to run
pub struct CommandContext {
    container: Arc<dyn AppContainer>,
    dispatcher: OperationDispatcher,
    json: bool,
}

impl CommandContext {
    pub fn new(config: &ToolkitConfig, json: bool) -> Self {
        let container: Arc<dyn AppContainer> = Arc::new(DefaultAppContainer::new(config));
        let dispatcher =
            OperationDispatcher::new(Arc::clone(&container), config.max_concurrent_operations);
        Self {
            container,
            dispatcher,
            json,
        }
    }

    async fn dispatch(&self, operation: Operation) -> Result<OperationResult> {
        let name = operation.name();
        let result = self
            .dispatcher
            .submit(operation)
            .await
            .with_context(|| format!("{} task did not complete", name))??;
        Ok(result)
    }

    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(value).context("Failed to serialize output")?
            );
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

/// Execute the check command
pub async fn check(ctx: &CommandContext) -> Result<()> {
    let status = ctx.container.inspect_interactor().check_tools().await;
    ctx.print(&status, || render_tool_status(&status))?;

    match status.first_missing() {
        Some(tool) => Err(DomainError::ToolUnavailable {
            tool: tool.name().to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Execute the info command
pub async fn info(ctx: &CommandContext, args: InfoArgs) -> Result<()> {
    let result = ctx.dispatch(Operation::Inspect(args.input.clone())).await?;
    let OperationResult::Inspect(report) = result else {
        anyhow::bail!("unexpected result for inspect");
    };

    ctx.print(&report, || match &report.summary {
        Some(summary) => render_summary(summary),
        None => String::new(),
    })?;

    if report.valid {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "{} is not a valid video file",
            args.input.display()
        ))
        .into())
    }
}

/// Execute the split-preview command
pub async fn split_preview(ctx: &CommandContext, args: SplitPreviewArgs) -> Result<()> {
    let preview = ctx
        .container
        .inspect_interactor()
        .preview_split(&args.input, args.parts)
        .await
        .context("Failed to preview split")?;
    ctx.print(&preview, || render_preview(&preview))
}

/// Execute the split command
pub async fn split(ctx: &CommandContext, args: SplitArgs) -> Result<()> {
    info!("Splitting {} into {} parts", args.input.display(), args.parts);
    let request = SplitRequest {
        input: args.input,
        parts: args.parts,
        archive: args.zip,
    };
    let result = ctx.dispatch(Operation::Split(request)).await?;
    let OperationResult::Split(response) = &result else {
        anyhow::bail!("unexpected result for split");
    };

    ctx.print(response, || {
        let mut out = String::new();
        let _ = writeln!(out, "Split into {} parts", response.num_parts);
        for segment in &response.segments {
            let _ = writeln!(out, "  part {}: {}", segment.index, segment.path.display());
        }
        if let Some(archive) = &response.archive {
            let _ = writeln!(out, "  archive: {}", archive.display());
        }
        out
    })
}

/// Execute the compress command
pub async fn compress(ctx: &CommandContext, args: CompressArgs) -> Result<()> {
    let request = CompressRequest {
        request: args.to_request()?,
        input: args.input,
    };
    let result = ctx.dispatch(Operation::Compress(request)).await?;
    let OperationResult::Compress(response) = &result else {
        anyhow::bail!("unexpected result for compress");
    };

    ctx.print(response, || {
        format!(
            "Compressed to {}\n  {} -> {} ({:.1}% smaller)\n",
            response.output.display(),
            format_file_size(response.original_size),
            format_file_size(response.compressed_size),
            response.reduction_percent
        )
    })
}

/// Execute the estimate command
pub async fn estimate(ctx: &CommandContext, args: CompressArgs) -> Result<()> {
    let request = CompressRequest {
        request: args.to_request()?,
        input: args.input,
    };
    let result = ctx.dispatch(Operation::Estimate(request)).await?;
    let OperationResult::Estimate(estimate) = &result else {
        anyhow::bail!("unexpected result for estimate");
    };
    ctx.print(estimate, || render_estimate(estimate))
}

fn render_tool_status(status: &ToolStatus) -> String {
    let mark = |ok: bool| if ok { "available" } else { "missing" };
    format!(
        "ffmpeg:  {}\nffprobe: {}\n",
        mark(status.ffmpeg),
        mark(status.ffprobe)
    )
}

fn render_summary(summary: &MediaSummary) -> String {
    format!(
        "File:       {}\nDuration:   {} ({:.2}s)\nSize:       {}\nCodec:      {}\nResolution: {}\n",
        summary.filename,
        summary.duration_formatted,
        summary.duration,
        format_file_size(summary.size),
        summary.video_codec,
        summary.resolution
    )
}

fn render_preview(preview: &SplitPreview) -> String {
    let mut out = format!(
        "Total duration {} in {} parts\n",
        preview.total_duration_formatted, preview.num_parts
    );
    for part in &preview.parts {
        let _ = writeln!(
            out,
            "  part {:>2}: {} - {} ({})",
            part.part, part.start_formatted, part.end_formatted, part.duration_formatted
        );
    }
    out
}

fn render_estimate(estimate: &SizeEstimate) -> String {
    format!(
        "Original:  {:.2} MB\nEstimated: {:.2} MB ({:.1}% smaller, approximate)\n",
        estimate.original_size_mb, estimate.estimated_size_mb, estimate.reduction_percent
    )
}
