use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hexfield::{render_still, FrameParams, ImageSampler};
use image::ImageFormat;

use crate::control::TransitionControl;
use crate::sources::load_source_or_placeholder;
use crate::types::RendererConfig;

/// Renders one frame with the CPU pipeline and writes it as PNG.
///
/// Needs neither a GPU nor a display, so it also serves headless previews.
pub fn export_still(config: &RendererConfig, time: f32, path: &Path) -> Result<PathBuf> {
    let (width, height) = config.surface_size;
    if width == 0 || height == 0 {
        anyhow::bail!("export size must be non-zero, got {width}x{height}");
    }

    let from = ImageSampler::new(&load_source_or_placeholder("from", &config.sources.from));
    let to = ImageSampler::new(&load_source_or_placeholder("to", &config.sources.to));
    let progress = TransitionControl::new(config.initial_progress, config.progress_step).value();
    let params = FrameParams::for_viewport(width, height)
        .with_time(time)
        .with_transition(progress);

    tracing::info!(
        width,
        height,
        time,
        progress,
        path = %path.display(),
        "rendering still frame"
    );
    let frame = render_still(width, height, &params, &from, &to);
    frame
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to write still frame to {}", path.display()))?;
    Ok(path.to_path_buf())
}
