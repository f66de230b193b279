use std::io::{self, BufReader};

use anyhow::{Context, Result};
use renderer::{spawn_progress_reader, RenderPolicy, Renderer};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{build_renderer_config, load_scene, print_paths};
use crate::cli::{Cli, Command};
use crate::paths::AppPaths;

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let paths = AppPaths::discover()?;
    tracing::debug!(config = %paths.config_dir().display(), "resolved hexwipe paths");

    if let Some(Command::Paths) = cli.command {
        print_paths(&paths);
        return Ok(());
    }

    let args = cli.run;
    let scene = load_scene(&args, &paths)?;
    let config = build_renderer_config(&args, scene.as_ref())?;
    tracing::info!(
        from = %config.sources.from.display(),
        to = %config.sources.to.display(),
        size = ?config.surface_size,
        progress = config.initial_progress,
        "starting hexwipe"
    );

    let exporting = matches!(config.policy, RenderPolicy::Export { .. });
    let renderer = Renderer::new(config);
    if args.progress_stdin {
        if exporting {
            tracing::warn!("--progress-stdin has no effect with --export");
        } else {
            spawn_progress_reader(BufReader::new(io::stdin()), renderer.controller())
                .context("failed to start progress reader")?;
        }
    }
    renderer.run()
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
