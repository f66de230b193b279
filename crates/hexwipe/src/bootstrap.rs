use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use renderer::{
    Antialiasing, ColorSpaceMode, RenderPolicy, RendererConfig, SourcePair, SweepCurve,
    SweepMode, SweepSettings, DEFAULT_PROGRESS_STEP,
};
use sceneconfig::{
    AntialiasSetting, ColorSpaceSetting, SceneConfig, SweepCurveSetting, SweepModeSetting,
};
use tracing::{debug, info};

use crate::cli::RunArgs;
use crate::paths::AppPaths;

const DEFAULT_SURFACE: (u32, u32) = (1280, 720);

/// Loads the scene file named by `--config`, or the default one when it
/// exists. An explicit path that cannot be read is an error.
pub fn load_scene(args: &RunArgs, paths: &AppPaths) -> Result<Option<SceneConfig>> {
    if let Some(path) = args.config.as_ref() {
        let scene = SceneConfig::load(path)
            .with_context(|| format!("failed to load scene config {}", path.display()))?;
        info!(path = %path.display(), "loaded scene config");
        return Ok(Some(scene));
    }

    let default_path = paths.config_file();
    if !default_path.is_file() {
        debug!(path = %default_path.display(), "no default scene config");
        return Ok(None);
    }
    let scene = SceneConfig::load(&default_path).with_context(|| {
        format!(
            "failed to load default scene config {}",
            default_path.display()
        )
    })?;
    info!(path = %default_path.display(), "loaded default scene config");
    Ok(Some(scene))
}

pub fn parse_surface_size(raw: &str) -> Result<(u32, u32)> {
    sceneconfig::parse_size(raw).map_err(|err| anyhow!(err))
}

/// Layers CLI flags over the scene file over built-in defaults.
pub fn build_renderer_config(args: &RunArgs, scene: Option<&SceneConfig>) -> Result<RendererConfig> {
    let defaults = RendererConfig::default();

    let sources = SourcePair {
        from: pick_source("from", args.from.as_ref(), scene.and_then(|s| s.sources.from.as_ref()))?,
        to: pick_source("to", args.to.as_ref(), scene.and_then(|s| s.sources.to.as_ref()))?,
    };

    let surface_size = match args.size.as_deref() {
        Some(raw) => parse_surface_size(raw).context("invalid --size")?,
        None => scene
            .and_then(SceneConfig::window_size)
            .unwrap_or(DEFAULT_SURFACE),
    };

    let initial_progress = args
        .progress
        .or(scene.and_then(|s| s.transition.progress))
        .unwrap_or(0.0);
    if !(0.0..=1.0).contains(&initial_progress) {
        anyhow::bail!("progress {initial_progress} must lie within [0, 1]");
    }

    let progress_step = args
        .step
        .or(scene.and_then(|s| s.transition.step))
        .unwrap_or(DEFAULT_PROGRESS_STEP);
    if !(progress_step > 0.0 && progress_step <= 1.0) {
        anyhow::bail!("step {progress_step} must lie within (0, 1]");
    }

    let time_step = args
        .time_step
        .or(scene.and_then(|s| s.clock.time_step))
        .unwrap_or(defaults.time_step);
    if !(time_step > 0.0 && time_step.is_finite()) {
        anyhow::bail!("time step {time_step} must be positive");
    }

    let fps = args.fps.or(scene.and_then(|s| s.window.fps));
    let policy = if let Some(path) = args.export.clone() {
        RenderPolicy::Export {
            time: args.time,
            path,
        }
    } else if args.still {
        RenderPolicy::Still { time: args.time }
    } else {
        RenderPolicy::Animate {
            target_fps: fps.filter(|fps| *fps > 0.0),
        }
    };

    let antialiasing = args
        .antialias
        .or_else(|| scene.and_then(|s| s.window.antialias).map(map_antialias))
        .unwrap_or(defaults.antialiasing);
    let color_space = args
        .color_space
        .or_else(|| scene.and_then(|s| s.window.color_space).map(map_color_space))
        .unwrap_or(defaults.color_space);

    Ok(RendererConfig {
        surface_size,
        sources,
        antialiasing,
        shader_compiler: args.shader_compiler,
        color_space,
        gpu_power: args.gpu_power,
        policy,
        initial_progress,
        progress_step,
        sweep: sweep_settings(args, scene),
        time_step,
    })
}

fn pick_source(role: &str, cli: Option<&PathBuf>, scene: Option<&PathBuf>) -> Result<PathBuf> {
    cli.or(scene).cloned().ok_or_else(|| {
        anyhow!("no `{role}` image given; pass --{role} or set sources.{role} in the scene config")
    })
}

/// `None` unless a sweep was asked for on the command line or in the scene.
fn sweep_settings(args: &RunArgs, scene: Option<&SceneConfig>) -> Option<SweepSettings> {
    let section = scene.map(|s| &s.sweep);
    let requested = args.sweep.is_some()
        || args.curve.is_some()
        || args.sweep_mode.is_some()
        || args.autostart
        || section.is_some_and(|s| {
            s.duration.is_some() || s.curve.is_some() || s.mode.is_some() || s.autostart
        });
    if !requested {
        return None;
    }

    let defaults = SweepSettings::default();
    Some(SweepSettings {
        duration: args
            .sweep
            .or(section.and_then(|s| s.duration))
            .unwrap_or(defaults.duration),
        curve: args
            .curve
            .or_else(|| section.and_then(|s| s.curve).map(map_curve))
            .unwrap_or(defaults.curve),
        mode: args
            .sweep_mode
            .or_else(|| section.and_then(|s| s.mode).map(map_mode))
            .unwrap_or(defaults.mode),
        autostart: args.autostart || section.is_some_and(|s| s.autostart),
    })
}

fn map_antialias(setting: AntialiasSetting) -> Antialiasing {
    match setting {
        AntialiasSetting::Auto => Antialiasing::Auto,
        AntialiasSetting::Off => Antialiasing::Off,
        AntialiasSetting::Samples2 => Antialiasing::Samples(2),
        AntialiasSetting::Samples4 => Antialiasing::Samples(4),
        AntialiasSetting::Samples8 => Antialiasing::Samples(8),
        AntialiasSetting::Samples16 => Antialiasing::Samples(16),
    }
}

fn map_color_space(setting: ColorSpaceSetting) -> ColorSpaceMode {
    match setting {
        ColorSpaceSetting::Auto => ColorSpaceMode::Auto,
        ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
        ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
    }
}

fn map_curve(setting: SweepCurveSetting) -> SweepCurve {
    match setting {
        SweepCurveSetting::Linear => SweepCurve::Linear,
        SweepCurveSetting::Smoothstep => SweepCurve::Smoothstep,
        SweepCurveSetting::EaseInOut => SweepCurve::EaseInOut,
    }
}

fn map_mode(setting: SweepModeSetting) -> SweepMode {
    match setting {
        SweepModeSetting::Once => SweepMode::Once,
        SweepModeSetting::Loop => SweepMode::Loop,
        SweepModeSetting::Pingpong => SweepMode::PingPong,
    }
}

/// Prints where hexwipe looks for its files.
pub fn print_paths(paths: &AppPaths) {
    let config_file = paths.config_file();
    println!("config dir:  {}", paths.config_dir().display());
    println!(
        "scene file:  {}{}",
        config_file.display(),
        if config_file.is_file() { "" } else { " (missing)" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn args() -> RunArgs {
        RunArgs {
            from: Some("a.png".into()),
            to: Some("b.png".into()),
            ..RunArgs::default()
        }
    }

    fn scene(toml: &str) -> SceneConfig {
        SceneConfig::from_toml_str(toml).unwrap()
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_surface_size("1920x1080").unwrap(), (1920, 1080));
        assert_eq!(parse_surface_size(" 800X600 ").unwrap(), (800, 600));
        assert!(parse_surface_size("0x10").is_err());
        assert!(parse_surface_size("wide").is_err());
    }

    #[test]
    fn defaults_without_scene() {
        let config = build_renderer_config(&args(), None).unwrap();
        assert_eq!(config.surface_size, DEFAULT_SURFACE);
        assert_eq!(config.initial_progress, 0.0);
        assert_eq!(config.progress_step, DEFAULT_PROGRESS_STEP);
        assert_eq!(config.policy, RenderPolicy::Animate { target_fps: None });
        assert!(config.sweep.is_none());
        assert_eq!(config.sources.from, PathBuf::from("a.png"));
    }

    #[test]
    fn cli_overrides_scene() {
        let scene = scene(
            r#"
            version = 1
            [sources]
            from = "scene-a.png"
            to = "scene-b.png"
            [window]
            size = "320x200"
            fps = 30.0
            antialias = "off"
            [transition]
            progress = 0.4
            step = 0.05
            "#,
        );
        let mut args = args();
        args.size = Some("640x480".into());
        args.progress = Some(0.9);
        let config = build_renderer_config(&args, Some(&scene)).unwrap();

        assert_eq!(config.sources.from, PathBuf::from("a.png"));
        assert_eq!(config.surface_size, (640, 480));
        assert_eq!(config.initial_progress, 0.9);
        assert_eq!(config.progress_step, 0.05);
        assert_eq!(config.antialiasing, Antialiasing::Off);
        assert_eq!(config.policy.requested_fps(), Some(30.0));
    }

    #[test]
    fn scene_supplies_missing_sources() {
        let scene = scene(
            r#"
            version = 1
            [sources]
            from = "scene-a.png"
            to = "scene-b.png"
            "#,
        );
        let config = build_renderer_config(&RunArgs::default(), Some(&scene)).unwrap();
        assert_eq!(config.sources.to, PathBuf::from("scene-b.png"));
    }

    #[test]
    fn missing_sources_are_reported() {
        let err = build_renderer_config(&RunArgs::default(), None).unwrap_err();
        assert!(err.to_string().contains("--from"), "{err}");
    }

    #[test]
    fn rejects_bad_values() {
        let mut bad_progress = args();
        bad_progress.progress = Some(1.5);
        assert!(build_renderer_config(&bad_progress, None).is_err());

        let mut bad_step = args();
        bad_step.step = Some(0.0);
        assert!(build_renderer_config(&bad_step, None).is_err());

        let mut bad_size = args();
        bad_size.size = Some("12".into());
        assert!(build_renderer_config(&bad_size, None).is_err());
    }

    #[test]
    fn policy_selection() {
        let mut export = args();
        export.export = Some("out.png".into());
        export.time = Some(2.0);
        assert_eq!(
            build_renderer_config(&export, None).unwrap().policy,
            RenderPolicy::Export {
                time: Some(2.0),
                path: "out.png".into()
            }
        );

        let mut still = args();
        still.still = true;
        assert_eq!(
            build_renderer_config(&still, None).unwrap().policy,
            RenderPolicy::Still { time: None }
        );

        let mut uncapped = args();
        uncapped.fps = Some(0.0);
        assert_eq!(
            build_renderer_config(&uncapped, None).unwrap().policy,
            RenderPolicy::Animate { target_fps: None }
        );
    }

    #[test]
    fn sweep_merges_cli_and_scene() {
        let scene = scene(
            r#"
            version = 1
            [sweep]
            duration = "4s"
            curve = "ease-in-out"
            mode = "pingpong"
            "#,
        );
        let mut args = args();
        args.autostart = true;
        args.curve = Some(SweepCurve::Linear);
        let sweep = build_renderer_config(&args, Some(&scene))
            .unwrap()
            .sweep
            .unwrap();
        assert_eq!(sweep.duration, Duration::from_secs(4));
        assert_eq!(sweep.curve, SweepCurve::Linear);
        assert_eq!(sweep.mode, SweepMode::PingPong);
        assert!(sweep.autostart);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(dir.path().to_path_buf());
        let mut args = args();
        args.config = Some(dir.path().join("nope.toml"));
        assert!(load_scene(&args, &paths).is_err());
    }

    #[test]
    fn default_config_is_optional() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(dir.path().to_path_buf());
        assert!(load_scene(&args(), &paths).unwrap().is_none());

        fs::write(
            paths.config_file(),
            "version = 1\n[sources]\nfrom = \"a.png\"\n",
        )
        .unwrap();
        let scene = load_scene(&args(), &paths).unwrap().unwrap();
        assert_eq!(scene.sources.from, Some(dir.path().join("a.png")));
    }
}
