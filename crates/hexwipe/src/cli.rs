use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use renderer::{
    Antialiasing, ColorSpaceMode, GpuPowerPreference, ShaderCompiler, SweepCurve, SweepMode,
};

#[derive(Parser, Debug)]
#[command(
    name = "hexwipe",
    author,
    version,
    about = "Hexagonal-grid transition between two images"
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Image shown at progress 0.
    #[arg(long, value_name = "PATH")]
    pub from: Option<PathBuf>,

    /// Image revealed at progress 1.
    #[arg(long, value_name = "PATH")]
    pub to: Option<PathBuf>,

    /// Scene file to read (defaults to `hexwipe.toml` in the config directory).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Window or export resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Frame-rate cap for the window (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Initial transition progress in [0, 1].
    #[arg(long, value_name = "P")]
    pub progress: Option<f32>,

    /// Progress quantisation step, also the arrow-key increment.
    #[arg(long, value_name = "S")]
    pub step: Option<f32>,

    /// Sweep progress from 0 to 1 over this long (`3s`, `1500ms`, or seconds).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub sweep: Option<Duration>,

    /// Sweep easing: `linear`, `smoothstep`, or `ease-in-out`.
    #[arg(long, value_name = "CURVE", value_parser = parse_curve)]
    pub curve: Option<SweepCurve>,

    /// Sweep repetition: `once`, `loop`, or `pingpong`.
    #[arg(long, value_name = "MODE", value_parser = parse_sweep_mode)]
    pub sweep_mode: Option<SweepMode>,

    /// Start sweeping immediately instead of waiting for Space.
    #[arg(long)]
    pub autostart: bool,

    /// Shader clock increment per rendered frame.
    #[arg(long, value_name = "T")]
    pub time_step: Option<f32>,

    /// Freeze the shader clock and redraw only when progress changes.
    #[arg(long, conflicts_with = "export")]
    pub still: bool,

    /// Shader clock value for `--still` and `--export`.
    #[arg(long, value_name = "SECONDS")]
    pub time: Option<f32>,

    /// Render one frame on the CPU, write it as PNG, and exit.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Shader compiler backend: `shaderc` or `naga`.
    #[arg(
        long,
        value_name = "COMPILER",
        value_parser = parse_shader_compiler,
        default_value_t = ShaderCompiler::default()
    )]
    pub shader_compiler: ShaderCompiler,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,

    /// Adapter preference: `low` or `high`.
    #[arg(
        long,
        value_name = "POWER",
        value_parser = parse_gpu_power,
        default_value = "high"
    )]
    pub gpu_power: GpuPowerPreference,

    /// Read progress values, one per line, from standard input.
    #[arg(long)]
    pub progress_stdin: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print resolved directories and the default scene file.
    Paths,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_shader_compiler(value: &str) -> Result<ShaderCompiler, String> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "" => Err("shader compiler must not be empty".to_string()),
        "shaderc" => {
            if cfg!(feature = "shaderc") {
                Ok(ShaderCompiler::Shaderc)
            } else {
                Err("shaderc support is not enabled in this build".to_string())
            }
        }
        "naga" | "naga-glsl" => Ok(ShaderCompiler::NagaGlsl),
        _ => Err("unknown shader compiler (expected shaderc or naga)".to_string()),
    }
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_gpu_power(value: &str) -> Result<GpuPowerPreference, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" | "integrated" => Ok(GpuPowerPreference::Low),
        "high" | "high-performance" | "discrete" => Ok(GpuPowerPreference::High),
        other => Err(format!("unknown GPU power preference '{other}'; expected low or high")),
    }
}

pub fn parse_curve(value: &str) -> Result<SweepCurve, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "linear" => Ok(SweepCurve::Linear),
        "smoothstep" | "smooth" => Ok(SweepCurve::Smoothstep),
        "ease-in-out" | "easeinout" | "ease" => Ok(SweepCurve::EaseInOut),
        other => Err(format!(
            "unknown sweep curve '{other}'; expected linear, smoothstep, or ease-in-out"
        )),
    }
}

pub fn parse_sweep_mode(value: &str) -> Result<SweepMode, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "once" => Ok(SweepMode::Once),
        "loop" | "repeat" => Ok(SweepMode::Loop),
        "pingpong" | "ping-pong" | "bounce" => Ok(SweepMode::PingPong),
        other => Err(format!(
            "unknown sweep mode '{other}'; expected once, loop, or pingpong"
        )),
    }
}

/// Bare numbers are seconds; anything else goes through humantime.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    let duration = match trimmed.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            Duration::try_from_secs_f64(seconds)
                .map_err(|err| format!("duration '{trimmed}' is out of range: {err}"))?
        }
        Ok(_) => return Err(format!("duration '{trimmed}' must be a non-negative number")),
        Err(_) => humantime::parse_duration(trimmed)
            .map_err(|err| format!("invalid duration '{trimmed}': {err}"))?,
    };
    if duration.is_zero() {
        return Err("sweep duration must be greater than zero".to_string());
    }
    Ok(duration)
}
