use std::path::PathBuf;

use crate::control::DEFAULT_PROGRESS_STEP;
use crate::runtime::RenderPolicy;
use crate::timeline::SweepSettings;

/// Shader compilation backend requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderCompiler {
    /// Compile GLSL through shaderc into SPIR-V.
    Shaderc,
    /// Hand GLSL to naga's built-in frontend.
    NagaGlsl,
}

impl Default for ShaderCompiler {
    fn default() -> Self {
        if cfg!(feature = "shaderc") {
            ShaderCompiler::Shaderc
        } else {
            ShaderCompiler::NagaGlsl
        }
    }
}

impl std::fmt::Display for ShaderCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderCompiler::Shaderc => f.write_str("shaderc"),
            ShaderCompiler::NagaGlsl => f.write_str("naga"),
        }
    }
}

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Gamma-encoded swapchain; source images are sampled as stored.
    #[default]
    Auto,
    /// Treat shader outputs/textures as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and use sRGB swapchains/textures for conversion.
    Linear,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Adapter selection hint forwarded to wgpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    Low,
    #[default]
    High,
}

/// What we learned about the adapter wgpu handed us.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    /// CPU rasterisers (llvmpipe, SwiftShader, WARP) are slow enough that the
    /// window preview caps its frame rate on them.
    pub fn is_software(&self) -> bool {
        if matches!(self.device_type, wgpu::DeviceType::Cpu) {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["llvmpipe", "softpipe", "swiftshader", "lavapipe", "warp"]
            .iter()
            .any(|needle| name.contains(needle))
    }
}

/// The two images the transition runs between.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePair {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Immutable configuration passed to the renderer at start-up.
///
/// Built by the binary from CLI flags layered over the scene config file.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels; also the export resolution.
    pub surface_size: (u32, u32),
    pub sources: SourcePair,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Shader compiler used for the GLSL stages.
    pub shader_compiler: ShaderCompiler,
    /// Desired color handling for swapchain/textures.
    pub color_space: ColorSpaceMode,
    pub gpu_power: GpuPowerPreference,
    /// High-level render behaviour requested by the caller.
    pub policy: RenderPolicy,
    /// Transition progress shown on the first frame.
    pub initial_progress: f32,
    /// Quantisation step of the progress control.
    pub progress_step: f32,
    /// Automatic progress driver; `None` leaves progress to the user.
    pub sweep: Option<SweepSettings>,
    /// Amount the shader clock advances per rendered frame.
    pub time_step: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            sources: SourcePair::default(),
            antialiasing: Antialiasing::default(),
            shader_compiler: ShaderCompiler::default(),
            color_space: ColorSpaceMode::default(),
            gpu_power: GpuPowerPreference::default(),
            policy: RenderPolicy::default(),
            initial_progress: 0.0,
            progress_step: DEFAULT_PROGRESS_STEP,
            sweep: None,
            time_step: hexfield::DEFAULT_TIME_STEP,
        }
    }
}
