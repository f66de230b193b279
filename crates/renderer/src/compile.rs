use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

use crate::types::ShaderCompiler;

/// Full-screen triangle; emits `v_uv` with a bottom-left origin.
pub(crate) const VERTEX_SHADER_GLSL: &str = include_str!("shaders/fullscreen.vert");

/// The hex-grid transition itself.
pub(crate) const FRAGMENT_SHADER_GLSL: &str = include_str!("shaders/hexwipe.frag");

pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    compiler: ShaderCompiler,
) -> Result<wgpu::ShaderModule> {
    compile_stage(
        device,
        compiler,
        "fullscreen triangle vertex",
        VERTEX_SHADER_GLSL,
        ShaderStage::Vertex,
    )
}

pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    compiler: ShaderCompiler,
) -> Result<wgpu::ShaderModule> {
    compile_stage(
        device,
        compiler,
        "hexwipe fragment",
        FRAGMENT_SHADER_GLSL,
        ShaderStage::Fragment,
    )
}

fn compile_stage(
    device: &wgpu::Device,
    compiler: ShaderCompiler,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    tracing::debug!(%compiler, label, "compiling shader stage");
    let source = match compiler {
        ShaderCompiler::NagaGlsl => wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
        ShaderCompiler::Shaderc => spirv_source(label, source, stage)?,
    };
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source,
    }))
}

#[cfg(feature = "shaderc")]
fn spirv_source(
    label: &str,
    source: &str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderSource<'static>> {
    use anyhow::Context;

    let kind = match stage {
        ShaderStage::Vertex => shaderc::ShaderKind::Vertex,
        ShaderStage::Fragment => shaderc::ShaderKind::Fragment,
        ShaderStage::Compute => shaderc::ShaderKind::Compute,
        other => anyhow::bail!("unsupported shader stage {other:?}"),
    };
    let compiler = shaderc::Compiler::new().context("failed to initialise shaderc")?;
    let artifact = compiler
        .compile_into_spirv(source, kind, label, "main", None)
        .with_context(|| format!("shaderc failed to compile {label}"))?;
    if artifact.get_num_warnings() > 0 {
        tracing::warn!(label, warnings = %artifact.get_warning_messages(), "shaderc warnings");
    }
    Ok(wgpu::ShaderSource::SpirV(Cow::Owned(
        artifact.as_binary().to_vec(),
    )))
}

#[cfg(not(feature = "shaderc"))]
fn spirv_source(
    _label: &str,
    _source: &str,
    _stage: ShaderStage,
) -> Result<wgpu::ShaderSource<'static>> {
    anyhow::bail!("shaderc support is not enabled in this build; use the naga compiler")
}
