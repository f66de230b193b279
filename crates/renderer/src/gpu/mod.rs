//! GPU side of the transition.
//!
//! - `context` owns the wgpu instance, device, and surface, and negotiates
//!   MSAA and the swapchain format.
//! - `textures` uploads the two source images with a bottom-left origin.
//! - `pipeline` builds the bind group layouts and the full-screen pipeline.
//! - `uniforms` mirrors the fragment shader's parameter block.
//! - `state` glues everything together behind `GpuState`.

mod context;
mod pipeline;
mod state;
mod textures;
mod uniforms;

pub(crate) use state::GpuState;
