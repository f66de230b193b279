//! Renderer crate for hexwipe.
//!
//! Presents the hex-grid transition between two images. The GPU path runs the
//! GLSL port of the [`hexfield`] pipeline inside a winit window; the export
//! path evaluates `hexfield` directly on the CPU and writes a PNG.
//!
//! ```text
//!   CLI / hexwipe
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ window::run ──▶ winit event loop ──▶ GpuState::render()
//!          │                ▲                                    │
//!          │   TransitionController (any thread)                 └─▶ uniforms ─▶ UBO
//!          │
//!          └──▶ export::export_still ──▶ hexfield::render_still ──▶ PNG
//! ```
//!
//! The only mutable input at runtime is the transition progress. It is set
//! through [`TransitionController`], from the keyboard, or by an automatic
//! sweep, and takes effect on the next frame.

mod compile;
mod control;
mod export;
mod gpu;
mod runtime;
mod sources;
mod timeline;
mod types;
mod window;

use anyhow::Result;
use crossbeam_channel::Receiver;

pub use control::{
    control_channel, spawn_progress_reader, ControlCommand, TransitionControl,
    TransitionController, DEFAULT_PROGRESS_STEP,
};
pub use export::export_still;
pub use runtime::{
    time_source_for_policy, BoxedTimeSource, FixedTimeSource, FrameScheduler,
    FrameStepTimeSource, RenderPolicy, TimeSample, TimeSource,
};
pub use sources::{decode_source, load_source_or_placeholder, PLACEHOLDER_TEXEL};
pub use timeline::{SweepCurve, SweepEnvelope, SweepMode, SweepSettings};
pub use types::{
    AdapterProfile, Antialiasing, ColorSpaceMode, GpuPowerPreference, RendererConfig,
    ShaderCompiler, SourcePair,
};

/// Entry point that owns the configuration and the command inbox.
pub struct Renderer {
    config: RendererConfig,
    controller: TransitionController,
    inbox: Receiver<ControlCommand>,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        let (controller, inbox) = control_channel();
        Self {
            config,
            controller,
            inbox,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// A handle other threads can use to move the transition while it runs.
    pub fn controller(&self) -> TransitionController {
        self.controller.clone()
    }

    /// Runs until the window closes, or renders a single still for
    /// [`RenderPolicy::Export`].
    pub fn run(self) -> Result<()> {
        let Self {
            config,
            controller,
            inbox,
        } = self;
        // Only external handles should keep the inbox open.
        drop(controller);

        match &config.policy {
            RenderPolicy::Export { time, path } => {
                let written = export_still(&config, time.unwrap_or(0.0), path)?;
                tracing::info!(path = %written.display(), "still frame exported");
                Ok(())
            }
            RenderPolicy::Animate { .. } | RenderPolicy::Still { .. } => {
                window::run(config, inbox)
            }
        }
    }
}
