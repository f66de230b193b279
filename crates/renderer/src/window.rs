use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Receiver;
use hexfield::FrameParams;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::control::{ControlCommand, TransitionControl};
use crate::gpu::GpuState;
use crate::runtime::{time_source_for_policy, BoxedTimeSource, FrameScheduler, RenderPolicy};
use crate::timeline::SweepEnvelope;
use crate::types::{AdapterProfile, RendererConfig};

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Progress steps applied per arrow key press while Shift is held.
const COARSE_NUDGE: i32 = 10;

/// What a key press asks the preview to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum KeyAction {
    Control(ControlCommand),
    Quit,
}

pub(crate) fn key_action(key: &Key, shift: bool) -> Option<KeyAction> {
    let nudge = if shift { COARSE_NUDGE } else { 1 };
    let command = match key {
        Key::Named(NamedKey::Escape) => return Some(KeyAction::Quit),
        Key::Named(NamedKey::ArrowLeft) => ControlCommand::Nudge(-nudge),
        Key::Named(NamedKey::ArrowRight) => ControlCommand::Nudge(nudge),
        Key::Named(NamedKey::Home) => ControlCommand::SetProgress(0.0),
        Key::Named(NamedKey::End) => ControlCommand::SetProgress(1.0),
        Key::Named(NamedKey::Space) => ControlCommand::ToggleSweep,
        Key::Character(value) if value.as_str() == " " => ControlCommand::ToggleSweep,
        Key::Character(value) => {
            let digit = value.as_str().parse::<u8>().ok().filter(|d| *d <= 9)?;
            ControlCommand::SetProgress(f32::from(digit) / 10.0)
        }
        _ => return None,
    };
    Some(KeyAction::Control(command))
}

/// How the loop reacts to a failed frame acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameRecovery {
    /// Reconfigure the surface, then render again on the next tick.
    Reconfigure,
    /// Drop this frame only.
    Skip,
}

pub(crate) fn frame_recovery(error: &wgpu::SurfaceError) -> FrameRecovery {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => FrameRecovery::Reconfigure,
        _ => FrameRecovery::Skip,
    }
}

/// Applies the software-rasteriser frame cap unless the user picked a rate.
fn effective_policy(policy: &RenderPolicy, profile: &AdapterProfile) -> RenderPolicy {
    match policy {
        RenderPolicy::Animate { target_fps: None } if profile.is_software() => {
            tracing::warn!(
                adapter = %profile.name,
                backend = ?profile.backend,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping preview to {} FPS (override with --fps)",
                SOFTWARE_FPS_CAP
            );
            RenderPolicy::Animate {
                target_fps: Some(SOFTWARE_FPS_CAP),
            }
        }
        other => other.clone(),
    }
}

/// Per-frame state that does not touch the GPU: progress, sweep, clock and
/// redraw cadence.
pub(crate) struct FrameDriver {
    control: TransitionControl,
    sweep: SweepEnvelope,
    time_source: BoxedTimeSource,
    scheduler: FrameScheduler,
}

impl FrameDriver {
    pub(crate) fn new(config: &RendererConfig, policy: &RenderPolicy, now: Instant) -> Self {
        Self {
            control: TransitionControl::new(config.initial_progress, config.progress_step),
            sweep: SweepEnvelope::new(config.sweep.unwrap_or_default(), now),
            time_source: time_source_for_policy(policy, config.time_step),
            scheduler: FrameScheduler::new(policy),
        }
    }

    pub(crate) fn progress(&self) -> f32 {
        self.control.value()
    }

    pub(crate) fn apply(&mut self, command: ControlCommand, now: Instant) {
        match command {
            ControlCommand::ToggleSweep => {
                self.sweep.toggle(now);
                tracing::info!(running = self.sweep.is_running(), "sweep toggled");
            }
            manual => {
                // A manual edit takes over from a running sweep.
                if self.sweep.is_running() {
                    self.sweep.toggle(now);
                }
                let value = self.control.apply(manual);
                tracing::debug!(progress = value, ?manual, "transition progress changed");
            }
        }
        self.scheduler.invalidate();
    }

    /// Advances the sweep and the clock, returning this frame's parameters.
    pub(crate) fn next_frame(&mut self, size: PhysicalSize<u32>, now: Instant) -> FrameParams {
        if let Some(progress) = self.sweep.advance(now) {
            self.control.set(progress);
        }
        let time = self.time_source.sample().seconds;
        FrameParams::for_viewport(size.width, size.height)
            .with_time(time)
            .with_transition(self.control.value())
    }

    pub(crate) fn mark_rendered(&mut self, now: Instant) {
        self.scheduler.mark_rendered(now);
        if self.sweep.is_running() {
            self.scheduler.invalidate();
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.scheduler.invalidate();
    }

    fn ready_for_frame(&self, now: Instant) -> bool {
        self.scheduler.ready_for_frame(now)
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }
}

/// Forwards commands from any thread into the event loop so they wake it.
fn spawn_command_forwarder(
    inbox: Receiver<ControlCommand>,
    proxy: EventLoopProxy<ControlCommand>,
) -> Result<()> {
    thread::Builder::new()
        .name("hexwipe-commands".into())
        .spawn(move || {
            for command in inbox.iter() {
                if proxy.send_event(command).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn command forwarder")?;
    Ok(())
}

/// Opens the preview window and runs the transition until it is closed.
pub(crate) fn run(config: RendererConfig, inbox: Receiver<ControlCommand>) -> Result<()> {
    let event_loop = EventLoopBuilder::<ControlCommand>::with_user_event()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    spawn_command_forwarder(inbox, event_loop.create_proxy())?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("hexwipe")
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut gpu = GpuState::new(window.as_ref(), window.inner_size(), &config)
        .context("failed to initialise renderer")?;
    let policy = effective_policy(&config.policy, gpu.adapter_profile());
    let mut driver = FrameDriver::new(&config, &policy, Instant::now());
    let mut shift = false;

    tracing::info!(
        from = %config.sources.from.display(),
        to = %config.sources.to.display(),
        progress = driver.progress(),
        ?policy,
        "transition ready"
    );
    window.request_redraw();

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::UserEvent(command) => {
            driver.apply(command, Instant::now());
        }
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
            WindowEvent::ModifiersChanged(modifiers) => {
                shift = modifiers.state().shift_key();
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match key_action(&event.logical_key, shift) {
                    Some(KeyAction::Quit) => elwt.exit(),
                    Some(KeyAction::Control(command)) => {
                        if !(event.repeat && command == ControlCommand::ToggleSweep) {
                            driver.apply(command, Instant::now());
                        }
                    }
                    None => {}
                }
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                driver.invalidate();
            }
            WindowEvent::ScaleFactorChanged {
                mut inner_size_writer,
                ..
            } => {
                let _ = inner_size_writer.request_inner_size(gpu.size());
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let params = driver.next_frame(gpu.size(), now);
                if let Err(err) = gpu.render(&params) {
                    match frame_recovery(&err) {
                        FrameRecovery::Reconfigure => {
                            tracing::debug!(error = ?err, "surface needs reconfiguring");
                            gpu.reconfigure();
                        }
                        FrameRecovery::Skip => {
                            tracing::warn!(error = ?err, "dropped frame; retrying next frame");
                        }
                    }
                    driver.invalidate();
                }
                driver.mark_rendered(now);
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if driver.ready_for_frame(now) {
                tracing::trace!("scheduler: issuing redraw now");
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = driver.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::SweepSettings;
    use std::time::Duration;

    fn config() -> RendererConfig {
        RendererConfig {
            initial_progress: 0.5,
            ..RendererConfig::default()
        }
    }

    fn software_profile() -> AdapterProfile {
        AdapterProfile {
            name: "llvmpipe (LLVM 17.0.6, 256 bits)".into(),
            backend: wgpu::Backend::Vulkan,
            device_type: wgpu::DeviceType::Cpu,
            max_texture_dimension: 8192,
        }
    }

    #[test]
    fn arrow_keys_nudge_progress() {
        let left = Key::Named(NamedKey::ArrowLeft);
        let right = Key::Named(NamedKey::ArrowRight);
        assert_eq!(
            key_action(&right, false),
            Some(KeyAction::Control(ControlCommand::Nudge(1)))
        );
        assert_eq!(
            key_action(&left, true),
            Some(KeyAction::Control(ControlCommand::Nudge(-10)))
        );
    }

    #[test]
    fn home_end_and_digits_jump() {
        assert_eq!(
            key_action(&Key::Named(NamedKey::Home), false),
            Some(KeyAction::Control(ControlCommand::SetProgress(0.0)))
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::End), false),
            Some(KeyAction::Control(ControlCommand::SetProgress(1.0)))
        );
        assert_eq!(
            key_action(&Key::Character("7".into()), false),
            Some(KeyAction::Control(ControlCommand::SetProgress(0.7)))
        );
        assert_eq!(key_action(&Key::Character("x".into()), false), None);
        assert_eq!(key_action(&Key::Character("42".into()), false), None);
    }

    #[test]
    fn space_and_escape() {
        assert_eq!(
            key_action(&Key::Named(NamedKey::Space), false),
            Some(KeyAction::Control(ControlCommand::ToggleSweep))
        );
        assert_eq!(
            key_action(&Key::Character(" ".into()), false),
            Some(KeyAction::Control(ControlCommand::ToggleSweep))
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::Escape), false),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn lost_and_outdated_surfaces_reconfigure() {
        assert_eq!(
            frame_recovery(&wgpu::SurfaceError::Lost),
            FrameRecovery::Reconfigure
        );
        assert_eq!(
            frame_recovery(&wgpu::SurfaceError::Outdated),
            FrameRecovery::Reconfigure
        );
        assert_eq!(frame_recovery(&wgpu::SurfaceError::Timeout), FrameRecovery::Skip);
        assert_eq!(
            frame_recovery(&wgpu::SurfaceError::OutOfMemory),
            FrameRecovery::Skip
        );
    }

    #[test]
    fn software_adapters_are_capped_unless_fps_requested() {
        let capped = effective_policy(&RenderPolicy::default(), &software_profile());
        assert_eq!(capped.requested_fps(), Some(SOFTWARE_FPS_CAP));

        let explicit = RenderPolicy::Animate {
            target_fps: Some(60.0),
        };
        assert_eq!(effective_policy(&explicit, &software_profile()), explicit);

        let mut hardware = software_profile();
        hardware.name = "NVIDIA GeForce RTX 4070".into();
        hardware.device_type = wgpu::DeviceType::DiscreteGpu;
        assert_eq!(
            effective_policy(&RenderPolicy::default(), &hardware),
            RenderPolicy::default()
        );
    }

    #[test]
    fn clock_advances_once_per_frame() {
        let now = Instant::now();
        let policy = RenderPolicy::default();
        let mut driver = FrameDriver::new(&config(), &policy, now);
        let size = PhysicalSize::new(200, 100);
        let first = driver.next_frame(size, now);
        let second = driver.next_frame(size, now);
        assert!((first.time - 0.01).abs() < 1e-6);
        assert!((second.time - 0.02).abs() < 1e-6);
        assert!((first.transition - 0.5).abs() < 1e-6);
        assert_eq!(first.aspect.to_array(), [1.0, 2.0]);
    }

    #[test]
    fn commands_apply_on_the_next_frame() {
        let now = Instant::now();
        let policy = RenderPolicy::Still { time: Some(1.5) };
        let mut driver = FrameDriver::new(&config(), &policy, now);
        let size = PhysicalSize::new(64, 64);
        driver.next_frame(size, now);
        driver.mark_rendered(now);
        assert!(!driver.ready_for_frame(now));

        driver.apply(ControlCommand::Nudge(3), now);
        driver.apply(ControlCommand::SetProgress(0.9), now);
        assert!(driver.ready_for_frame(now));
        let params = driver.next_frame(size, now);
        assert!((params.transition - 0.9).abs() < 1e-6);
        assert_eq!(params.time, 1.5);
    }

    #[test]
    fn sweep_drives_progress_and_manual_edits_pause_it() {
        let start = Instant::now();
        let config = RendererConfig {
            initial_progress: 0.0,
            sweep: Some(SweepSettings {
                duration: Duration::from_secs(2),
                curve: crate::timeline::SweepCurve::Linear,
                autostart: true,
                ..SweepSettings::default()
            }),
            ..RendererConfig::default()
        };
        let policy = RenderPolicy::Still { time: None };
        let mut driver = FrameDriver::new(&config, &policy, start);
        let size = PhysicalSize::new(64, 64);

        let midway = driver.next_frame(size, start + Duration::from_secs(1));
        assert!((midway.transition - 0.5).abs() < 1e-6);
        driver.mark_rendered(start + Duration::from_secs(1));
        assert!(driver.ready_for_frame(start + Duration::from_secs(1)));

        driver.apply(ControlCommand::SetProgress(0.2), start + Duration::from_secs(1));
        let later = driver.next_frame(size, start + Duration::from_secs(2));
        assert!((later.transition - 0.2).abs() < 1e-6);
    }
}
