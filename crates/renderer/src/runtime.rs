use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::warn;

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames should animate continuously,
/// be evaluated at a fixed timestamp, or be exported to disk.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Run the render loop continuously, optionally clamping the frame rate.
    Animate {
        /// Optional requested frames-per-second cap.
        target_fps: Option<f32>,
    },
    /// Keep the shader clock frozen and redraw only when something changes.
    Still {
        /// Timestamp to evaluate the shader at.
        time: Option<f32>,
    },
    /// Render one frame on the CPU and write it to disk.
    Export {
        /// Timestamp to evaluate the shader at.
        time: Option<f32>,
        /// Destination PNG.
        path: PathBuf,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

impl RenderPolicy {
    /// The frame-rate cap the user asked for explicitly, if any.
    pub fn requested_fps(&self) -> Option<f32> {
        match self {
            RenderPolicy::Animate { target_fps } => *target_fps,
            _ => None,
        }
    }
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Shader clock value.
    pub seconds: f32,
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Produces a time sample for the next frame. Called exactly once per
    /// rendered frame, before submission.
    fn sample(&mut self) -> TimeSample;
}

/// Frame-locked clock: every sample advances time by a constant step, so the
/// animation speed follows the display refresh rate rather than wall time.
#[derive(Debug, Clone, Copy)]
pub struct FrameStepTimeSource {
    step: f32,
    time: f32,
}

impl FrameStepTimeSource {
    pub fn new(step: f32) -> Self {
        Self { step, time: 0.0 }
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}

impl Default for FrameStepTimeSource {
    fn default() -> Self {
        Self::new(hexfield::DEFAULT_TIME_STEP)
    }
}

impl TimeSource for FrameStepTimeSource {
    fn sample(&mut self) -> TimeSample {
        self.time += self.step;
        TimeSample { seconds: self.time }
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time }
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl TimeSource for FixedTimeSource {
    fn sample(&mut self) -> TimeSample {
        TimeSample { seconds: self.time }
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
///
/// Animation uses the frame-step clock; still and export policies freeze time.
pub fn time_source_for_policy(policy: &RenderPolicy, time_step: f32) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(FrameStepTimeSource::new(time_step)),
        RenderPolicy::Still { time } | RenderPolicy::Export { time, .. } => {
            Box::new(FixedTimeSource::new(time.unwrap_or(0.0)))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cadence {
    EveryFrame,
    Capped(Duration),
    OnDemand,
}

/// Decides when the event loop should request the next redraw.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    cadence: Cadence,
    last_frame: Option<Instant>,
    pending: bool,
}

impl FrameScheduler {
    pub fn new(policy: &RenderPolicy) -> Self {
        let cadence = match policy {
            RenderPolicy::Animate {
                target_fps: Some(fps),
            } if *fps > 0.0 && fps.is_finite() => frame_interval(*fps),
            RenderPolicy::Animate { .. } => Cadence::EveryFrame,
            RenderPolicy::Still { .. } | RenderPolicy::Export { .. } => Cadence::OnDemand,
        };
        Self {
            cadence,
            last_frame: None,
            pending: true,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.cadence {
            Cadence::EveryFrame => true,
            Cadence::Capped(interval) => match self.last_frame {
                None => true,
                Some(last) => now.saturating_duration_since(last) >= interval,
            },
            Cadence::OnDemand => self.pending,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.cadence, self.last_frame) {
            (Cadence::Capped(interval), Some(last)) => last.checked_add(interval),
            _ => None,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
        self.pending = false;
    }

    /// Asks for one more frame even when the cadence would not produce one.
    pub fn invalidate(&mut self) {
        self.pending = true;
    }
}

fn frame_interval(fps: f32) -> Cadence {
    match Duration::try_from_secs_f32(1.0 / fps) {
        Ok(interval) => Cadence::Capped(interval),
        Err(err) => {
            warn!(fps, error = %err, "frame-rate cap out of range; rendering uncapped");
            Cadence::EveryFrame
        }
    }
}
