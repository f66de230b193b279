use std::time::{Duration, Instant};

/// Easing applied to sweep progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepCurve {
    Linear,
    #[default]
    Smoothstep,
    EaseInOut,
}

impl SweepCurve {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            SweepCurve::Linear => clamped,
            SweepCurve::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            SweepCurve::EaseInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
        }
    }
}

/// What happens when a sweep reaches the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepMode {
    /// Stop at 1.
    #[default]
    Once,
    /// Jump back to 0 and go again.
    Loop,
    /// Reverse direction at each end.
    PingPong,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSettings {
    pub duration: Duration,
    pub curve: SweepCurve,
    pub mode: SweepMode,
    pub autostart: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(3),
            curve: SweepCurve::default(),
            mode: SweepMode::default(),
            autostart: false,
        }
    }
}

/// Drives transition progress over wall-clock time. Can be paused and
/// resumed; elapsed time only accumulates while running.
#[derive(Debug, Clone)]
pub struct SweepEnvelope {
    settings: SweepSettings,
    elapsed: Duration,
    running_since: Option<Instant>,
}

impl SweepEnvelope {
    pub fn new(settings: SweepSettings, now: Instant) -> Self {
        let mut envelope = Self {
            settings,
            elapsed: Duration::ZERO,
            running_since: None,
        };
        if settings.autostart {
            envelope.running_since = Some(now);
        }
        envelope
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Pauses a running sweep, or resumes a paused one. A finished one-shot
    /// sweep restarts from the beginning.
    pub fn toggle(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.elapsed += now.saturating_duration_since(since);
        } else {
            if self.finished() {
                self.elapsed = Duration::ZERO;
            }
            self.running_since = Some(now);
        }
    }

    fn finished(&self) -> bool {
        matches!(self.settings.mode, SweepMode::Once) && self.elapsed >= self.settings.duration
    }

    fn total_elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.elapsed + now.saturating_duration_since(since),
            None => self.elapsed,
        }
    }

    /// Progress for the frame at `now`, or `None` while paused.
    pub fn advance(&mut self, now: Instant) -> Option<f32> {
        self.running_since?;
        let duration = self.settings.duration.as_secs_f32().max(f32::EPSILON);
        let phase = self.total_elapsed(now).as_secs_f32() / duration;

        let t = match self.settings.mode {
            SweepMode::Once => {
                if phase >= 1.0 {
                    self.elapsed = self.settings.duration;
                    self.running_since = None;
                    tracing::debug!("sweep finished");
                }
                phase.min(1.0)
            }
            SweepMode::Loop => phase.fract(),
            SweepMode::PingPong => {
                let cycle = phase.floor() as u64;
                let t = phase.fract();
                if cycle % 2 == 0 {
                    t
                } else {
                    1.0 - t
                }
            }
        };
        Some(self.settings.curve.sample(t))
    }
}
