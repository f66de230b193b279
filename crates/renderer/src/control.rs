//! The transition progress scalar and the channel other threads use to move it.

use std::io::BufRead;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Slider granularity.
pub const DEFAULT_PROGRESS_STEP: f32 = 0.01;

/// The single externally settable input of the transition.
///
/// Values are clamped to `[0, 1]` and snapped to multiples of `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionControl {
    value: f32,
    step: f32,
}

impl TransitionControl {
    pub fn new(initial: f32, step: f32) -> Self {
        let step = if step > 0.0 && step <= 1.0 {
            step
        } else {
            DEFAULT_PROGRESS_STEP
        };
        let mut control = Self { value: 0.0, step };
        control.set(initial);
        control
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Stores `value` after clamping and quantising. NaN is ignored.
    pub fn set(&mut self, value: f32) -> f32 {
        if value.is_nan() {
            return self.value;
        }
        let snapped = (value.clamp(0.0, 1.0) / self.step).round() * self.step;
        self.value = snapped.clamp(0.0, 1.0);
        self.value
    }

    /// Moves by `steps` multiples of the step size.
    pub fn nudge(&mut self, steps: i32) -> f32 {
        self.set(self.value + steps as f32 * self.step)
    }

    pub fn apply(&mut self, command: ControlCommand) -> f32 {
        match command {
            ControlCommand::SetProgress(value) => self.set(value),
            ControlCommand::Nudge(steps) => self.nudge(steps),
            ControlCommand::ToggleSweep => self.value,
        }
    }
}

impl Default for TransitionControl {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_PROGRESS_STEP)
    }
}

/// Requests accepted by the render loop. Applied on the next frame, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    SetProgress(f32),
    Nudge(i32),
    ToggleSweep,
}

/// Cloneable handle for driving the transition from any thread.
#[derive(Debug, Clone)]
pub struct TransitionController {
    sender: Sender<ControlCommand>,
}

impl TransitionController {
    pub fn send(&self, command: ControlCommand) -> Result<()> {
        self.sender
            .send(command)
            .map_err(|_| anyhow!("renderer is no longer accepting transition commands"))
    }

    pub fn set_progress(&self, value: f32) -> Result<()> {
        self.send(ControlCommand::SetProgress(value))
    }

    pub fn nudge(&self, steps: i32) -> Result<()> {
        self.send(ControlCommand::Nudge(steps))
    }

    pub fn toggle_sweep(&self) -> Result<()> {
        self.send(ControlCommand::ToggleSweep)
    }
}

/// Creates a controller and the receiving end the render loop drains.
pub fn control_channel() -> (TransitionController, Receiver<ControlCommand>) {
    let (sender, receiver) = unbounded();
    (TransitionController { sender }, receiver)
}

/// Forwards every numeric line of `reader` as a progress update.
///
/// Blank lines are skipped and unparsable ones are logged; the thread ends at
/// EOF or once the renderer hangs up.
pub fn spawn_progress_reader<R>(reader: R, controller: TransitionController) -> Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("hexwipe-progress".into())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(error = %err, "stopped reading progress input");
                        break;
                    }
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match trimmed.parse::<f32>() {
                    Ok(value) => {
                        tracing::debug!(value, "progress update from input");
                        if controller.set_progress(value).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        tracing::warn!(line = trimmed, "ignoring non-numeric progress input");
                    }
                }
            }
        })
        .map_err(|err| anyhow!("failed to spawn progress reader: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn clamps_into_unit_range() {
        let mut control = TransitionControl::default();
        assert_eq!(control.set(1.7), 1.0);
        assert_eq!(control.set(-0.3), 0.0);
    }

    #[test]
    fn quantises_to_step() {
        let mut control = TransitionControl::new(0.0, 0.25);
        assert_eq!(control.set(0.3), 0.25);
        assert_eq!(control.set(0.4), 0.5);

        let mut fine = TransitionControl::default();
        assert!((fine.set(0.333) - 0.33).abs() < 1e-6);
    }

    #[test]
    fn nudges_by_whole_steps() {
        let mut control = TransitionControl::new(0.5, 0.1);
        assert!((control.nudge(1) - 0.6).abs() < 1e-6);
        assert!((control.nudge(-10) - 0.0).abs() < 1e-6);
        assert_eq!(control.nudge(100), 1.0);
    }

    #[test]
    fn rejects_invalid_step_and_nan() {
        let mut control = TransitionControl::new(0.42, 0.0);
        assert_eq!(control.step(), DEFAULT_PROGRESS_STEP);
        let before = control.value();
        assert_eq!(control.set(f32::NAN), before);
    }

    #[test]
    fn commands_arrive_in_order() {
        let (controller, inbox) = control_channel();
        let remote = controller.clone();
        remote.set_progress(0.2).unwrap();
        controller.nudge(3).unwrap();
        controller.toggle_sweep().unwrap();

        let mut control = TransitionControl::default();
        let received: Vec<_> = inbox.try_iter().collect();
        assert_eq!(
            received,
            vec![
                ControlCommand::SetProgress(0.2),
                ControlCommand::Nudge(3),
                ControlCommand::ToggleSweep,
            ]
        );
        for command in received {
            control.apply(command);
        }
        assert!((control.value() - 0.23).abs() < 1e-6);
    }

    #[test]
    fn send_fails_once_renderer_is_gone() {
        let (controller, inbox) = control_channel();
        drop(inbox);
        assert!(controller.set_progress(0.5).is_err());
    }

    #[test]
    fn progress_reader_forwards_numeric_lines() {
        let (controller, inbox) = control_channel();
        let input = Cursor::new("0.25\n\nnot-a-number\n 1 \n");
        let handle = spawn_progress_reader(input, controller).unwrap();
        handle.join().unwrap();
        let received: Vec<_> = inbox.try_iter().collect();
        assert_eq!(
            received,
            vec![
                ControlCommand::SetProgress(0.25),
                ControlCommand::SetProgress(1.0),
            ]
        );
    }
}
