use std::time::Duration;
use tracing::debug;

/// Phase of the shape-forming interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing happening, progress is 0
    #[default]
    Idle,
    /// Interaction active, progress ramping toward 1
    Forming,
    /// Interaction released, progress ramping toward 0
    Dissolving,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Forming => "FORMING",
            Phase::Dissolving => "DISSOLVING",
        }
    }
}

/// Snapshot of the interaction handed to the simulation every frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Interaction {
    pub active: bool,
    pub progress: f32,
}

/// Owns the interaction progress and the single ramp timer driving it.
///
/// The timer direction follows the phase, so overlapping ramps are impossible:
/// switching phase reuses the running timer instead of starting a second one.
#[derive(Debug, Clone)]
pub struct ProgressController {
    phase: Phase,
    progress: f32,
    /// Time accumulated toward the next ramp step; `None` when no ramp is running
    timer: Option<Duration>,
    rise_step: f32,
    fall_step: f32,
    interval: Duration,
}

impl ProgressController {
    pub fn new(rise_step: f32, fall_step: f32, interval: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            progress: 0.0,
            timer: None,
            rise_step,
            fall_step,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// True while the ramp timer is scheduled
    #[cfg(test)]
    pub fn is_ramping(&self) -> bool {
        self.timer.is_some()
    }

    pub fn interaction(&self) -> Interaction {
        Interaction {
            active: self.phase == Phase::Forming,
            progress: self.progress,
        }
    }

    /// Pointer entered / touch started
    pub fn start(&mut self) {
        if self.phase == Phase::Forming {
            return;
        }
        debug!(progress = self.progress, "interaction started");
        self.phase = Phase::Forming;
        if self.progress < 1.0 {
            self.timer.get_or_insert(Duration::ZERO);
        } else {
            self.timer = None;
        }
    }

    /// Pointer left / touch ended
    pub fn end(&mut self) {
        if self.phase != Phase::Forming {
            return;
        }
        debug!(progress = self.progress, "interaction ended");
        if self.progress <= 0.0 {
            self.phase = Phase::Idle;
            self.timer = None;
            return;
        }
        self.phase = Phase::Dissolving;
        self.timer.get_or_insert(Duration::ZERO);
    }

    /// Drop the timer and return to idle (view teardown)
    pub fn cancel(&mut self) {
        self.timer = None;
        self.phase = Phase::Idle;
        self.progress = 0.0;
    }

    /// Feed wall time into the ramp timer, applying one step per elapsed interval
    pub fn advance(&mut self, elapsed: Duration) {
        let Some(mut accumulated) = self.timer else {
            return;
        };
        accumulated += elapsed;

        while accumulated >= self.interval {
            accumulated -= self.interval;
            match self.phase {
                Phase::Forming => {
                    self.progress = (self.progress + self.rise_step).min(1.0);
                    if self.progress >= 1.0 {
                        self.timer = None;
                        return;
                    }
                }
                Phase::Dissolving => {
                    self.progress = (self.progress - self.fall_step).max(0.0);
                    if self.progress <= 0.0 {
                        self.phase = Phase::Idle;
                        self.timer = None;
                        return;
                    }
                }
                Phase::Idle => {
                    self.timer = None;
                    return;
                }
            }
        }

        self.timer = Some(accumulated);
    }
}
