/// Countdown-to-zero timer shared by every timed piece of state: weapon
/// cooldown, invulnerability, flashlight charge, death animation, spawn and
/// difficulty intervals, fog cycling and the round-start countdown.
///
/// All values are in seconds.

/// Remainders below this fraction of the duration count as elapsed.
const SNAP_EPSILON: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct Countdown {
    remaining: f32,
    duration: f32,
}

impl Countdown {
    /// A countdown that starts full.
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration.max(0.0),
            duration: duration.max(0.0),
        }
    }

    /// A countdown that starts already elapsed (inactive until restarted).
    pub fn idle(duration: f32) -> Self {
        Self {
            remaining: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Advance by `dt`.  Returns `true` on the frame the countdown reaches zero.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        // Repeated f32 subtraction leaves crumbs; a window ticked in even
        // steps must close on its last step.
        if self.remaining <= self.duration * SNAP_EPSILON {
            self.remaining = 0.0;
        }
        self.remaining == 0.0
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Remaining fraction in `[0, 1]`.
    pub fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.duration).clamp(0.0, 1.0)
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn restart(&mut self) {
        self.remaining = self.duration;
    }

    /// Restart with a new duration (fog alternates between two lengths).
    pub fn restart_with(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.remaining = self.duration;
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }
}
