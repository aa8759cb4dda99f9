//! Timed routine primitives shared by vessels and the player.
//!
//! Every timed behaviour in the game (regeneration, invincibility flicker,
//! overheat flashing, death delay, proximity pulses) is a plain struct stored
//! on the owning entity and advanced by a system with the frame delta.  A
//! routine is "running" while its component (or `Option` field) is present;
//! restarting a routine means overwriting it, which cancels the previous
//! instance in the same step.
//!
//! | Type | Shape | Used by |
//! |------|-------|---------|
//! | [`Countdown`] | one-shot timer | death delay, pulses, cooldowns |
//! | [`Flicker`]   | fixed number of visual toggles | temporary / shield invincibility |
//! | [`Blinker`]   | unbounded periodic toggle | overheat indicator |

/// One-shot countdown in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    pub fn new(secs: f32) -> Self {
        Self { remaining: secs }
    }

    /// A countdown that is already finished.
    pub fn elapsed() -> Self {
        Self { remaining: 0.0 }
    }

    /// Advance by `dt`; returns `true` once the countdown has run out.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.is_finished()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn reset(&mut self, secs: f32) {
        self.remaining = secs;
    }
}

/// Fixed-duration blink: toggles a visual every `interval` seconds, then
/// restores it.
///
/// The first toggle happens on construction, so a flicker of duration `d` and
/// interval `i` performs `ceil(d / i)` toggles and finishes `ceil(d / i) * i`
/// seconds after it started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flicker {
    steps: u32,
    toggles: u32,
    interval: f32,
    until_next: f32,
    hidden: bool,
}

impl Flicker {
    pub fn new(duration: f32, interval: f32) -> Self {
        // Tolerance keeps 1.5 / 0.15 at 10 steps despite f32 rounding.
        let steps = ((duration / interval) - 1e-4).ceil().max(1.0) as u32;
        Self {
            steps,
            toggles: 1,
            interval,
            until_next: interval,
            hidden: true,
        }
    }

    /// Advance by `dt`; returns `true` when the flicker has completed.
    /// A completed flicker always leaves the visual restored.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.until_next -= dt;
        while self.until_next <= 0.0 {
            if self.toggles >= self.steps {
                self.hidden = false;
                return true;
            }
            self.hidden = !self.hidden;
            self.toggles += 1;
            self.until_next += self.interval;
        }
        false
    }

    /// Whether the blinking visual is currently in its "off" state.
    #[inline]
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Total toggles this flicker will perform.
    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }
}

/// Unbounded periodic toggle.  The visual starts shown and flips every
/// `interval` seconds until the owner drops the blinker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blinker {
    interval: f32,
    until_next: f32,
    hidden: bool,
}

impl Blinker {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            until_next: interval,
            hidden: false,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.until_next -= dt;
        while self.until_next <= 0.0 {
            self.hidden = !self.hidden;
            self.until_next += self.interval;
        }
    }

    #[inline]
    pub fn hidden(&self) -> bool {
        self.hidden
    }
}
