//! Emission clock.
//!
//! A single accumulator replaces per-slot timers: each slot owns a fixed
//! phase inside the cycle, and a slot fires when the clock sweeps past it.
//!
//! ```text
//!  cycle length = lifetime.max
//!  0          2.5          5.0          7.5          10.0
//!  |-----------|------------|------------|------------|
//!  slot 0      slot 1       slot 2       slot 3       wrap -> 0
//!        [prev ........ now)   <- window swept this frame
//! ```

/// Elapsed time within the current emission cycle plus a wrap count.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmitterClock {
    system_time: f32,
    cycle: u64,
}

/// The window of cycle time covered by one advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockAdvance {
    /// Cycle time before the advance.
    pub prev: f32,
    /// Cycle time after the advance (wrapped).
    pub now: f32,
    /// How many times the clock wrapped during the advance.
    pub wraps: u64,
}

impl EmitterClock {
    /// A clock at the start of cycle zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            system_time: 0.0,
            cycle: 0,
        }
    }

    /// Seconds into the current cycle.
    #[inline]
    #[must_use]
    pub const fn system_time(&self) -> f32 {
        self.system_time
    }

    /// Completed cycles.
    #[inline]
    #[must_use]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Back to the start of cycle zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advances by `dt` seconds over a cycle of `period` seconds.
    ///
    /// The clock wraps only once it passes `period`, so landing exactly on
    /// `period` stays in the current cycle. `period` must be positive.
    pub fn advance(&mut self, dt: f32, period: f32) -> ClockAdvance {
        let prev = self.system_time;
        self.system_time += dt;

        let mut wraps = 0;
        if self.system_time > period {
            let whole = (self.system_time / period).floor();
            let mut rest = self.system_time - whole * period;
            // Wrapped count is a small non-negative whole number.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let mut count = whole as u64;
            if rest <= 0.0 && count > 0 {
                rest += period;
                count -= 1;
            }
            self.system_time = rest;
            wraps = count;
        }

        self.cycle += wraps;
        ClockAdvance {
            prev,
            now: self.system_time,
            wraps,
        }
    }
}

impl ClockAdvance {
    /// Returns true when the sweep passed `restart_time`.
    ///
    /// Without a wrap the window is `[prev, now)`. With one wrap it covers
    /// the tail of the old cycle and the head of the new one. With more,
    /// every phase was passed.
    #[inline]
    #[must_use]
    pub fn crossed(&self, restart_time: f32) -> bool {
        match self.wraps {
            0 => self.prev <= restart_time && restart_time < self.now,
            1 => restart_time >= self.prev || restart_time < self.now,
            _ => true,
        }
    }
}
