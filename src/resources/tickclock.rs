//! Fixed-rate tick clock.
//!
//! The motion core integrates orbits on a fixed step regardless of how the
//! host slices time. [`TickClock`] accumulates frame deltas and reports how
//! many whole ticks are due. It only runs while at least one element is
//! active.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Debug)]
pub struct TickClock {
    /// Seconds per tick.
    pub interval: f32,
    /// Upper bound on ticks run for a single frame.
    pub max_catch_up: u32,
    pub accumulator: f32,
    pub running: bool,
    /// Ticks run since the clock was created.
    pub ticks: u64,
}

impl TickClock {
    pub fn new(rate: f32, max_catch_up: u32) -> Self {
        TickClock {
            interval: 1.0 / rate.max(1.0),
            max_catch_up: max_catch_up.max(1),
            accumulator: 0.0,
            running: false,
            ticks: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.accumulator = 0.0;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    /// Add `dt` seconds and return how many ticks should run now.
    ///
    /// Time beyond `max_catch_up` ticks is dropped rather than replayed.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        if !self.running || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt;
        let mut due = 0;
        while self.accumulator >= self.interval && due < self.max_catch_up {
            self.accumulator -= self.interval;
            due += 1;
        }
        if due == self.max_catch_up {
            self.accumulator = self.accumulator.min(self.interval);
        }
        due
    }
}
