use bevy_ecs::prelude::Resource;

/// Simulated time, advanced by the host through
/// [`update_world_time`](crate::systems::time::update_world_time).
///
/// Delayed tasks and tweens are measured against `elapsed`, never against a
/// wall clock, so two worlds fed the same deltas behave identically.
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Scaled seconds since the world was created. Kept in `f64` so frame
    /// deltas still register after weeks of uptime.
    pub elapsed: f64,
    /// Scaled seconds of the current frame.
    pub delta: f32,
    pub time_scale: f32,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
