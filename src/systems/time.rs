//! Time update system.
//!
//! Advances the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per host frame. Scheduled tasks and tweens read it, so this
//! runs before anything else in [`MotionSystem::advance`](crate::motion::MotionSystem::advance).
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta seconds on the `WorldTime` resource.
///
/// `dt` is the unscaled frame delta in seconds; negative deltas are treated
/// as zero so simulated time never runs backwards. Returns the scaled delta.
pub fn update_world_time(world: &mut World, dt: f32) -> f32 {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt.max(0.0) * wt.time_scale;
    wt.elapsed += f64::from(scaled_dt);
    wt.delta = scaled_dt;
    scaled_dt
}
