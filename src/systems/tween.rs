//! Tween animation system.
//!
//! [`tween_pose_system`] advances every [`TweenPose`] by the frame delta and
//! writes the interpolated [`ScreenPose`] to the element's [`Visual`]. It
//! runs every frame, independently of the fixed tick, so transition
//! animations keep playing while the orbit integration is paused.

use crate::components::tween::TweenPose;
use crate::components::visual::{ScreenPose, Visual};
use crate::resources::worldtime::WorldTime;
use bevy_ecs::prelude::*;

/// Cubic ease-in-out of tween progress `t`, clamped to 0..=1.
pub(crate) fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let p = 2.0 * t - 2.0;
        0.5 * p * p * p + 1.0
    }
}

pub(crate) fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate every field of a pose.
pub(crate) fn lerp_pose(a: ScreenPose, b: ScreenPose, t: f32) -> ScreenPose {
    ScreenPose {
        left: lerp_f32(a.left, b.left, t),
        top: lerp_f32(a.top, b.top, t),
        scale: lerp_f32(a.scale, b.scale, t),
        opacity: lerp_f32(a.opacity, b.opacity, t),
    }
}

/// Sample a tween after advancing it by `dt` seconds.
///
/// A zero-length tween jumps straight to its end pose.
pub(crate) fn sample(tw: &mut TweenPose, dt: f32) -> ScreenPose {
    tw.time = (tw.time + dt).min(tw.duration.max(0.0));
    if tw.time >= tw.duration {
        tw.playing = false;
        return tw.to;
    }
    let t = ease(tw.time / tw.duration);
    lerp_pose(tw.from, tw.to, t)
}

/// Animate element poses based on [`TweenPose`] components.
pub fn tween_pose_system(
    world_time: Res<WorldTime>,
    mut query: Query<(&mut TweenPose, &mut Visual)>,
) {
    let dt = world_time.delta.max(0.0);
    for (mut tw, mut visual) in query.iter_mut() {
        if !tw.playing {
            continue;
        }
        let pose = sample(&mut tw, dt);
        visual.apply(pose);
    }
}
