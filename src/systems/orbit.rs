//! Orbit integration system.
//!
//! [`orbit_system`] runs once per fixed tick. For every active element whose
//! group is not paused it:
//!
//! 1. refreshes the base anchor from the group's current anchor
//! 2. advances the orbit phases (scaled by the group's speed multiplier)
//! 3. eases the current position toward base + orbit offsets
//! 4. softly recalls the base anchor into the element's [`Bounds`]
//! 5. derives scale and opacity from depth and writes the projected
//!    [`ScreenPose`] to the element's [`Visual`]
//!
//! The math lives in free functions so transitions can project the same
//! poses the tick would produce.

use std::f32::consts::TAU;

use bevy_ecs::prelude::*;

use crate::components::activeelement::ActiveElement;
use crate::components::bounds::Bounds;
use crate::components::kinematics::{Kinematics, Vec3};
use crate::components::orbit::Orbit;
use crate::components::visual::{ScreenPose, Visual};
use crate::resources::groupstate::GroupStates;
use crate::resources::motionconfig::MotionConfig;
use crate::resources::store::{AngleMode, EntityStore, Store};

/// Group-derived inputs to one element's update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupFrame {
    /// Absolute anchor the element's base follows, if grouped.
    pub anchor: Option<(f32, f32)>,
    pub speed: f32,
    pub mode: AngleMode,
}

impl GroupFrame {
    pub const UNGROUPED: GroupFrame = GroupFrame {
        anchor: None,
        speed: 1.0,
        mode: AngleMode::Flat,
    };
}

/// Read the element's group fresh from the store.
///
/// Returns `None` when the element must be skipped this tick: its group is
/// paused (held or spread) or has motion disabled. A grouped element whose
/// group cannot be read moves as if ungrouped.
pub fn group_frame(
    store: Option<&dyn EntityStore>,
    groups: &GroupStates,
    element: &ActiveElement,
) -> Option<GroupFrame> {
    let Some(group) = element.group else {
        return Some(GroupFrame::UNGROUPED);
    };
    if groups.is_paused(group) {
        return None;
    }
    let Some(config) = store.and_then(|s| s.get_group(group)) else {
        return Some(GroupFrame::UNGROUPED);
    };
    if !config.motion_enabled {
        return None;
    }
    Some(GroupFrame {
        anchor: Some((config.x + element.viewer_center(), config.y)),
        speed: config.speed_multiplier,
        mode: config.angle_mode,
    })
}

/// Advance the time counter and all phases by one tick. `wave_rate` is the
/// bias wave's radians per tick and ignores the group speed.
pub fn advance_orbit(orbit: &mut Orbit, speed: f32, wave_rate: f32) {
    orbit.time = orbit.time.wrapping_add(1);
    orbit.orbit_phase = (orbit.orbit_phase + orbit.orbit_speed * speed).rem_euclid(TAU);
    orbit.z_phase = (orbit.z_phase + orbit.z_speed * speed).rem_euclid(TAU);
    orbit.drift_phase = (orbit.drift_phase + orbit.drift_speed).rem_euclid(TAU);
    orbit.wave_phase = (orbit.wave_phase + wave_rate).rem_euclid(TAU);
}

/// Position the orbit currently pulls the element toward.
pub fn orbit_target(base: Vec3, orbit: &Orbit, mode: AngleMode, config: &MotionConfig) -> Vec3 {
    let ox = orbit.orbit_phase.cos() * orbit.orbit_radius;
    let oy = orbit.orbit_phase.sin() * orbit.orbit_radius;
    let oz = orbit.z_phase.sin() * orbit.z_radius;
    let side = match mode {
        AngleMode::Flat => 0.0,
        AngleMode::Side => orbit.z_phase.cos() * config.side_radius,
    };
    let dx = orbit.drift_phase.cos() * orbit.drift_radius;
    let dy = orbit.drift_phase.sin() * orbit.drift_radius;
    let wave = orbit.vertical_bias
        + orbit.wave_phase.sin() * config.bias_wave_amplitude;
    Vec3::new(
        base.x + ox + side + dx,
        base.y + oy + dy + wave,
        base.z + oz,
    )
}

/// Move the current position a fixed fraction of the way to `target`.
pub fn ease_toward(kin: &mut Kinematics, target: Vec3, config: &MotionConfig) {
    kin.pos.x += (target.x - kin.pos.x) * config.xy_ease;
    kin.pos.y += (target.y - kin.pos.y) * config.xy_ease;
    kin.pos.z += (target.z - kin.pos.z) * config.z_ease;
}

/// Recall the base anchor toward the inside of `bounds` when the element
/// has left them. The current position is never clamped.
pub fn contain(kin: &mut Kinematics, bounds: &Bounds, config: &MotionConfig) {
    let margin = config.containment_margin;
    let nudge = config.containment_nudge;

    if kin.pos.x > bounds.max_x {
        let goal = bounds.max_x - margin;
        if kin.base.x > goal {
            kin.base.x += (goal - kin.base.x) * nudge;
        }
    } else if kin.pos.x < bounds.min_x {
        let goal = bounds.min_x + margin;
        if kin.base.x < goal {
            kin.base.x += (goal - kin.base.x) * nudge;
        }
    }

    if kin.pos.y > bounds.max_y {
        let goal = bounds.max_y - margin;
        if kin.base.y > goal {
            kin.base.y += (goal - kin.base.y) * nudge;
        }
    } else if kin.pos.y < bounds.min_y {
        let goal = bounds.min_y + margin;
        if kin.base.y < goal {
            kin.base.y += (goal - kin.base.y) * nudge;
        }
    }
}

/// Scale for a depth, relative to the element's base depth.
pub fn depth_scale(depth: f32, orbit: &Orbit, config: &MotionConfig) -> f32 {
    let window = config.depth_window.max(f32::EPSILON);
    let t = ((depth + window) / (2.0 * window)).clamp(0.0, 1.0);
    orbit.min_scale + (orbit.max_scale - orbit.min_scale) * t
}

/// Opacity as an affine function of scale: `opacity_floor` at the minimum
/// scale, fully opaque at the maximum.
pub fn scale_opacity(scale: f32, orbit: &Orbit, config: &MotionConfig) -> f32 {
    let span = (orbit.max_scale - orbit.min_scale).max(f32::EPSILON);
    let t = (scale - orbit.min_scale) / span;
    (config.opacity_floor + (1.0 - config.opacity_floor) * t).clamp(0.0, 1.0)
}

/// Refresh scale and opacity from the current depth.
pub fn derive_visuals(kin: &mut Kinematics, orbit: &Orbit, config: &MotionConfig) {
    kin.scale = depth_scale(kin.pos.z - kin.base.z, orbit, config);
    kin.opacity = scale_opacity(kin.scale, orbit, config);
}

/// Screen placement of an element in the given angle mode.
pub fn project(kin: &Kinematics, mode: AngleMode, config: &MotionConfig) -> ScreenPose {
    let top = match mode {
        AngleMode::Flat => kin.pos.y - kin.pos.z * config.flat_depth_lift,
        AngleMode::Side => kin.base.y - kin.pos.z * config.side_depth_lift,
    };
    ScreenPose {
        left: kin.pos.x,
        top,
        scale: kin.scale,
        opacity: kin.opacity,
    }
}

/// The state an element settles into if it sat exactly on its orbit target.
pub fn settled(kin: &Kinematics, orbit: &Orbit, mode: AngleMode, config: &MotionConfig) -> Kinematics {
    let mut out = *kin;
    out.pos = orbit_target(kin.base, orbit, mode, config);
    derive_visuals(&mut out, orbit, config);
    out
}

/// One full tick of an element. Returns the pose to write.
pub fn step_element(
    kin: &mut Kinematics,
    orbit: &mut Orbit,
    bounds: Option<&Bounds>,
    frame: &GroupFrame,
    config: &MotionConfig,
) -> ScreenPose {
    if let Some((x, y)) = frame.anchor {
        kin.base.x = x;
        kin.base.y = y;
    }
    advance_orbit(orbit, frame.speed, config.bias_wave_rate);
    let target = orbit_target(kin.base, orbit, frame.mode, config);
    ease_toward(kin, target, config);
    if let Some(bounds) = bounds {
        contain(kin, bounds, config);
    }
    derive_visuals(kin, orbit, config);
    project(kin, frame.mode, config)
}

/// Integrate every active element by one tick.
pub fn orbit_system(
    store: Option<Res<Store>>,
    config: Res<MotionConfig>,
    groups: Res<GroupStates>,
    mut query: Query<(
        &ActiveElement,
        &mut Kinematics,
        &mut Orbit,
        Option<&Bounds>,
        &mut Visual,
    )>,
) {
    let store: Option<&dyn EntityStore> = store.as_deref().map(|s| &**s);
    for (element, mut kin, mut orbit, bounds, mut visual) in query.iter_mut() {
        let Some(frame) = group_frame(store, &groups, element) else {
            continue;
        };
        if kin.hold_ticks > 0 {
            kin.hold_ticks -= 1;
            continue;
        }
        let pose = step_element(&mut kin, &mut orbit, bounds, &frame, &config);
        visual.apply(pose);
    }
}
