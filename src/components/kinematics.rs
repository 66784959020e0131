//! Kinematic state of an active element.
//!
//! [`Kinematics`] holds where an element currently is, where it wants to rest
//! (its base anchor) and the visual scale/opacity derived from its depth. The
//! `z` axis is decorative: it drives scale and fade, not real occlusion.

use bevy_ecs::prelude::Component;

/// Three-component vector used for positions and anchors.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }
}

/// Current and resting position of an element plus its derived visual values.
#[derive(Component, Clone, Copy, Debug)]
pub struct Kinematics {
    /// Where the element is drawn this tick (before screen projection).
    pub pos: Vec3,
    /// Group-relative resting point the orbit is computed around.
    pub base: Vec3,
    /// Scale derived from depth on the last update.
    pub scale: f32,
    /// Opacity derived from scale on the last update.
    pub opacity: f32,
    /// Ticks to skip orbital integration for (set by direct anchor moves).
    pub hold_ticks: u8,
}

impl Kinematics {
    /// Create a state resting at `base`, drawn exactly there.
    pub fn at(base: Vec3, scale: f32) -> Self {
        Kinematics {
            pos: base,
            base,
            scale,
            opacity: 1.0,
            hold_ticks: 0,
        }
    }
}
