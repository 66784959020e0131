//! Orbital parameters of an active element.
//!
//! Every element circles its base anchor on two decorative orbits:
//! - an xy-plane orbit (small radius) that makes it wobble in place
//! - a z-axis orbit that drives depth, and therefore scale and opacity
//!
//! The z-phase is also the element's "clock": [`Orbit::clock_position`] maps
//! it to a 0–360° compass angle that event points are matched against.
//!
//! Parameters are drawn from fixed ranges with a generator seeded by the
//! element id, so the same element always gets the same orbit.

use std::f32::consts::TAU;

use bevy_ecs::prelude::Component;
use fastrand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::activeelement::ElementId;

const ORBIT_SPEED: (f32, f32) = (0.010, 0.025);
const Z_SPEED: (f32, f32) = (0.008, 0.016);
const DRIFT_SPEED: (f32, f32) = (0.001, 0.003);
const RADIUS_JITTER: (f32, f32) = (0.8, 1.2);
const MIN_SCALE: (f32, f32) = (0.70, 0.80);
const MAX_SCALE: (f32, f32) = (1.00, 1.10);

/// Semantic vertical tendency of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Buoyancy {
    #[default]
    Normal,
    /// Floats above its anchor.
    Buoyant,
    /// Sinks below its anchor.
    Antibuoyant,
}

/// Concrete orbit radii and bias for a [`Buoyancy`] category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitPreset {
    pub orbit_radius: f32,
    pub z_radius: f32,
    /// Vertical offset from the anchor. Negative is up (screen space).
    pub vertical_bias: f32,
}

impl Buoyancy {
    pub fn preset(self) -> OrbitPreset {
        match self {
            Buoyancy::Normal => OrbitPreset {
                orbit_radius: 6.0,
                z_radius: 30.0,
                vertical_bias: 0.0,
            },
            Buoyancy::Buoyant => OrbitPreset {
                orbit_radius: 4.0,
                z_radius: 24.0,
                vertical_bias: -14.0,
            },
            Buoyancy::Antibuoyant => OrbitPreset {
                orbit_radius: 8.0,
                z_radius: 36.0,
                vertical_bias: 14.0,
            },
        }
    }
}

/// Per-element orbital state, advanced once per tick.
#[derive(Component, Clone, Debug)]
pub struct Orbit {
    /// Ticks this element has been simulated.
    pub time: u64,
    pub orbit_radius: f32,
    /// Radians per tick.
    pub orbit_speed: f32,
    pub orbit_phase: f32,
    pub z_radius: f32,
    /// Radians per tick.
    pub z_speed: f32,
    pub z_phase: f32,
    pub drift_speed: f32,
    pub drift_phase: f32,
    /// Phase of the vertical bias wave, wrapped to `[0, TAU)`.
    pub wave_phase: f32,
    /// Zero for now, so drift contributes nothing to the position.
    pub drift_radius: f32,
    pub vertical_bias: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Per-element multiplier applied on top of buoyancy presets.
    pub radius_jitter: f32,
}

/// Sample a random f32 in the range [min, max].
#[inline]
fn random_f32_range(rng: &mut Rng, (min, max): (f32, f32)) -> f32 {
    let range = max - min;
    if range < f32::EPSILON {
        return min;
    }
    min + rng.f32() * range
}

impl Orbit {
    /// Draw an orbit for `id`, stable for a given `salt`.
    pub fn seeded(id: ElementId, buoyancy: Buoyancy, salt: u64) -> Self {
        let mut rng = Rng::with_seed(id.0.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ salt);
        let mut orbit = Orbit {
            time: 0,
            orbit_radius: 0.0,
            orbit_speed: random_f32_range(&mut rng, ORBIT_SPEED),
            orbit_phase: rng.f32() * TAU,
            z_radius: 0.0,
            z_speed: random_f32_range(&mut rng, Z_SPEED),
            z_phase: rng.f32() * TAU,
            drift_speed: random_f32_range(&mut rng, DRIFT_SPEED),
            drift_phase: rng.f32() * TAU,
            wave_phase: 0.0,
            drift_radius: 0.0,
            vertical_bias: 0.0,
            min_scale: random_f32_range(&mut rng, MIN_SCALE),
            max_scale: random_f32_range(&mut rng, MAX_SCALE),
            radius_jitter: random_f32_range(&mut rng, RADIUS_JITTER),
        };
        orbit.apply_buoyancy(buoyancy);
        orbit
    }

    /// Re-derive radii and vertical bias from a buoyancy category.
    pub fn apply_buoyancy(&mut self, buoyancy: Buoyancy) {
        let preset = buoyancy.preset();
        self.orbit_radius = preset.orbit_radius * self.radius_jitter;
        self.z_radius = preset.z_radius * self.radius_jitter;
        self.vertical_bias = preset.vertical_bias;
    }

    /// Scale halfway between the configured bounds.
    pub fn rest_scale(&self) -> f32 {
        (self.min_scale + self.max_scale) * 0.5
    }

    /// The z-phase as a compass angle in `[0, 360)`, 0° being 12 o'clock.
    pub fn clock_position(&self) -> f32 {
        clock_from_phase(self.z_phase)
    }
}

/// Map a phase in radians to a compass angle in `[0, 360)`.
pub fn clock_from_phase(phase: f32) -> f32 {
    let degrees = (phase.to_degrees() + 90.0).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if degrees >= 360.0 { 0.0 } else { degrees }
}
