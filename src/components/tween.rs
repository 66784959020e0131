//! Tween component for transition animations.
//!
//! Group transitions move elements on screen directly, bypassing the orbit
//! integration. A [`TweenPose`] interpolates a whole [`ScreenPose`]
//! (position, scale and opacity) from `from` to `to` over `duration` seconds
//! with a cubic ease-in-out curve. It plays once and then holds its end pose until
//! the owning transition removes it.
//!
//! See [`crate::systems::tween`] for the update system.

use bevy_ecs::prelude::Component;

use crate::components::visual::ScreenPose;

/// Animates an element's on-screen pose between two values.
#[derive(Component, Clone, Debug)]
pub struct TweenPose {
    pub from: ScreenPose,
    pub to: ScreenPose,
    /// Seconds from `from` to `to`.
    pub duration: f32,
    /// Whether the tween is still advancing.
    pub playing: bool,
    /// Seconds elapsed within the tween.
    pub time: f32,
}

impl TweenPose {
    pub fn new(from: ScreenPose, to: ScreenPose, duration: f32) -> Self {
        TweenPose {
            from,
            to,
            duration,
            playing: true,
            time: 0.0,
        }
    }
}
