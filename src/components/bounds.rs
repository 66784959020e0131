use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Axis-aligned region an element's base anchor is softly recalled into.
///
/// Elements without this component are never contained.
#[derive(Component, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Bounds {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}
