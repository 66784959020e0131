//! Orbit engine library.
//!
//! A fixed-rate orbital motion simulation for clusters of visual elements.
//! [`motion::MotionSystem`] is the entry point; the ECS components,
//! resources, systems and events it is built from are exposed for hosts and
//! integration tests.

pub mod components;
pub mod events;
pub mod motion;
pub mod resources;
pub mod systems;

pub use motion::{AnchorUpdate, ElementSpawn, MotionSystem};
