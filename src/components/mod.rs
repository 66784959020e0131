//! ECS components for active elements.
//!
//! Every mounted visual element registered with the motion core is an entity
//! carrying these components.
//!
//! Submodules overview:
//! - [`activeelement`] – identity, owning group and viewer of an element
//! - [`bounds`] – soft containment region for the base anchor
//! - [`eventpoints`] – angular trigger points and crossing detection
//! - [`kinematics`] – current/base position, scale and opacity
//! - [`orbit`] – seeded orbital parameters and buoyancy presets
//! - [`tween`] – screen-pose tweens used by group transitions
//! - [`visual`] – the render target handle and last written pose

pub mod activeelement;
pub mod bounds;
pub mod eventpoints;
pub mod kinematics;
pub mod orbit;
pub mod tween;
pub mod visual;
