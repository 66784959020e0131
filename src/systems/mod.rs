//! Motion systems.
//!
//! This module groups the ECS systems and world-level routines that advance
//! the simulation.
//!
//! Submodules overview
//! - [`eventpoints`] – event-point setup, crossing checks and action execution
//! - [`orbit`] – per-tick orbit integration, containment and projection
//! - [`scheduler`] – run delayed tasks once they come due
//! - [`time`] – update simulation time and delta
//! - [`transition`] – angle-mode and composure transitions, group holds
//! - [`tween`] – animate screen poses during transitions

pub mod eventpoints;
pub mod orbit;
pub mod scheduler;
pub mod time;
pub mod transition;
pub mod tween;
