//! Event types exchanged inside a motion world.
//!
//! Systems trigger events through `Commands::trigger`; observers registered
//! by [`MotionSystem::new`](crate::motion::MotionSystem::new) forward them to
//! the view layer.
//!
//! Submodules:
//! - [`eventpoint`] – crossing and transition-cue notifications
pub mod eventpoint;
