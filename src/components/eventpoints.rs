//! Angular trigger points attached to an active element.
//!
//! Each element carries an [`EventPoints`] list built from its state machine:
//! one [`EventPoint`] per state that declares a trigger angle. When the
//! element's clock angle sweeps across a point, the point's [`EventAction`]
//! runs, provided its optional [`EventGuard`] allows it.
//!
//! # Crossing rule
//!
//! A step from `from` to `to` travels the short way round, clockwise when
//! [`signed_delta`] is positive. A clockwise step crosses `target` when
//! - the interval does not wrap and `from < target <= to`, or
//! - the interval wraps past 360° and `target > from || target <= to`.
//!
//! A counter-clockwise step covers `[to, from)` instead, so a point sitting
//! on the boundary between two steps fires once in either direction.
//!
//! # Related
//!
//! - [`crate::systems::eventpoints`] – crossing detection and execution

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

/// What happens when an event point is crossed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventAction {
    /// Set the element's current state-machine state to the named one.
    TransitionTo(String),
}

/// Predicate evaluated at execution time before an action may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventGuard {
    /// Requires a grouped marker sibling carrying the current state's
    /// demanded emoji in the same viewing context.
    InventoryCheck,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventPoint {
    /// Degrees in `[0, 360)`.
    pub trigger_angle: f32,
    pub action: EventAction,
    pub guard: Option<EventGuard>,
}

/// Ordered trigger points of one element plus the angle of its last check.
#[derive(Component, Clone, Debug, Default)]
pub struct EventPoints {
    pub points: SmallVec<[EventPoint; 4]>,
    /// Clock angle at the last check that was not debounced.
    pub last_angle: Option<f32>,
}

impl EventPoints {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Returns `true` if moving clockwise from `from` to `to` passes `target`.
pub fn crossed(from: f32, to: f32, target: f32) -> bool {
    if from <= to {
        target > from && target <= to
    } else {
        target > from || target <= to
    }
}

/// Returns `true` if the short step from `from` to `to` passes `target`,
/// in whichever direction the step went.
pub fn swept(from: f32, to: f32, target: f32) -> bool {
    if signed_delta(from, to) >= 0.0 {
        crossed(from, to, target)
    } else {
        target == to || (crossed(to, from, target) && target != from)
    }
}

/// Signed short-way difference `to - from`, in `(-180, 180]`. Positive is
/// clockwise.
pub fn signed_delta(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Shortest distance between two compass angles, in `[0, 180]`.
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let d = (b - a).rem_euclid(360.0);
    if d > 180.0 { 360.0 - d } else { d }
}
