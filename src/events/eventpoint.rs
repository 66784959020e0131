//! Event-point notifications.
//!
//! [`event_point_system`](crate::systems::eventpoints::event_point_system)
//! triggers these when an element's clock angle crosses one of its event
//! points. The observers in [`crate::systems::eventpoints`] forward them to
//! the element's render target; hosts may register extra observers on the
//! motion world to react in-process.
//!
//! # Example
//!
//! ```ignore
//! motion.world_mut().add_observer(|trigger: On<TransitionCueEvent>| {
//!     log::info!("{} flips to {}", trigger.event().element, trigger.event().to_state);
//! });
//! ```

use bevy_ecs::prelude::*;

use crate::components::activeelement::ElementId;
use crate::components::eventpoints::EventAction;

/// Emitted for every crossing, whether or not its action ran.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EventPointCrossedEvent {
    pub entity: Entity,
    pub element: ElementId,
    pub action: EventAction,
    /// Clock angle at the check that detected the crossing.
    pub angle: f32,
}

/// Emitted just before a state change is scheduled for commit.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct TransitionCueEvent {
    pub entity: Entity,
    pub element: ElementId,
    pub to_state: String,
}
