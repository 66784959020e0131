//! Delayed task execution.
//!
//! [`run_due_tasks`] pops every task due at the current
//! [`WorldTime::elapsed`] from the [`Scheduler`] and runs it against the
//! world. It is called once per host frame, after time has advanced.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::activeelement::ElementId;
use crate::resources::scheduler::{Scheduler, Task};
use crate::resources::store::{ElementPatch, Store};
use crate::resources::worldtime::WorldTime;
use crate::systems::transition::{finish_angle_transition, finish_composure};

/// Write a state change to the store. Failures are logged and dropped.
fn commit_state(world: &World, element: ElementId, state: String) {
    let Some(store) = world.get_resource::<Store>() else {
        return;
    };
    let patch = ElementPatch {
        current_state_id: Some(state.clone()),
    };
    match store.update_element(element, patch) {
        Ok(()) => debug!("{} committed state '{}'", element, state),
        Err(e) => warn!("failed to commit state '{}' for {}: {}", state, element, e),
    }
}

/// Run every task that has come due. Returns how many ran.
pub fn run_due_tasks(world: &mut World) -> usize {
    let now = world.resource::<WorldTime>().elapsed;
    let due = world.resource_mut::<Scheduler>().take_due(now);
    let count = due.len();
    for (id, task) in due {
        match task {
            Task::CommitState { element, state } => commit_state(world, element, state),
            Task::FinishAngleTransition { group } => {
                finish_angle_transition(world, group, id);
            }
            Task::FinishComposure { group } => {
                finish_composure(world, group, id);
            }
        }
    }
    count
}
