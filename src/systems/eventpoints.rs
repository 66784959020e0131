//! Event-point setup, crossing detection and action execution.
//!
//! Event points are derived from the element's state machine as the store
//! currently describes it (see [`build_event_points`]). Every tick,
//! [`event_point_system`] compares each element's clock angle with the angle
//! of its last check and runs the action of every point swept over.
//!
//! A `TransitionTo` action that clears the lock and guard triggers a
//! [`TransitionCueEvent`] immediately and commits the state through the
//! store after `commit_delay` seconds. Every crossing, accepted or not,
//! triggers an [`EventPointCrossedEvent`].

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::activeelement::{ActiveElement, ElementId, ViewerId};
use crate::components::eventpoints::{
    EventAction, EventGuard, EventPoint, EventPoints, angular_distance, swept,
};
use crate::components::orbit::Orbit;
use crate::components::visual::Visual;
use crate::events::eventpoint::{EventPointCrossedEvent, TransitionCueEvent};
use crate::resources::groupstate::GroupStates;
use crate::resources::motionconfig::MotionConfig;
use crate::resources::rendertarget::Notification;
use crate::resources::scheduler::{Scheduler, Task};
use crate::resources::store::{ElementRecord, EntityStore, Store};
use crate::resources::worldtime::WorldTime;
use crate::systems::orbit::group_frame;

/// Build the event points of `id` from its state machine.
///
/// `fallback_group` is used when the record names no owner group. Locked
/// elements and unknown ids get an empty list.
pub fn build_event_points(
    store: &dyn EntityStore,
    id: ElementId,
    fallback_group: Option<ElementId>,
) -> EventPoints {
    let Some(record) = store.get_element(id) else {
        return EventPoints::default();
    };
    if record.satisfaction_locked {
        return EventPoints::default();
    }
    let Some(machine) = record.state_machine.as_ref() else {
        return EventPoints::default();
    };

    let guard = record
        .owner_group
        .or(fallback_group)
        .and_then(|g| store.get_group(g))
        .filter(|g| g.inventory_check)
        .map(|_| EventGuard::InventoryCheck);

    let points = machine
        .states
        .iter()
        .filter_map(|state| {
            let angle = state.trigger_angle?;
            Some(EventPoint {
                trigger_angle: angle.rem_euclid(360.0),
                action: EventAction::TransitionTo(state.id.clone()),
                guard,
            })
        })
        .collect();

    EventPoints {
        points,
        last_angle: None,
    }
}

/// Record the angle `current` and return the points crossed since the last
/// accepted check, in the direction the clock actually moved.
///
/// The first check only records the angle. A move shorter than `debounce`
/// degrees is ignored without updating the stored angle, so slow motion
/// accumulates until it clears the threshold.
pub fn check_event_points(
    points: &mut EventPoints,
    current: f32,
    debounce: f32,
) -> Vec<EventPoint> {
    let Some(last) = points.last_angle else {
        points.last_angle = Some(current);
        return Vec::new();
    };
    if angular_distance(last, current) < debounce {
        return Vec::new();
    }
    points.last_angle = Some(current);
    points
        .points
        .iter()
        .filter(|p| swept(last, current, p.trigger_angle))
        .cloned()
        .collect()
}

/// Inventory guard: some grouped marker in the same viewing context must
/// carry the emoji the element's current state demands.
///
/// Store failures are logged and fail closed.
pub fn inventory_satisfied(
    store: &dyn EntityStore,
    record: &ElementRecord,
    viewer: Option<ViewerId>,
) -> bool {
    let Some(demanded) = record
        .current_state()
        .and_then(|s| s.demanded_emoji.as_deref())
    else {
        return false;
    };
    let Some(viewer) = record.viewer.or(viewer) else {
        return false;
    };
    match store.elements_in_viewing_context(viewer) {
        Ok(siblings) => siblings.iter().any(|s| {
            s.id != record.id
                && s.kind.is_inventory_marker()
                && s.owner_group.is_some()
                && s.emoji.as_deref() == Some(demanded)
        }),
        Err(e) => {
            warn!("inventory check for {} failed: {}", record.id, e);
            false
        }
    }
}

/// Decide whether a crossed point's action runs. Returns the state to
/// commit, if any.
pub fn execute_event_action(
    store: &dyn EntityStore,
    element: &ActiveElement,
    point: &EventPoint,
) -> Option<String> {
    let record = store.get_element(element.id)?;
    if record.satisfaction_locked {
        return None;
    }
    if let Some(EventGuard::InventoryCheck) = point.guard {
        if !inventory_satisfied(store, &record, element.viewer) {
            debug!("{} guard blocked {:?}", element.id, point.action);
            return None;
        }
    }
    match &point.action {
        EventAction::TransitionTo(state) => {
            if record.current_state_id() == Some(state.as_str()) {
                None
            } else {
                Some(state.clone())
            }
        }
    }
}

/// Check every running element for event-point crossings.
pub fn event_point_system(
    mut commands: Commands,
    store: Option<Res<Store>>,
    config: Res<MotionConfig>,
    groups: Res<GroupStates>,
    world_time: Res<WorldTime>,
    mut scheduler: ResMut<Scheduler>,
    mut query: Query<(Entity, &ActiveElement, &Orbit, &mut EventPoints)>,
) {
    let Some(store) = store.as_deref() else {
        return;
    };
    let store: &dyn EntityStore = &**store;
    for (entity, element, orbit, mut points) in query.iter_mut() {
        if points.is_empty() || group_frame(Some(store), &groups, element).is_none() {
            continue;
        }
        let angle = orbit.clock_position();
        for point in check_event_points(&mut points, angle, config.debounce_degrees) {
            if let Some(state) = execute_event_action(store, element, &point) {
                debug!("{} crossed {:.1}°, committing '{}'", element.id, angle, state);
                commands.trigger(TransitionCueEvent {
                    entity,
                    element: element.id,
                    to_state: state.clone(),
                });
                scheduler.cancel_for_element(element.id);
                scheduler.schedule_at(
                    world_time.elapsed + f64::from(config.commit_delay),
                    Task::CommitState {
                        element: element.id,
                        state,
                    },
                );
            }
            commands.trigger(EventPointCrossedEvent {
                entity,
                element: element.id,
                action: point.action,
                angle,
            });
        }
    }
}

/// Forward crossings to the element's render target.
pub fn forward_event_point_crossed(
    trigger: On<EventPointCrossedEvent>,
    mut visuals: Query<&mut Visual>,
) {
    let event = trigger.event();
    if let Ok(mut visual) = visuals.get_mut(event.entity) {
        visual.dispatch(Notification::EventPointCrossed {
            element: event.element,
            action: event.action.clone(),
            angle: event.angle,
        });
    }
}

/// Forward transition cues to the element's render target.
pub fn forward_transition_cue(trigger: On<TransitionCueEvent>, mut visuals: Query<&mut Visual>) {
    let event = trigger.event();
    if let Ok(mut visual) = visuals.get_mut(event.entity) {
        visual.dispatch(Notification::TransitionCue {
            element: event.element,
            to_state: event.to_state.clone(),
        });
    }
}
