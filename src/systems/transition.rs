//! Group layout transitions.
//!
//! Two kinds of transition move a group's members on screen with
//! [`TweenPose`] animations while the orbit integration stands aside:
//!
//! - **Angle mode** ([`transition_angle_mode`]): members glide from their
//!   current pose to where the new projection will put them. The whole core
//!   is paused until [`finish_angle_transition`] clears the record.
//! - **Composure** ([`transition_composure`]): splaying saves every member's
//!   kinematic state and lays non-drone members out in a two-column grid;
//!   retracting restores the saved state exactly and animates back to it.
//!
//! Completion runs as a scheduled [`Task`] so it is deterministic and can be
//! cancelled. Every entry point returns `false` and changes nothing when its
//! preconditions fail.
//!
//! The explicit per-group hold ([`pause_group`]/[`resume_group`]) lives here
//! as well; it is independent of the composure pause.

use std::mem;

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::activeelement::{ActiveElement, ElementId};
use crate::components::kinematics::Kinematics;
use crate::components::orbit::Orbit;
use crate::components::tween::TweenPose;
use crate::components::visual::{ScreenPose, Visual};
use crate::resources::elementindex::ElementIndex;
use crate::resources::groupstate::{ComposurePhase, GroupStates, SavedPose, SplaySnapshot};
use crate::resources::motionconfig::MotionConfig;
use crate::resources::scheduler::{Scheduler, Task, TaskId};
use crate::resources::store::{AngleMode, Composure, GroupConfig, Store};
use crate::resources::transitions::{AngleTransitions, TransitionRecord};
use crate::resources::worldtime::WorldTime;
use crate::systems::orbit::{project, settled};

/// Snapshot of one active member, read before any mutation.
struct Member {
    id: ElementId,
    entity: Entity,
    kin: Kinematics,
    orbit: Orbit,
    pose: ScreenPose,
    viewer_center: f32,
    drone: bool,
}

/// Group configuration plus its active members, in store order.
fn read_group(world: &World, group: ElementId) -> Option<(GroupConfig, Vec<Member>)> {
    let store = world.get_resource::<Store>()?;
    let config = store.get_group(group)?;
    let index = world.resource::<ElementIndex>();
    let members = store
        .elements_in_group(group)
        .into_iter()
        .filter_map(|id| {
            let entity = index.get(id)?;
            Some(Member {
                id,
                entity,
                kin: *world.get::<Kinematics>(entity)?,
                orbit: world.get::<Orbit>(entity)?.clone(),
                pose: world.get::<Visual>(entity)?.pose(),
                viewer_center: world
                    .get::<ActiveElement>(entity)
                    .map_or(0.0, ActiveElement::viewer_center),
                drone: store.get_element(id).is_some_and(|r| r.kind.is_drone()),
            })
        })
        .collect();
    Some((config, members))
}

fn start_tween(world: &mut World, entity: Entity, from: ScreenPose, to: ScreenPose, duration: f32) {
    if let Ok(mut e) = world.get_entity_mut(entity) {
        e.insert(TweenPose::new(from, to, duration));
    }
}

/// Remove an element's tween, snapping it to the end pose if it was still
/// playing.
fn finish_tween(world: &mut World, entity: Entity) {
    let Ok(mut e) = world.get_entity_mut(entity) else {
        return;
    };
    let Some(tween) = e.take::<TweenPose>() else {
        return;
    };
    if tween.playing {
        if let Some(mut visual) = e.get_mut::<Visual>() {
            visual.apply(tween.to);
        }
    }
}

fn now(world: &World) -> f64 {
    world.resource::<WorldTime>().elapsed
}

/// Animate a group's members into another projection.
///
/// Requires a store, an existing group with motion enabled, and a group that
/// is neither configured nor animated as splayed. A second transition for the
/// same group replaces the first.
pub fn transition_angle_mode(
    world: &mut World,
    group: ElementId,
    from: AngleMode,
    to: AngleMode,
    duration: f32,
) -> bool {
    let Some((config, members)) = read_group(world, group) else {
        return false;
    };
    if !config.motion_enabled || config.composure == Composure::Splayed {
        return false;
    }
    if world.resource::<GroupStates>().phase(group).is_spread() {
        return false;
    }

    let cfg = world.resource::<MotionConfig>().clone();
    let duration = duration.max(0.0);
    let start = now(world);
    for m in &members {
        let target = project(&settled(&m.kin, &m.orbit, to, &cfg), to, &cfg);
        start_tween(world, m.entity, m.pose, target, duration);
    }

    let finish = world.resource_mut::<Scheduler>().schedule_at(
        start + f64::from(duration + cfg.settle_margin),
        Task::FinishAngleTransition { group },
    );
    let record = TransitionRecord {
        group,
        from,
        to,
        start,
        duration,
        elements: members.iter().map(|m| m.id).collect(),
        finish,
    };
    if let Some(replaced) = world.resource_mut::<AngleTransitions>().insert(record) {
        world.resource_mut::<Scheduler>().cancel(replaced.finish);
    }
    debug!(
        "group {} angle {:?} -> {:?} over {}s ({} members)",
        group,
        from,
        to,
        duration,
        members.len()
    );
    true
}

/// Clear an angle transition and hand its members back to the orbit.
///
/// Ignored unless `task` is the record's current completion task.
pub fn finish_angle_transition(world: &mut World, group: ElementId, task: TaskId) -> bool {
    let current = world
        .resource::<AngleTransitions>()
        .get(group)
        .is_some_and(|r| r.finish == task);
    if !current {
        return false;
    }
    let Some(record) = world.resource_mut::<AngleTransitions>().remove(group) else {
        return false;
    };

    // A splay started meanwhile owns the members' tweens now.
    if world.resource::<GroupStates>().phase(group).is_spread() {
        return true;
    }

    let cfg = world.resource::<MotionConfig>().clone();
    let entities: Vec<Entity> = {
        let index = world.resource::<ElementIndex>();
        record.elements.iter().filter_map(|id| index.get(*id)).collect()
    };
    for entity in entities {
        finish_tween(world, entity);
        let Some(orbit) = world.get::<Orbit>(entity).cloned() else {
            continue;
        };
        let pose = {
            let Some(mut kin) = world.get_mut::<Kinematics>(entity) else {
                continue;
            };
            *kin = settled(&kin, &orbit, record.to, &cfg);
            project(&kin, record.to, &cfg)
        };
        if let Some(mut visual) = world.get_mut::<Visual>(entity) {
            visual.apply(pose);
        }
    }
    debug!("group {} angle transition finished", group);
    true
}

/// Grid slots for `n` members: two columns around `cx`, rows centered on `cy`.
///
/// Members fill rows left to right; an odd last member sits in the left column.
pub fn grid_slots(n: usize, cx: f32, cy: f32, config: &MotionConfig) -> Vec<(f32, f32)> {
    let rows = n.div_ceil(2);
    let height = rows.saturating_sub(1) as f32 * config.row_spacing;
    let top = cy - height * 0.5;
    let half = config.column_spacing * 0.5;
    (0..n)
        .map(|i| {
            let x = if i % 2 == 0 { cx - half } else { cx + half };
            (x, top + (i / 2) as f32 * config.row_spacing)
        })
        .collect()
}

/// Splay a group into its grid or retract it back into orbit.
pub fn transition_composure(
    world: &mut World,
    group: ElementId,
    from: Composure,
    to: Composure,
    duration: f32,
) -> bool {
    if from == to {
        return false;
    }
    let Some((config, members)) = read_group(world, group) else {
        return false;
    };
    if !config.motion_enabled {
        return false;
    }
    let duration = duration.max(0.0);
    match to {
        Composure::Splayed => splay(world, group, &config, members, duration),
        Composure::Retracted => retract(world, group, &config, duration),
    }
}

fn splay(
    world: &mut World,
    group: ElementId,
    config: &GroupConfig,
    members: Vec<Member>,
    duration: f32,
) -> bool {
    let pending = match world.resource::<GroupStates>().phase(group) {
        ComposurePhase::Retracted => None,
        // Retracting already restored the saved state; snapshot it afresh.
        ComposurePhase::Retracting { finish, .. } => Some(*finish),
        ComposurePhase::Splaying { .. } | ComposurePhase::Splayed { .. } => return false,
    };
    if members.is_empty() {
        return false;
    }
    if let Some(task) = pending {
        world.resource_mut::<Scheduler>().cancel(task);
    }

    let cfg = world.resource::<MotionConfig>().clone();
    let snapshot: SplaySnapshot = members
        .iter()
        .map(|m| {
            let saved = SavedPose {
                pos: m.kin.pos,
                base: m.kin.base,
                scale: m.kin.scale,
                opacity: m.kin.opacity,
            };
            (m.id, saved)
        })
        .collect();

    let listed: Vec<&Member> = members.iter().filter(|m| !m.drone).collect();
    let cx = config.x + listed.first().map_or(0.0, |m| m.viewer_center);
    let slots = grid_slots(listed.len(), cx, config.y, &cfg);
    for (m, (left, top)) in listed.iter().zip(slots) {
        let target = ScreenPose {
            left,
            top,
            scale: 1.0,
            opacity: 1.0,
        };
        start_tween(world, m.entity, m.pose, target, duration);
    }

    let due = now(world) + f64::from(duration);
    let finish = world
        .resource_mut::<Scheduler>()
        .schedule_at(due, Task::FinishComposure { group });
    world
        .resource_mut::<GroupStates>()
        .set_phase(group, ComposurePhase::Splaying { snapshot, finish });
    debug!("group {} splaying {} members", group, listed.len());
    true
}

fn retract(world: &mut World, group: ElementId, config: &GroupConfig, duration: f32) -> bool {
    let (snapshot, pending) = match world.resource::<GroupStates>().phase(group) {
        ComposurePhase::Splaying { snapshot, finish } => (snapshot.clone(), Some(*finish)),
        ComposurePhase::Splayed { snapshot } => (snapshot.clone(), None),
        ComposurePhase::Retracted | ComposurePhase::Retracting { .. } => return false,
    };
    if let Some(task) = pending {
        world.resource_mut::<Scheduler>().cancel(task);
    }

    let cfg = world.resource::<MotionConfig>().clone();
    let restored: Vec<(Entity, SavedPose, bool)> = {
        let Some(store) = world.get_resource::<Store>() else {
            return false;
        };
        let index = world.resource::<ElementIndex>();
        snapshot
            .iter()
            .filter_map(|(id, saved)| {
                let entity = index.get(*id)?;
                let drone = store.get_element(*id).is_some_and(|r| r.kind.is_drone());
                Some((entity, *saved, drone))
            })
            .collect()
    };

    for (entity, saved, drone) in restored {
        let target = {
            let Some(mut kin) = world.get_mut::<Kinematics>(entity) else {
                continue;
            };
            kin.pos = saved.pos;
            kin.base = saved.base;
            kin.scale = saved.scale;
            kin.opacity = saved.opacity;
            project(&kin, config.angle_mode, &cfg)
        };
        if drone {
            continue;
        }
        let Some(from) = world.get::<Visual>(entity).map(Visual::pose) else {
            continue;
        };
        start_tween(world, entity, from, target, duration);
    }

    let due = now(world) + f64::from(duration);
    let finish = world
        .resource_mut::<Scheduler>()
        .schedule_at(due, Task::FinishComposure { group });
    world
        .resource_mut::<GroupStates>()
        .set_phase(group, ComposurePhase::Retracting { snapshot, finish });
    debug!("group {} retracting", group);
    true
}

/// Complete a splay or retract animation.
///
/// Ignored unless `task` is the group's pending completion task.
pub fn finish_composure(world: &mut World, group: ElementId, task: TaskId) -> bool {
    if world.resource::<GroupStates>().phase(group).pending_task() != Some(task) {
        return false;
    }
    let phase = mem::take(&mut world.resource_mut::<GroupStates>().entry(group).phase);
    let (next, members) = match phase {
        ComposurePhase::Splaying { snapshot, .. } => {
            let members: Vec<ElementId> = snapshot.keys().copied().collect();
            (ComposurePhase::Splayed { snapshot }, members)
        }
        ComposurePhase::Retracting { snapshot, .. } => {
            (ComposurePhase::Retracted, snapshot.into_keys().collect())
        }
        other => (other, Vec::new()),
    };
    world.resource_mut::<GroupStates>().set_phase(group, next);

    let entities: Vec<Entity> = {
        let index = world.resource::<ElementIndex>();
        members.iter().filter_map(|id| index.get(*id)).collect()
    };
    for entity in entities {
        finish_tween(world, entity);
    }
    debug!("group {} composure settled", group);
    true
}

/// Hold a group's members still until [`resume_group`].
pub fn pause_group(world: &mut World, group: ElementId) {
    world.resource_mut::<GroupStates>().set_held(group, true);
}

pub fn resume_group(world: &mut World, group: ElementId) {
    world.resource_mut::<GroupStates>().set_held(group, false);
}

/// Whether the explicit hold is set. Composure pauses are not reported.
pub fn is_group_paused(world: &World, group: ElementId) -> bool {
    world.resource::<GroupStates>().is_held(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_grid_slots_two_columns_centered() {
        let cfg = MotionConfig::new();
        let slots = grid_slots(4, 100.0, 200.0, &cfg);
        assert_eq!(slots.len(), 4);
        let half = cfg.column_spacing * 0.5;
        assert!(approx_eq(slots[0].0, 100.0 - half));
        assert!(approx_eq(slots[1].0, 100.0 + half));
        assert!(approx_eq(slots[0].1, slots[1].1));
        let mid = (slots[0].1 + slots[3].1) * 0.5;
        assert!(approx_eq(mid, 200.0));
    }

    #[test]
    fn test_grid_slots_odd_and_single() {
        let cfg = MotionConfig::new();
        let one = grid_slots(1, 0.0, 50.0, &cfg);
        assert!(approx_eq(one[0].1, 50.0));
        let three = grid_slots(3, 0.0, 0.0, &cfg);
        assert!(approx_eq(three[2].0, three[0].0));
        assert!(approx_eq(three[2].1 - three[0].1, cfg.row_spacing));
        assert!(grid_slots(0, 0.0, 0.0, &cfg).is_empty());
    }

    #[test]
    fn test_hold_flag() {
        let mut world = World::new();
        world.insert_resource(GroupStates::default());
        let g = ElementId(3);
        assert!(!is_group_paused(&world, g));
        pause_group(&mut world, g);
        assert!(is_group_paused(&world, g));
        resume_group(&mut world, g);
        assert!(!is_group_paused(&world, g));
    }
}
