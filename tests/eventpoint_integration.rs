//! Event system integration tests: crossings, guards, locks and delayed
//! commits, driven through `MotionSystem` with an in-memory store.

use std::sync::{Arc, Mutex};

use orbitengine::components::activeelement::{ElementId, ViewerId};
use orbitengine::components::eventpoints::{EventAction, angular_distance};
use orbitengine::resources::memorystore::MemoryStore;
use orbitengine::resources::rendertarget::{Notification, RenderTarget};
use orbitengine::resources::store::{
    ElementKind, ElementRecord, EntityStore, GroupConfig, MachineState, StateMachine,
};
use orbitengine::{ElementSpawn, MotionSystem};

const FRAME: f32 = 1.0 / 60.0;

#[derive(Clone, Default)]
struct Recorder {
    notes: Arc<Mutex<Vec<Notification>>>,
}

impl Recorder {
    fn notes(&self) -> Vec<Notification> {
        self.notes.lock().unwrap().clone()
    }

    fn cues(&self) -> usize {
        self.notes()
            .iter()
            .filter(|n| matches!(n, Notification::TransitionCue { .. }))
            .count()
    }

    fn crossings(&self) -> Vec<(EventAction, f32)> {
        self.notes()
            .into_iter()
            .filter_map(|n| match n {
                Notification::EventPointCrossed { action, angle, .. } => Some((action, angle)),
                _ => None,
            })
            .collect()
    }
}

impl RenderTarget for Recorder {
    fn set_position(&mut self, _left: f32, _top: f32) {}
    fn set_transform(&mut self, _scale: f32) {}
    fn set_opacity(&mut self, _opacity: f32) {}
    fn dispatch(&mut self, notification: Notification) {
        self.notes.lock().unwrap().push(notification);
    }
}

fn state(id: &str, angle: Option<f32>, demanded: Option<&str>) -> MachineState {
    MachineState {
        id: id.into(),
        trigger_angle: angle,
        demanded_emoji: demanded.map(String::from),
    }
}

/// Ungrouped element 6 flipping between "a" (45°) and "b" (225°).
fn free_store() -> MemoryStore {
    let store = MemoryStore::new();
    let mut rec = ElementRecord::new(ElementId(6));
    rec.state_machine = Some(StateMachine {
        states: vec![state("a", Some(45.0), None), state("b", Some(225.0), None)],
        current_state_id: Some("a".into()),
    });
    store.insert(rec);
    store
}

/// Group 1 with the inventory check and member 2, hungry for an apple.
fn guarded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let mut group = ElementRecord::new(ElementId(1));
    group.group = Some(GroupConfig {
        inventory_check: true,
        ..GroupConfig::default()
    });
    store.insert(group);

    let mut rec = ElementRecord::new(ElementId(2));
    rec.owner_group = Some(ElementId(1));
    rec.viewer = Some(ViewerId(1));
    rec.state_machine = Some(StateMachine {
        states: vec![
            state("hungry", Some(90.0), Some("🍎")),
            state("fed", Some(270.0), None),
        ],
        current_state_id: Some("hungry".into()),
    });
    store.insert(rec);
    store
}

fn apple(store: &MemoryStore, grouped: bool) {
    let mut marker = ElementRecord::new(ElementId(3));
    marker.kind = ElementKind::Emoji;
    marker.emoji = Some("🍎".into());
    marker.viewer = Some(ViewerId(1));
    marker.owner_group = grouped.then_some(ElementId(1));
    store.insert(marker);
}

fn spawn(motion: &mut MotionSystem, id: u64) -> Recorder {
    let rec = Recorder::default();
    motion.add_element(ElementId(id), Box::new(rec.clone()), ElementSpawn::default());
    rec
}

fn run(motion: &mut MotionSystem, frames: usize) {
    for _ in 0..frames {
        motion.advance(FRAME);
    }
}

#[test]
fn unguarded_crossings_commit_after_cue() {
    let store = free_store();
    let mut motion = MotionSystem::default().with_store(store.clone());
    let rec = spawn(&mut motion, 6);
    assert_eq!(motion.event_point_count(ElementId(6)), Some(2));

    run(&mut motion, 2000);
    assert!(rec.cues() >= 1);
    assert!(store.update_count() >= 1);
    for (action, angle) in rec.crossings() {
        assert!((0.0..360.0).contains(&angle));
        assert!(matches!(action, EventAction::TransitionTo(_)));
    }
}

#[test]
fn commit_waits_for_delay() {
    let store = free_store();
    let mut motion = MotionSystem::default().with_store(store.clone());
    let rec = spawn(&mut motion, 6);
    let mut ticks = 0;
    while rec.cues() == 0 && ticks < 2000 {
        motion.tick();
        ticks += 1;
    }
    assert_eq!(rec.cues(), 1, "no cue within {ticks} ticks");
    assert_eq!(store.update_count(), 0, "commit must not run with the cue");

    let cue_state = rec
        .notes()
        .iter()
        .find_map(|n| match n {
            Notification::TransitionCue { to_state, .. } => Some(to_state.clone()),
            _ => None,
        })
        .unwrap();
    motion.advance(0.5);
    assert_eq!(store.update_count(), 1);
    assert_eq!(
        store.get_element(ElementId(6)).unwrap().current_state_id(),
        Some(cue_state.as_str())
    );
}

#[test]
fn removal_cancels_pending_commit() {
    let store = free_store();
    let mut motion = MotionSystem::default().with_store(store.clone());
    let rec = spawn(&mut motion, 6);
    for _ in 0..2000 {
        if rec.cues() > 0 {
            break;
        }
        motion.tick();
    }
    assert_eq!(rec.cues(), 1);
    motion.remove_element(ElementId(6));
    motion.advance(1.0);
    assert_eq!(store.update_count(), 0);
    assert_eq!(
        store.get_element(ElementId(6)).unwrap().current_state_id(),
        Some("a")
    );
}

#[test]
fn guarded_transition_blocked_without_marker() {
    let store = guarded_store();
    let mut motion = MotionSystem::default().with_store(store.clone());
    let rec = spawn(&mut motion, 2);
    run(&mut motion, 2000);
    assert!(!rec.crossings().is_empty(), "crossings are still reported");
    assert_eq!(rec.cues(), 0);
    assert_eq!(store.update_count(), 0);
}

#[test]
fn guarded_transition_blocked_by_ungrouped_marker() {
    let store = guarded_store();
    apple(&store, false);
    let mut motion = MotionSystem::default().with_store(store.clone());
    spawn(&mut motion, 2);
    run(&mut motion, 2000);
    assert_eq!(store.update_count(), 0);
}

#[test]
fn guarded_transition_commits_with_marker() {
    let store = guarded_store();
    apple(&store, true);
    let mut motion = MotionSystem::default().with_store(store.clone());
    let rec = spawn(&mut motion, 2);
    run(&mut motion, 2000);
    assert_eq!(store.update_count(), 1);
    assert_eq!(rec.cues(), 1);
    assert_eq!(
        store.get_element(ElementId(2)).unwrap().current_state_id(),
        Some("fed")
    );
}

#[test]
fn locked_elements_never_commit() {
    let store = free_store();
    store.modify(ElementId(6), |r| r.satisfaction_locked = true);
    let mut motion = MotionSystem::default().with_store(store.clone());
    let rec = spawn(&mut motion, 6);
    assert_eq!(motion.event_point_count(ElementId(6)), Some(0));
    run(&mut motion, 2000);
    assert!(rec.notes().is_empty());
    assert_eq!(store.update_count(), 0);
}

#[test]
fn lock_set_after_setup_blocks_execution() {
    let store = free_store();
    let mut motion = MotionSystem::default().with_store(store.clone());
    let rec = spawn(&mut motion, 6);
    store.modify(ElementId(6), |r| r.satisfaction_locked = true);
    run(&mut motion, 2000);
    assert!(!rec.crossings().is_empty());
    assert_eq!(rec.cues(), 0);
    assert_eq!(store.update_count(), 0);
}

#[test]
fn crossings_respect_debounce() {
    let store = free_store();
    let mut motion = MotionSystem::default().with_store(store);
    let rec = spawn(&mut motion, 6);
    run(&mut motion, 3000);
    let crossings = rec.crossings();
    assert!(crossings.len() >= 2);
    for pair in crossings.windows(2) {
        assert!(angular_distance(pair[0].1, pair[1].1) >= 3.0 - 1e-3);
    }
}

#[test]
fn refresh_picks_up_new_states() {
    let store = MemoryStore::new();
    store.insert(ElementRecord::new(ElementId(8)));
    let mut motion = MotionSystem::default().with_store(store.clone());
    spawn(&mut motion, 8);
    assert_eq!(motion.event_point_count(ElementId(8)), Some(0));

    store.modify(ElementId(8), |r| {
        r.state_machine = Some(StateMachine {
            states: vec![state("x", Some(10.0), None), state("y", Some(200.0), None)],
            current_state_id: None,
        });
    });
    assert!(motion.refresh_event_points(ElementId(8)));
    assert_eq!(motion.event_point_count(ElementId(8)), Some(2));
    assert!(!motion.refresh_event_points(ElementId(99)));
}

#[test]
fn elements_without_store_get_no_points() {
    let mut motion = MotionSystem::default();
    spawn(&mut motion, 6);
    assert_eq!(motion.event_point_count(ElementId(6)), Some(0));
    run(&mut motion, 100);
}

#[test]
fn reverse_orbit_crosses_each_point_once_per_revolution() {
    let store = free_store();
    let mut group = ElementRecord::new(ElementId(1));
    group.group = Some(GroupConfig {
        speed_multiplier: -1.0,
        ..GroupConfig::default()
    });
    store.insert(group);
    store.modify(ElementId(6), |r| r.owner_group = Some(ElementId(1)));

    let mut motion = MotionSystem::default().with_store(store);
    let rec = spawn(&mut motion, 6);
    let start = motion.clock_position(ElementId(6)).unwrap();
    // Under one revolution at the fastest clock rate.
    for _ in 0..390 {
        motion.tick();
    }
    assert_ne!(motion.clock_position(ElementId(6)).unwrap(), start);
    assert!(rec.crossings().len() <= 2, "got {:?}", rec.crossings());
}
