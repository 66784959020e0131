//! Transition system integration tests: composure round trips, angle-mode
//! transitions with global pause, group holds and failure no-ops.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use orbitengine::components::activeelement::{ElementId, ViewerId};
use orbitengine::components::kinematics::Kinematics;
use orbitengine::components::visual::ScreenPose;
use orbitengine::resources::groupstate::ComposurePhase;
use orbitengine::resources::memorystore::MemoryStore;
use orbitengine::resources::motionconfig::MotionConfig;
use orbitengine::resources::rendertarget::{Notification, RenderTarget};
use orbitengine::resources::store::{AngleMode, Composure, ElementKind, ElementRecord, GroupConfig};
use orbitengine::resources::worldtime::WorldTime;
use orbitengine::systems::transition::grid_slots;
use orbitengine::{ElementSpawn, MotionSystem};

const EPSILON: f32 = 1e-3;
const FRAME: f32 = 1.0 / 60.0;
const GROUP: ElementId = ElementId(1);

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Clone, Default)]
struct Recorder {
    positions: Arc<Mutex<Vec<(f32, f32)>>>,
}

impl RenderTarget for Recorder {
    fn set_position(&mut self, left: f32, top: f32) {
        self.positions.lock().unwrap().push((left, top));
    }
    fn set_transform(&mut self, _scale: f32) {}
    fn set_opacity(&mut self, _opacity: f32) {}
    fn dispatch(&mut self, _notification: Notification) {}
}

/// Group 1 at (200, 150) with circles 2 and 3, drone 4 and an ungrouped 9.
fn scene() -> (MemoryStore, MotionSystem) {
    let store = MemoryStore::new();
    let mut group = ElementRecord::new(GROUP);
    group.group = Some(GroupConfig {
        x: 200.0,
        y: 150.0,
        ..GroupConfig::default()
    });
    store.insert(group);
    for (id, kind) in [
        (2, ElementKind::Circle),
        (3, ElementKind::Square),
        (4, ElementKind::Drone),
    ] {
        let mut rec = ElementRecord::new(ElementId(id));
        rec.kind = kind;
        rec.owner_group = Some(GROUP);
        rec.viewer = Some(ViewerId(1));
        store.insert(rec);
    }
    store.insert(ElementRecord::new(ElementId(9)));

    let mut motion = MotionSystem::default().with_store(store.clone());
    for id in [2, 3, 4] {
        motion.add_element(
            ElementId(id),
            Box::new(Recorder::default()),
            ElementSpawn::in_group(GROUP),
        );
    }
    motion.add_element(
        ElementId(9),
        Box::new(Recorder::default()),
        ElementSpawn::at(500.0, 500.0),
    );
    for _ in 0..90 {
        motion.advance(FRAME);
    }
    (store, motion)
}

fn run_until(motion: &mut MotionSystem, max_frames: usize, done: impl Fn(&MotionSystem) -> bool) {
    for _ in 0..max_frames {
        if done(motion) {
            return;
        }
        motion.advance(FRAME);
    }
}

fn poses(motion: &MotionSystem, ids: &[u64]) -> Vec<Kinematics> {
    ids.iter()
        .map(|id| motion.pose(ElementId(*id)).unwrap())
        .collect()
}

fn splayed(motion: &MotionSystem) -> bool {
    matches!(motion.composure_phase(GROUP), ComposurePhase::Splayed { .. })
}

fn retracted(motion: &MotionSystem) -> bool {
    matches!(motion.composure_phase(GROUP), ComposurePhase::Retracted)
}

#[test]
fn composure_round_trip_restores_members() {
    let (_store, mut motion) = scene();
    let before = poses(&motion, &[2, 3, 4]);

    assert!(motion.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 0.5));
    assert!(matches!(
        motion.composure_phase(GROUP),
        ComposurePhase::Splaying { .. }
    ));
    assert!(motion.has_splay_snapshot(GROUP));
    run_until(&mut motion, 120, splayed);
    assert!(splayed(&motion));

    // Members sit still while splayed.
    let during = poses(&motion, &[2, 3, 4]);
    for (a, b) in before.iter().zip(&during) {
        assert_eq!(a.pos, b.pos);
    }

    assert!(motion.transition_composure(GROUP, Composure::Splayed, Composure::Retracted, 0.5));
    for (id, saved) in [2, 3, 4].iter().zip(&before) {
        let kin = motion.pose(ElementId(*id)).unwrap();
        assert_eq!(kin.pos, saved.pos);
        assert_eq!(kin.base, saved.base);
        assert_eq!(kin.scale, saved.scale);
        assert_eq!(kin.opacity, saved.opacity);
    }

    run_until(&mut motion, 120, retracted);
    assert!(retracted(&motion));
    assert!(!motion.has_splay_snapshot(GROUP));
    for (id, saved) in [2, 3].iter().zip(&before) {
        let kin = motion.pose(ElementId(*id)).unwrap();
        assert!((kin.pos.x - saved.pos.x).abs() < 1.0);
        assert!((kin.pos.y - saved.pos.y).abs() < 1.0);
        assert!((kin.scale - saved.scale).abs() < 0.01);
        assert!((kin.opacity - saved.opacity).abs() < 0.05);
    }
}

#[test]
fn splay_lays_out_non_drones_in_grid() {
    let (_store, mut motion) = scene();
    let drone_before = motion.screen_pose(ElementId(4)).unwrap();
    motion.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 0.3);
    run_until(&mut motion, 120, splayed);

    let slots = grid_slots(2, 200.0, 150.0, &MotionConfig::new());
    for (id, (left, top)) in [2, 3].iter().zip(slots) {
        let pose = motion.screen_pose(ElementId(*id)).unwrap();
        assert!(approx_eq(pose.left, left), "{id}: {} vs {left}", pose.left);
        assert!(approx_eq(pose.top, top));
        assert!(approx_eq(pose.scale, 1.0));
        assert!(approx_eq(pose.opacity, 1.0));
    }
    assert_eq!(motion.screen_pose(ElementId(4)).unwrap(), drone_before);
}

#[test]
fn splay_reversal_cancels_pending_completion() {
    let (_store, mut motion) = scene();
    let before = poses(&motion, &[2, 3]);
    motion.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 1.0);
    for _ in 0..10 {
        motion.advance(FRAME);
    }
    assert!(motion.transition_composure(GROUP, Composure::Splayed, Composure::Retracted, 0.2));
    assert!(matches!(
        motion.composure_phase(GROUP),
        ComposurePhase::Retracting { .. }
    ));
    run_until(&mut motion, 120, retracted);
    assert!(retracted(&motion));
    for _ in 0..90 {
        motion.advance(FRAME);
    }
    assert!(retracted(&motion), "stale splay completion must not fire");
    assert_ne!(motion.pose(ElementId(2)).unwrap().pos, before[0].pos);
}

#[test]
fn composure_preconditions_are_no_ops() {
    let (store, mut motion) = scene();
    assert!(!motion.transition_composure(GROUP, Composure::Splayed, Composure::Retracted, 0.3));
    assert!(!motion.transition_composure(GROUP, Composure::Retracted, Composure::Retracted, 0.3));
    assert!(!motion.transition_composure(
        ElementId(77),
        Composure::Retracted,
        Composure::Splayed,
        0.3
    ));

    // A group without active members.
    let mut empty = ElementRecord::new(ElementId(20));
    empty.group = Some(GroupConfig::default());
    store.insert(empty);
    assert!(!motion.transition_composure(
        ElementId(20),
        Composure::Retracted,
        Composure::Splayed,
        0.3
    ));

    store.modify_group(GROUP, |g| g.motion_enabled = false);
    assert!(!motion.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 0.3));
    assert!(retracted(&motion));

    let mut bare = MotionSystem::default();
    assert!(!bare.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 0.3));
    assert!(!bare.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.3));
}

#[test]
fn angle_transition_pauses_everything_until_settled() {
    let (store, mut motion) = scene();
    assert!(motion.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.4));
    store.modify_group(GROUP, |g| g.angle_mode = AngleMode::Side);
    assert!(motion.is_paused_for_transition());

    let outsider = motion.pose(ElementId(9)).unwrap();
    for _ in 0..12 {
        motion.advance(FRAME);
    }
    assert_eq!(motion.pose(ElementId(9)).unwrap().pos, outsider.pos);

    run_until(&mut motion, 120, |m| !m.is_paused_for_transition());
    assert!(!motion.is_paused_for_transition());
    for _ in 0..5 {
        motion.advance(FRAME);
    }
    assert_ne!(motion.pose(ElementId(9)).unwrap().pos, outsider.pos);
}

#[test]
fn angle_transition_tweens_members() {
    let (_store, mut motion) = scene();
    let start: ScreenPose = motion.screen_pose(ElementId(2)).unwrap();
    motion.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.5);
    for _ in 0..15 {
        motion.advance(FRAME);
    }
    assert_ne!(motion.screen_pose(ElementId(2)).unwrap(), start);
}

#[test]
fn angle_transition_refused_while_splayed() {
    let (_store, mut motion) = scene();
    motion.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 0.2);
    assert!(!motion.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.3));
    run_until(&mut motion, 60, splayed);
    assert!(!motion.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.3));

    let (store2, mut motion2) = scene();
    store2.modify_group(GROUP, |g| g.composure = Composure::Splayed);
    assert!(!motion2.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.3));
    assert!(!motion2.is_paused_for_transition());
}

#[test]
fn repeated_angle_transition_replaces_record() {
    let (_store, mut motion) = scene();
    motion.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.2);
    for _ in 0..6 {
        motion.advance(FRAME);
    }
    motion.transition_angle_mode(GROUP, AngleMode::Side, AngleMode::Flat, 0.5);
    // The first completion time passes without clearing the second record.
    for _ in 0..12 {
        motion.advance(FRAME);
    }
    assert!(motion.is_paused_for_transition());
    run_until(&mut motion, 120, |m| !m.is_paused_for_transition());
    assert!(!motion.is_paused_for_transition());
}

#[test]
fn hold_and_composure_pause_are_independent() {
    let (_store, mut motion) = scene();
    motion.pause(GROUP);
    motion.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 0.1);
    run_until(&mut motion, 60, splayed);
    motion.resume(GROUP);
    assert!(!motion.is_paused(GROUP));

    let held = poses(&motion, &[2]);
    for _ in 0..20 {
        motion.advance(FRAME);
    }
    assert_eq!(poses(&motion, &[2])[0].pos, held[0].pos, "still splayed");
}

#[test]
fn removal_mid_splay_is_detached() {
    let (_store, mut motion) = scene();
    motion.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 0.3);
    assert!(motion.remove_element(ElementId(3)));
    run_until(&mut motion, 60, splayed);
    assert!(splayed(&motion));
    let snapshot = motion.composure_phase(GROUP).snapshot().unwrap();
    assert!(!snapshot.contains_key(&ElementId(3)));
    assert_eq!(snapshot.len(), 2);

    assert!(motion.transition_composure(GROUP, Composure::Splayed, Composure::Retracted, 0.3));
    run_until(&mut motion, 60, retracted);
    assert!(retracted(&motion));
}

#[test]
fn removal_mid_angle_transition_still_clears_pause() {
    let (_store, mut motion) = scene();
    motion.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.3);
    motion.remove_element(ElementId(2));
    motion.remove_element(ElementId(3));
    run_until(&mut motion, 60, |m| !m.is_paused_for_transition());
    assert!(!motion.is_paused_for_transition());
}

#[test]
fn transitions_settle_after_long_uptime() {
    let (_store, mut motion) = scene();
    motion.world_mut().resource_mut::<WorldTime>().elapsed = 530_000.0;

    assert!(motion.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.3));
    run_until(&mut motion, 60, |m| !m.is_paused_for_transition());
    assert!(!motion.is_paused_for_transition());

    assert!(motion.transition_composure(GROUP, Composure::Retracted, Composure::Splayed, 0.3));
    run_until(&mut motion, 60, splayed);
    assert!(splayed(&motion));
    assert!(motion.world().resource::<WorldTime>().elapsed > 530_000.5);
}

#[test]
fn paused_ticks_are_not_counted() {
    let (_store, mut motion) = scene();
    let before = motion.ticks();
    assert!(motion.transition_angle_mode(GROUP, AngleMode::Flat, AngleMode::Side, 0.4));
    for _ in 0..12 {
        motion.advance(FRAME);
    }
    motion.tick();
    assert_eq!(motion.ticks(), before);

    run_until(&mut motion, 120, |m| !m.is_paused_for_transition());
    let resumed = motion.ticks();
    motion.tick();
    assert_eq!(motion.ticks(), resumed + 1);
}
