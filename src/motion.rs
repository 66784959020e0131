//! The motion system facade.
//!
//! [`MotionSystem`] owns one bevy_ecs [`World`] holding every active element
//! plus two schedules:
//!
//! - `tick` runs at the fixed tick rate: [`orbit_system`] then
//!   [`event_point_system`], skipped entirely while an angle transition is in
//!   flight.
//! - `frame` runs once per [`MotionSystem::advance`] call and plays the
//!   transition tweens.
//!
//! The host drives time explicitly through [`MotionSystem::advance`], so any
//! number of independent systems can coexist and tests are deterministic.
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryStore::load("demos/scene.json")?;
//! let mut motion = MotionSystem::new(MotionConfig::new()).with_store(store);
//! motion.add_element(ElementId(2), Box::new(target), ElementSpawn::in_group(ElementId(1)));
//! loop {
//!     motion.advance(1.0 / 60.0);
//! }
//! ```

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::activeelement::{ActiveElement, ElementId, ViewerId};
use crate::components::bounds::Bounds;
use crate::components::eventpoints::EventPoints;
use crate::components::kinematics::{Kinematics, Vec3};
use crate::components::orbit::{Buoyancy, Orbit};
use crate::components::visual::{ScreenPose, Visual};
use crate::resources::elementindex::ElementIndex;
use crate::resources::groupstate::{ComposurePhase, GroupStates};
use crate::resources::motionconfig::MotionConfig;
use crate::resources::rendertarget::RenderTarget;
use crate::resources::scheduler::Scheduler;
use crate::resources::store::{AngleMode, Composure, EntityStore, Store};
use crate::resources::tickclock::TickClock;
use crate::resources::transitions::{AngleTransitions, not_paused_for_transition};
use crate::resources::worldtime::WorldTime;
use crate::systems::eventpoints::{
    build_event_points, event_point_system, forward_event_point_crossed, forward_transition_cue,
};
use crate::systems::orbit::{derive_visuals, orbit_system, project};
use crate::systems::scheduler::run_due_tasks;
use crate::systems::time::update_world_time;
use crate::systems::transition::{
    is_group_paused, pause_group, resume_group, transition_angle_mode, transition_composure,
};
use crate::systems::tween::tween_pose_system;

/// Optional registration parameters of an element.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElementSpawn {
    pub bounds: Option<Bounds>,
    /// Falls back to the record's owner group when `None`.
    pub group: Option<ElementId>,
    pub viewer: Option<ViewerId>,
    pub viewer_width: Option<f32>,
    /// Initial anchor of an ungrouped element.
    pub origin: Option<(f32, f32)>,
}

impl ElementSpawn {
    pub fn in_group(group: ElementId) -> Self {
        ElementSpawn {
            group: Some(group),
            ..Default::default()
        }
    }

    pub fn at(x: f32, y: f32) -> Self {
        ElementSpawn {
            origin: Some((x, y)),
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_viewer(mut self, viewer: ViewerId, width: f32) -> Self {
        self.viewer = Some(viewer);
        self.viewer_width = Some(width);
        self
    }
}

/// Direct base-anchor move requested by the host (e.g. after a drag).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorUpdate {
    pub id: ElementId,
    pub x: f32,
    pub y: f32,
}

pub struct MotionSystem {
    world: World,
    tick: Schedule,
    frame: Schedule,
}

impl Default for MotionSystem {
    fn default() -> Self {
        Self::new(MotionConfig::new())
    }
}

impl MotionSystem {
    /// Create an empty simulation. No store is attached yet.
    pub fn new(config: MotionConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(TickClock::new(config.tick_rate, config.max_catch_up));
        world.insert_resource(config);
        world.insert_resource(WorldTime::default());
        world.init_resource::<ElementIndex>();
        world.init_resource::<GroupStates>();
        world.init_resource::<AngleTransitions>();
        world.init_resource::<Scheduler>();

        world.spawn(Observer::new(forward_event_point_crossed));
        world.spawn(Observer::new(forward_transition_cue));
        // Observers must exist before the first tick triggers anything.
        world.flush();

        let mut tick = Schedule::default();
        tick.add_systems(
            (orbit_system, event_point_system)
                .chain()
                .run_if(not_paused_for_transition),
        );
        let mut frame = Schedule::default();
        frame.add_systems(tween_pose_system);

        MotionSystem { world, tick, frame }
    }

    pub fn with_store(mut self, store: impl EntityStore + 'static) -> Self {
        self.set_store(Box::new(store));
        self
    }

    pub fn set_store(&mut self, store: Box<dyn EntityStore>) {
        self.world.insert_resource(Store(store));
    }

    pub fn config(&self) -> &MotionConfig {
        self.world.resource::<MotionConfig>()
    }

    fn store(&self) -> Option<&dyn EntityStore> {
        self.world.get_resource::<Store>().map(|s| &**s)
    }

    fn entity(&self, id: ElementId) -> Option<Entity> {
        self.world.resource::<ElementIndex>().get(id)
    }

    fn group_mode(&self, group: Option<ElementId>) -> AngleMode {
        group
            .and_then(|g| self.store()?.get_group(g))
            .map_or(AngleMode::Flat, |g| g.angle_mode)
    }

    /// Register an element and start animating it.
    ///
    /// Returns `false` if `id` is already active.
    pub fn add_element(
        &mut self,
        id: ElementId,
        target: Box<dyn RenderTarget>,
        spawn: ElementSpawn,
    ) -> bool {
        if self.entity(id).is_some() {
            return false;
        }
        let cfg = self.config().clone();
        let record = self.store().and_then(|s| s.get_element(id));
        let group = spawn
            .group
            .or_else(|| record.as_ref().and_then(|r| r.owner_group));
        let viewer = spawn.viewer.or_else(|| record.as_ref().and_then(|r| r.viewer));
        let buoyancy = record.as_ref().map_or(Buoyancy::Normal, |r| r.buoyancy);

        let element = ActiveElement {
            id,
            group,
            viewer,
            viewer_width: spawn.viewer_width,
        };
        let group_config = group.and_then(|g| self.store()?.get_group(g));
        let (x, y) = match &group_config {
            Some(g) => (g.x + element.viewer_center(), g.y),
            None => spawn.origin.unwrap_or((0.0, 0.0)),
        };
        let mode = group_config.as_ref().map_or(AngleMode::Flat, |g| g.angle_mode);

        let orbit = Orbit::seeded(id, buoyancy, cfg.seed_salt);
        let mut kin = Kinematics::at(Vec3::new(x, y, 0.0), orbit.rest_scale());
        derive_visuals(&mut kin, &orbit, &cfg);
        let points = self
            .store()
            .map(|s| build_event_points(s, id, group))
            .unwrap_or_default();
        let mut visual = Visual::new(target);
        visual.apply(project(&kin, mode, &cfg));

        let point_count = points.len();
        let mut entity = self.world.spawn((element, kin, orbit, visual, points));
        if let Some(bounds) = spawn.bounds {
            entity.insert(bounds);
        }
        let entity = entity.id();
        self.world.resource_mut::<ElementIndex>().insert(id, entity);
        self.world.resource_mut::<TickClock>().start();
        debug!(
            "added {} (group {:?}, {} event points)",
            id, group, point_count
        );
        true
    }

    /// Unregister an element, leaving its target fully opaque.
    ///
    /// Pending commits for it are cancelled and it is detached from any
    /// in-flight transition or splay snapshot.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let Some(entity) = self.world.resource_mut::<ElementIndex>().remove(id) else {
            return false;
        };
        if let Some(mut visual) = self.world.get_mut::<Visual>(entity) {
            visual.set_opacity(1.0);
        }
        self.world.despawn(entity);
        self.world.resource_mut::<Scheduler>().cancel_for_element(id);
        self.world.resource_mut::<AngleTransitions>().forget_element(id);
        self.world.resource_mut::<GroupStates>().forget_element(id);
        if self.world.resource::<ElementIndex>().is_empty() {
            self.world.resource_mut::<TickClock>().stop();
        }
        debug!("removed {}", id);
        true
    }

    /// Advance simulated time by `dt` seconds.
    ///
    /// Plays tweens, runs due tasks, then as many fixed ticks as are owed.
    pub fn advance(&mut self, dt: f32) {
        let dt = update_world_time(&mut self.world, dt);
        self.frame.run(&mut self.world);
        run_due_tasks(&mut self.world);
        let due = self.world.resource_mut::<TickClock>().accumulate(dt);
        for _ in 0..due {
            self.tick();
        }
    }

    /// Run exactly one fixed tick. Ticks skipped while an angle transition
    /// pauses the core are not counted.
    pub fn tick(&mut self) {
        if self.is_paused_for_transition() {
            return;
        }
        self.tick.run(&mut self.world);
        self.world.resource_mut::<TickClock>().ticks += 1;
    }

    /// Whether the fixed-rate loop is running.
    pub fn is_running(&self) -> bool {
        self.world.resource::<TickClock>().running
    }

    /// Fixed ticks actually run.
    pub fn ticks(&self) -> u64 {
        self.world.resource::<TickClock>().ticks
    }

    pub fn active_count(&self) -> usize {
        self.world.resource::<ElementIndex>().len()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.entity(id).is_some()
    }

    pub fn pose(&self, id: ElementId) -> Option<Kinematics> {
        self.world.get::<Kinematics>(self.entity(id)?).copied()
    }

    /// The pose last written to the element's render target.
    pub fn screen_pose(&self, id: ElementId) -> Option<ScreenPose> {
        self.world.get::<Visual>(self.entity(id)?).map(Visual::pose)
    }

    /// Clock angle of the element in `[0, 360)`.
    pub fn clock_position(&self, id: ElementId) -> Option<f32> {
        self.world
            .get::<Orbit>(self.entity(id)?)
            .map(Orbit::clock_position)
    }

    pub fn event_point_count(&self, id: ElementId) -> Option<usize> {
        self.world
            .get::<EventPoints>(self.entity(id)?)
            .map(EventPoints::len)
    }

    /// Rebuild an element's event points from the store.
    ///
    /// The angle of the last check is kept so no crossing is lost.
    pub fn refresh_event_points(&mut self, id: ElementId) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let Some(store) = self.store() else {
            return false;
        };
        let group = self.world.get::<ActiveElement>(entity).and_then(|e| e.group);
        let mut fresh = build_event_points(store, id, group);
        let Some(mut points) = self.world.get_mut::<EventPoints>(entity) else {
            return false;
        };
        fresh.last_angle = points.last_angle;
        *points = fresh;
        true
    }

    /// Re-derive orbit radii and vertical bias from the store's buoyancy.
    pub fn update_element_buoyancy(&mut self, id: ElementId) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let Some(buoyancy) = self
            .store()
            .and_then(|s| s.get_element(id))
            .map(|r| r.buoyancy)
        else {
            return false;
        };
        match self.world.get_mut::<Orbit>(entity) {
            Some(mut orbit) => {
                orbit.apply_buoyancy(buoyancy);
                true
            }
            None => false,
        }
    }

    /// Move base anchors directly. Moved elements skip orbital integration
    /// for the next tick. Returns how many elements were moved.
    pub fn set_anchors(&mut self, updates: &[AnchorUpdate]) -> usize {
        let cfg = self.config().clone();
        let targets: Vec<(Entity, AnchorUpdate, AngleMode)> = updates
            .iter()
            .filter_map(|u| {
                let entity = self.entity(u.id)?;
                let group = self.world.get::<ActiveElement>(entity)?.group;
                Some((entity, *u, self.group_mode(group)))
            })
            .collect();

        for (entity, update, mode) in &targets {
            let pose = {
                let Some(mut kin) = self.world.get_mut::<Kinematics>(*entity) else {
                    continue;
                };
                kin.base.x = update.x;
                kin.base.y = update.y;
                kin.pos.x = update.x;
                kin.pos.y = update.y;
                kin.hold_ticks = 1;
                project(&kin, *mode, &cfg)
            };
            if let Some(mut visual) = self.world.get_mut::<Visual>(*entity) {
                visual.apply(pose);
            }
        }
        targets.len()
    }

    pub fn transition_angle_mode(
        &mut self,
        group: ElementId,
        from: AngleMode,
        to: AngleMode,
        duration: f32,
    ) -> bool {
        transition_angle_mode(&mut self.world, group, from, to, duration)
    }

    pub fn transition_composure(
        &mut self,
        group: ElementId,
        from: Composure,
        to: Composure,
        duration: f32,
    ) -> bool {
        transition_composure(&mut self.world, group, from, to, duration)
    }

    pub fn pause(&mut self, group: ElementId) {
        pause_group(&mut self.world, group);
    }

    pub fn resume(&mut self, group: ElementId) {
        resume_group(&mut self.world, group);
    }

    /// Whether the explicit hold is set for `group`.
    pub fn is_paused(&self, group: ElementId) -> bool {
        is_group_paused(&self.world, group)
    }

    /// Whether an angle transition currently pauses every element.
    pub fn is_paused_for_transition(&self) -> bool {
        self.world.resource::<AngleTransitions>().is_paused()
    }

    pub fn composure_phase(&self, group: ElementId) -> &ComposurePhase {
        self.world.resource::<GroupStates>().phase(group)
    }

    pub fn has_splay_snapshot(&self, group: ElementId) -> bool {
        self.composure_phase(group).snapshot().is_some()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
