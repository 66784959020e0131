//! Per-group motion state.
//!
//! A group's composure is modelled as a [`ComposurePhase`] whose variants
//! carry exactly the data valid in that phase: the pre-splay snapshot lives
//! inside `Splaying`, `Splayed` and `Retracting`, and the pending completion
//! task inside the animating variants. A group cannot be splayed and
//! retracting at once, and a retracted group holds no snapshot.
//!
//! The explicit hold (`pause`/`resume`) is an independent flag. The orbit
//! systems skip a group's members while either one is in effect.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::activeelement::ElementId;
use crate::components::kinematics::Vec3;
use crate::resources::scheduler::TaskId;

/// Kinematic state of one member saved before a splay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavedPose {
    pub pos: Vec3,
    pub base: Vec3,
    pub scale: f32,
    pub opacity: f32,
}

/// Saved poses of every member of a splayed group.
pub type SplaySnapshot = FxHashMap<ElementId, SavedPose>;

#[derive(Clone, Debug, Default)]
pub enum ComposurePhase {
    #[default]
    Retracted,
    /// Animating into the grid; `finish` moves it to `Splayed`.
    Splaying { snapshot: SplaySnapshot, finish: TaskId },
    Splayed { snapshot: SplaySnapshot },
    /// Animating back; `finish` drops the snapshot.
    Retracting { snapshot: SplaySnapshot, finish: TaskId },
}

impl ComposurePhase {
    pub fn snapshot(&self) -> Option<&SplaySnapshot> {
        match self {
            ComposurePhase::Retracted => None,
            ComposurePhase::Splaying { snapshot, .. }
            | ComposurePhase::Splayed { snapshot }
            | ComposurePhase::Retracting { snapshot, .. } => Some(snapshot),
        }
    }

    pub fn snapshot_mut(&mut self) -> Option<&mut SplaySnapshot> {
        match self {
            ComposurePhase::Retracted => None,
            ComposurePhase::Splaying { snapshot, .. }
            | ComposurePhase::Splayed { snapshot }
            | ComposurePhase::Retracting { snapshot, .. } => Some(snapshot),
        }
    }

    pub fn pending_task(&self) -> Option<TaskId> {
        match self {
            ComposurePhase::Splaying { finish, .. } | ComposurePhase::Retracting { finish, .. } => {
                Some(*finish)
            }
            _ => None,
        }
    }

    /// Splayed or on its way in or out.
    pub fn is_spread(&self) -> bool {
        !matches!(self, ComposurePhase::Retracted)
    }
}

#[derive(Clone, Debug, Default)]
pub struct GroupMotion {
    pub phase: ComposurePhase,
    /// Explicit hold requested by the host.
    pub held: bool,
}

impl GroupMotion {
    pub fn is_paused(&self) -> bool {
        self.held || self.phase.is_spread()
    }

    fn is_idle(&self) -> bool {
        !self.held && !self.phase.is_spread()
    }
}

/// Motion state of every group that is not plainly retracted and running.
#[derive(Resource, Debug, Default)]
pub struct GroupStates {
    groups: FxHashMap<ElementId, GroupMotion>,
}

impl GroupStates {
    pub fn get(&self, group: ElementId) -> Option<&GroupMotion> {
        self.groups.get(&group)
    }

    pub fn entry(&mut self, group: ElementId) -> &mut GroupMotion {
        self.groups.entry(group).or_default()
    }

    pub fn phase(&self, group: ElementId) -> &ComposurePhase {
        static RETRACTED: ComposurePhase = ComposurePhase::Retracted;
        self.groups.get(&group).map_or(&RETRACTED, |g| &g.phase)
    }

    pub fn set_phase(&mut self, group: ElementId, phase: ComposurePhase) {
        self.entry(group).phase = phase;
        self.prune(group);
    }

    pub fn set_held(&mut self, group: ElementId, held: bool) {
        self.entry(group).held = held;
        self.prune(group);
    }

    pub fn is_held(&self, group: ElementId) -> bool {
        self.groups.get(&group).is_some_and(|g| g.held)
    }

    /// Whether members of `group` are skipped by the orbit systems.
    pub fn is_paused(&self, group: ElementId) -> bool {
        self.groups.get(&group).is_some_and(GroupMotion::is_paused)
    }

    /// Drop an element from every saved snapshot.
    pub fn forget_element(&mut self, id: ElementId) {
        for motion in self.groups.values_mut() {
            if let Some(snapshot) = motion.phase.snapshot_mut() {
                snapshot.remove(&id);
            }
        }
    }

    fn prune(&mut self, group: ElementId) {
        if self.groups.get(&group).is_some_and(GroupMotion::is_idle) {
            self.groups.remove(&group);
        }
    }
}
