//! In-flight angle-mode transitions.
//!
//! While any [`TransitionRecord`] exists the whole core is paused: the tick
//! schedule's run condition checks [`AngleTransitions::is_paused`] and skips
//! every element. Angle changes are rare, and pausing globally keeps members
//! of other groups from drifting under an animating group.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::activeelement::ElementId;
use crate::resources::scheduler::TaskId;
use crate::resources::store::AngleMode;

#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRecord {
    pub group: ElementId,
    pub from: AngleMode,
    pub to: AngleMode,
    /// Simulated time the transition started at.
    pub start: f64,
    /// Seconds.
    pub duration: f32,
    pub elements: Vec<ElementId>,
    /// Task that clears this record.
    pub finish: TaskId,
}

#[derive(Resource, Debug, Default)]
pub struct AngleTransitions {
    records: FxHashMap<ElementId, TransitionRecord>,
}

impl AngleTransitions {
    /// Store a record, returning the one it replaced for the same group.
    pub fn insert(&mut self, record: TransitionRecord) -> Option<TransitionRecord> {
        self.records.insert(record.group, record)
    }

    pub fn remove(&mut self, group: ElementId) -> Option<TransitionRecord> {
        self.records.remove(&group)
    }

    pub fn get(&self, group: ElementId) -> Option<&TransitionRecord> {
        self.records.get(&group)
    }

    pub fn is_paused(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Detach a removed element from every record.
    pub fn forget_element(&mut self, id: ElementId) {
        for record in self.records.values_mut() {
            record.elements.retain(|e| *e != id);
        }
    }
}

/// Run condition: `true` while no angle transition is in flight.
pub fn not_paused_for_transition(transitions: Res<AngleTransitions>) -> bool {
    !transitions.is_paused()
}
