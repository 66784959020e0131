use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::activeelement::ElementId;

/// Maps store ids of active elements to their entities.
///
/// An id is present exactly while the element is registered with the core.
#[derive(Resource, Debug, Default)]
pub struct ElementIndex {
    by_id: FxHashMap<ElementId, Entity>,
}

impl ElementIndex {
    pub fn get(&self, id: ElementId) -> Option<Entity> {
        self.by_id.get(&id).copied()
    }

    pub fn insert(&mut self, id: ElementId, entity: Entity) {
        self.by_id.insert(id, entity);
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Entity> {
        self.by_id.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
