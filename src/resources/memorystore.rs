//! In-process entity store.
//!
//! [`MemoryStore`] keeps element records in insertion order behind a shared
//! lock. Clones share the same data, so a host (or a test) can keep a handle
//! to inspect and edit records while the motion world owns another.
//!
//! Scenes can be loaded from JSON:
//!
//! ```json
//! { "elements": [
//!     { "id": 1, "group": { "x": 0, "y": 0, "inventory_check": true } },
//!     { "id": 2, "owner_group": 1, "viewer": 1,
//!       "state_machine": { "states": [{ "id": "idle", "trigger_angle": 90 }] } }
//! ] }
//! ```

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::resources::store::{
    ElementId, ElementPatch, ElementRecord, EntityStore, GroupConfig, StoreError, ViewerId,
};

/// Serialized form of a store.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Scene {
    pub elements: Vec<ElementRecord>,
}

#[derive(Default)]
struct Inner {
    elements: Vec<ElementRecord>,
    updates: usize,
}

/// Shared, lock-protected element store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scene(scene: Scene) -> Self {
        let store = Self::new();
        for record in scene.elements {
            store.insert(record);
        }
        store
    }

    /// Parse a JSON scene.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let scene: Scene =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse scene: {}", e))?;
        Ok(Self::from_scene(scene))
    }

    /// Load a JSON scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scene {}: {}", path.display(), e))?;
        Self::from_json(&json)
    }

    pub fn scene(&self) -> Scene {
        Scene {
            elements: self.read().elements.clone(),
        }
    }

    // A poisoned lock only means another holder panicked mid-edit; the
    // records themselves stay usable.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a record, replacing any record with the same id in place.
    pub fn insert(&self, record: ElementRecord) {
        let mut inner = self.write();
        match inner.elements.iter_mut().find(|e| e.id == record.id) {
            Some(existing) => *existing = record,
            None => inner.elements.push(record),
        }
    }

    pub fn remove(&self, id: ElementId) -> Option<ElementRecord> {
        let mut inner = self.write();
        let idx = inner.elements.iter().position(|e| e.id == id)?;
        Some(inner.elements.remove(idx))
    }

    /// Edit a record in place. Returns `false` if it does not exist.
    pub fn modify(&self, id: ElementId, f: impl FnOnce(&mut ElementRecord)) -> bool {
        let mut inner = self.write();
        match inner.elements.iter_mut().find(|e| e.id == id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Edit a group's configuration in place.
    pub fn modify_group(&self, id: ElementId, f: impl FnOnce(&mut GroupConfig)) -> bool {
        let mut edited = false;
        self.modify(id, |record| {
            if let Some(group) = record.group.as_mut() {
                f(group);
                edited = true;
            }
        });
        edited
    }

    /// Number of successful [`EntityStore::update_element`] calls so far.
    pub fn update_count(&self) -> usize {
        self.read().updates
    }
}

impl EntityStore for MemoryStore {
    fn get_element(&self, id: ElementId) -> Option<ElementRecord> {
        self.read().elements.iter().find(|e| e.id == id).cloned()
    }

    fn get_group(&self, id: ElementId) -> Option<GroupConfig> {
        self.read()
            .elements
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.group.clone())
    }

    fn elements_in_group(&self, group: ElementId) -> Vec<ElementId> {
        self.read()
            .elements
            .iter()
            .filter(|e| e.owner_group == Some(group))
            .map(|e| e.id)
            .collect()
    }

    fn elements_in_viewing_context(
        &self,
        viewer: ViewerId,
    ) -> Result<Vec<ElementRecord>, StoreError> {
        Ok(self
            .read()
            .elements
            .iter()
            .filter(|e| e.viewer == Some(viewer))
            .cloned()
            .collect())
    }

    fn update_element(&self, id: ElementId, patch: ElementPatch) -> Result<(), StoreError> {
        let mut inner = self.write();
        let record = inner
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if let Some(state) = patch.current_state_id {
            let machine = record
                .state_machine
                .as_mut()
                .ok_or(StoreError::NoStateMachine(id))?;
            machine.current_state_id = Some(state);
        }
        inner.updates += 1;
        Ok(())
    }
}
