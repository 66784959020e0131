//! External entity store contract.
//!
//! The motion core does not own documents, groups or state machines. It
//! reads them through [`EntityStore`] and writes back exactly one thing:
//! the current state of an element's state machine, via
//! [`EntityStore::update_element`].
//!
//! Group configuration is re-read on every tick and never cached, so edits
//! made by the host take effect on the next tick.

use std::fmt;
use std::ops::Deref;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::components::orbit::Buoyancy;

pub use crate::components::activeelement::{ElementId, ViewerId};

/// Kind of element as the store knows it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    #[default]
    Circle,
    Square,
    /// Marker elements carrying an emoji; what inventory checks look for.
    Emoji,
    /// Never repositioned by composure transitions.
    Drone,
}

impl ElementKind {
    pub fn is_inventory_marker(self) -> bool {
        self == ElementKind::Emoji
    }

    pub fn is_drone(self) -> bool {
        self == ElementKind::Drone
    }
}

/// Which projection a group's members are drawn with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    /// Orbit seen from above; depth lifts the element slightly.
    #[default]
    Flat,
    /// Orbit plane tilted to the side; depth also swings elements sideways.
    Side,
}

/// Layout of a group's members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Composure {
    /// Compact orbiting cluster.
    #[default]
    Retracted,
    /// Spread into a two-column list.
    Splayed,
}

fn default_speed() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Configuration fields of an element acting as a group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default = "default_true")]
    pub motion_enabled: bool,
    #[serde(default)]
    pub angle_mode: AngleMode,
    #[serde(default)]
    pub composure: Composure,
    #[serde(default = "default_speed")]
    pub speed_multiplier: f32,
    pub x: f32,
    pub y: f32,
    /// Gate member event points behind the inventory guard.
    #[serde(default)]
    pub inventory_check: bool,
}

impl Default for GroupConfig {
    fn default() -> Self {
        GroupConfig {
            motion_enabled: true,
            angle_mode: AngleMode::Flat,
            composure: Composure::Retracted,
            speed_multiplier: 1.0,
            x: 0.0,
            y: 0.0,
            inventory_check: false,
        }
    }
}

/// One node of an element's state machine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineState {
    pub id: String,
    /// Clock angle in degrees at which the machine jumps to this state.
    #[serde(default)]
    pub trigger_angle: Option<f32>,
    /// Emoji a grouped marker sibling must carry while this state is current.
    #[serde(default)]
    pub demanded_emoji: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMachine {
    pub states: Vec<MachineState>,
    #[serde(default)]
    pub current_state_id: Option<String>,
}

impl StateMachine {
    pub fn current(&self) -> Option<&MachineState> {
        let current = self.current_state_id.as_deref()?;
        self.states.iter().find(|s| s.id == current)
    }
}

/// Everything the core reads about an element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: ElementId,
    #[serde(default)]
    pub kind: ElementKind,
    #[serde(default)]
    pub owner_group: Option<ElementId>,
    #[serde(default)]
    pub viewer: Option<ViewerId>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub state_machine: Option<StateMachine>,
    #[serde(default)]
    pub buoyancy: Buoyancy,
    #[serde(default)]
    pub satisfaction_locked: bool,
    /// Present when the element is a group.
    #[serde(default)]
    pub group: Option<GroupConfig>,
}

impl ElementRecord {
    pub fn new(id: ElementId) -> Self {
        ElementRecord {
            id,
            kind: ElementKind::default(),
            owner_group: None,
            viewer: None,
            emoji: None,
            state_machine: None,
            buoyancy: Buoyancy::default(),
            satisfaction_locked: false,
            group: None,
        }
    }

    pub fn current_state_id(&self) -> Option<&str> {
        self.state_machine.as_ref()?.current_state_id.as_deref()
    }

    pub fn current_state(&self) -> Option<&MachineState> {
        self.state_machine.as_ref()?.current()
    }
}

/// Partial update accepted by [`EntityStore::update_element`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementPatch {
    pub current_state_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    NotFound(ElementId),
    /// The element exists but has no state machine to update.
    NoStateMachine(ElementId),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "element {id} not found"),
            StoreError::NoStateMachine(id) => write!(f, "element {id} has no state machine"),
            StoreError::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Read/write contract the motion core consumes.
pub trait EntityStore: Send + Sync {
    fn get_element(&self, id: ElementId) -> Option<ElementRecord>;

    /// Configuration of a group element.
    fn get_group(&self, id: ElementId) -> Option<GroupConfig> {
        self.get_element(id).and_then(|e| e.group)
    }

    /// Ids of the elements owned by `group`, in store order.
    fn elements_in_group(&self, group: ElementId) -> Vec<ElementId>;

    fn elements_in_viewing_context(
        &self,
        viewer: ViewerId,
    ) -> Result<Vec<ElementRecord>, StoreError>;

    fn update_element(&self, id: ElementId, patch: ElementPatch) -> Result<(), StoreError>;
}

/// The store injected into a motion world.
#[derive(Resource)]
pub struct Store(pub Box<dyn EntityStore>);

impl Deref for Store {
    type Target = dyn EntityStore;
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
