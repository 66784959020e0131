//! Identity of an element registered with the motion core.
//!
//! An entity carries [`ActiveElement`] exactly while its visual element is
//! mounted. The id types are shared with the external store contract.

use std::fmt;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Store-level identifier of an element (circle, square or group).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of the viewing context (canvas) an element is shown in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(pub u64);

/// Marks an entity as a simulated element and records who owns it.
#[derive(Component, Clone, Debug)]
pub struct ActiveElement {
    pub id: ElementId,
    /// Group whose anchor and configuration drive this element.
    pub group: Option<ElementId>,
    pub viewer: Option<ViewerId>,
    /// Width of the viewer; group anchors are measured from its center.
    pub viewer_width: Option<f32>,
}

impl ActiveElement {
    /// Horizontal offset applied to group anchors for this element's viewer.
    pub fn viewer_center(&self) -> f32 {
        self.viewer_width.map_or(0.0, |w| w * 0.5)
    }
}
