//! Visual handle of an active element.
//!
//! [`Visual`] wraps the render target the view layer handed over on
//! registration and remembers the last [`ScreenPose`] written to it, so
//! transitions can start their tweens from what is actually on screen.

use bevy_ecs::prelude::Component;

use crate::resources::rendertarget::{Notification, RenderTarget};

/// Screen-space placement written to a render target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPose {
    pub left: f32,
    pub top: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Default for ScreenPose {
    fn default() -> Self {
        ScreenPose {
            left: 0.0,
            top: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

/// Owned render target plus the pose most recently written to it.
#[derive(Component)]
pub struct Visual {
    target: Box<dyn RenderTarget>,
    pose: ScreenPose,
}

impl Visual {
    pub fn new(target: Box<dyn RenderTarget>) -> Self {
        Visual {
            target,
            pose: ScreenPose::default(),
        }
    }

    /// Write position, transform and opacity in one go.
    pub fn apply(&mut self, pose: ScreenPose) {
        self.target.set_position(pose.left, pose.top);
        self.target.set_transform(pose.scale);
        self.target.set_opacity(pose.opacity);
        self.pose = pose;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.target.set_opacity(opacity);
        self.pose.opacity = opacity;
    }

    pub fn dispatch(&mut self, notification: Notification) {
        self.target.dispatch(notification);
    }

    /// The last pose written through [`Visual::apply`].
    pub fn pose(&self) -> ScreenPose {
        self.pose
    }
}
