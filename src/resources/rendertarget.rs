//! Render target contract between the motion core and the view layer.
//!
//! The core never paints anything itself. It writes screen coordinates, a
//! scale and an opacity onto a [`RenderTarget`] owned by each element, and
//! dispatches [`Notification`]s the view may turn into visual embellishments.
//!
//! [`ChannelRenderTarget`] is a ready-made implementation that forwards every
//! write as a [`RenderCmd`] over a `crossbeam_channel`, so a renderer living
//! on another thread can consume them.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::components::activeelement::ElementId;
use crate::components::eventpoints::EventAction;

/// Notifications dispatched on an element's render target.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// A state change was accepted and will be committed shortly.
    TransitionCue { element: ElementId, to_state: String },
    /// The element's clock angle crossed one of its event points.
    EventPointCrossed {
        element: ElementId,
        action: EventAction,
        angle: f32,
    },
}

/// Capability the view layer implements for every simulated element.
pub trait RenderTarget: Send + Sync {
    fn set_position(&mut self, left: f32, top: f32);
    fn set_transform(&mut self, scale: f32);
    fn set_opacity(&mut self, opacity: f32);
    fn dispatch(&mut self, notification: Notification);
}

/// A single write performed on a [`ChannelRenderTarget`].
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCmd {
    Position { element: ElementId, left: f32, top: f32 },
    Transform { element: ElementId, scale: f32 },
    Opacity { element: ElementId, opacity: f32 },
    Notify(Notification),
}

/// Render target that forwards writes to a channel.
#[derive(Clone, Debug)]
pub struct ChannelRenderTarget {
    element: ElementId,
    tx: Sender<RenderCmd>,
}

impl ChannelRenderTarget {
    pub fn new(element: ElementId, tx: Sender<RenderCmd>) -> Self {
        ChannelRenderTarget { element, tx }
    }
}

/// Create the channel pair shared by every [`ChannelRenderTarget`].
pub fn render_channel() -> (Sender<RenderCmd>, Receiver<RenderCmd>) {
    unbounded::<RenderCmd>()
}

impl RenderTarget for ChannelRenderTarget {
    fn set_position(&mut self, left: f32, top: f32) {
        // Receiver gone means the view shut down; drop the write.
        let _ = self.tx.send(RenderCmd::Position {
            element: self.element,
            left,
            top,
        });
    }

    fn set_transform(&mut self, scale: f32) {
        let _ = self.tx.send(RenderCmd::Transform {
            element: self.element,
            scale,
        });
    }

    fn set_opacity(&mut self, opacity: f32) {
        let _ = self.tx.send(RenderCmd::Opacity {
            element: self.element,
            opacity,
        });
    }

    fn dispatch(&mut self, notification: Notification) {
        let _ = self.tx.send(RenderCmd::Notify(notification));
    }
}
