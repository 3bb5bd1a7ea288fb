use tracing::debug;

use super::viewport::Viewport;
use crate::layout::{HitTarget, MapLayout, Point};

/// Distance (screen pixels) within which a click lands on a connector
pub const CONNECTOR_HIT_TOLERANCE: f64 = 6.0;

/// Connection being dragged out of a node's handle (world coordinates)
#[derive(Debug, Clone, PartialEq)]
pub struct DraftConnection {
    pub source_id: String,
    pub start: Point,
    /// Live end point following the pointer
    pub end: Point,
}

/// Pointer gesture state of the map view
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// Background drag; `last` is the previous pointer position on screen
    Panning { last: Point },
    DrawingConnection(DraftConnection),
}

/// Requests the map view hands back to the tree collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapRequest {
    AddConnection { source: String, target: String },
    DeleteConnection { source: String, target: String },
    /// A node body was clicked
    Select(String),
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn draft(&self) -> Option<&DraftConnection> {
        match self {
            Interaction::DrawingConnection(draft) => Some(draft),
            _ => None,
        }
    }

    /// Pointer pressed at `screen`. Only starts a gesture from `Idle`.
    pub fn pointer_down(&mut self, screen: Point, layout: &MapLayout<'_>, viewport: &Viewport) -> Option<MapRequest> {
        if !self.is_idle() {
            return None;
        }
        let world = viewport.to_world(screen);
        let tolerance = CONNECTOR_HIT_TOLERANCE / viewport.scale();
        match layout.hit_test(world, tolerance) {
            HitTarget::Background => {
                *self = Interaction::Panning { last: screen };
                None
            }
            HitTarget::Handle(source_id) => {
                let start = layout.handle_anchor(&source_id)?;
                debug!(source = %source_id, "start drawing connection");
                *self = Interaction::DrawingConnection(DraftConnection {
                    source_id,
                    start,
                    end: start,
                });
                None
            }
            HitTarget::Node(id) => Some(MapRequest::Select(id)),
            HitTarget::Connector { source, target } => Some(MapRequest::DeleteConnection { source, target }),
        }
    }

    /// Pointer moved to `screen`: pans or stretches the draft
    pub fn pointer_move(&mut self, screen: Point, viewport: &mut Viewport) {
        match self {
            Interaction::Idle => {}
            Interaction::Panning { last } => {
                viewport.pan(screen.x - last.x, screen.y - last.y);
                *last = screen;
            }
            Interaction::DrawingConnection(draft) => {
                draft.end = viewport.to_world(screen);
            }
        }
    }

    /// Pointer released at `screen`. A draft dropped on another node
    /// becomes an `AddConnection`; self-drops and misses do nothing.
    pub fn pointer_up(&mut self, screen: Point, layout: &MapLayout<'_>, viewport: &Viewport) -> Option<MapRequest> {
        match std::mem::take(self) {
            Interaction::DrawingConnection(draft) => {
                let hit = layout.node_at(viewport.to_world(screen))?;
                if hit.id() == draft.source_id {
                    return None;
                }
                Some(MapRequest::AddConnection {
                    source: draft.source_id,
                    target: hit.id().to_string(),
                })
            }
            Interaction::Idle | Interaction::Panning { .. } => None,
        }
    }

    /// Pointer left the view: ends a pan, a draft keeps going
    pub fn pointer_leave(&mut self) {
        if matches!(self, Interaction::Panning { .. }) {
            *self = Interaction::Idle;
        }
    }

    /// Abandon whatever gesture is running
    pub fn cancel(&mut self) {
        *self = Interaction::Idle;
    }
}
