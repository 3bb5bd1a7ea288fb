//! Mindmap layout: tree snapshot in, node boxes and connector curves out.
//!
//! Everything here is a pure function of a `TaskTree` snapshot and a
//! `LayoutConfig`. Each call recomputes from scratch; nothing is cached
//! between calls.

pub mod connector;
pub mod geometry;
pub mod metrics;
pub mod position;

pub use connector::{ConnectorCurve, ConnectorKind, build_connectors, custom_connector_at};
pub use geometry::{CubicBezier, Point, Rect};
pub use metrics::{SubtreeHeights, compute_subtree_heights};
pub use position::{CanvasBounds, NodePosition, assign_positions};

use crate::model::{LayoutConfig, TaskTree};

/// The result of one layout pass
#[derive(Debug)]
pub struct MapLayout<'a> {
    /// One entry per visible node, in rendering order
    pub positions: Vec<NodePosition<'a>>,
    pub bounds: CanvasBounds,
    pub connectors: Vec<ConnectorCurve>,
    pub config: LayoutConfig,
}

/// What lies under a world-space point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Background,
    Node(String),
    /// The connection handle on a node's right edge
    Handle(String),
    /// A user-drawn connector
    Connector { source: String, target: String },
}

/// Run the metrics pass, then position assignment, then connector building
pub fn compute_layout<'a>(tree: &'a TaskTree, config: &LayoutConfig) -> MapLayout<'a> {
    let heights = compute_subtree_heights(&tree.roots, config);
    let (positions, bounds) = assign_positions(&tree.roots, &heights, config);
    let connectors = build_connectors(tree, &positions, bounds, config);
    MapLayout {
        positions,
        bounds,
        connectors,
        config: *config,
    }
}

impl<'a> MapLayout<'a> {
    pub fn position(&self, id: &str) -> Option<&NodePosition<'a>> {
        self.positions.iter().find(|p| p.id() == id)
    }

    /// Topmost node whose box contains `p` (later nodes render on top)
    pub fn node_at(&self, p: Point) -> Option<&NodePosition<'a>> {
        self.positions
            .iter()
            .rev()
            .find(|pos| pos.rect(&self.config).contains(p))
    }

    /// Node whose connection handle contains `p`
    pub fn handle_at(&self, p: Point) -> Option<&NodePosition<'a>> {
        let r = self.config.handle_radius;
        self.positions
            .iter()
            .rev()
            .find(|pos| pos.rect(&self.config).right_mid().distance_sq(p) <= r * r)
    }

    /// Anchor point for connections drawn from `id`: right edge, vertical middle
    pub fn handle_anchor(&self, id: &str) -> Option<Point> {
        self.position(id).map(|p| p.rect(&self.config).right_mid())
    }

    /// Classify a world point: handles win over node bodies, node bodies over
    /// connectors, anything else is background
    pub fn hit_test(&self, p: Point, connector_tolerance: f64) -> HitTarget {
        if let Some(pos) = self.handle_at(p) {
            return HitTarget::Handle(pos.id().to_string());
        }
        if let Some(pos) = self.node_at(p) {
            return HitTarget::Node(pos.id().to_string());
        }
        if let Some(curve) = custom_connector_at(&self.connectors, p, connector_tolerance) {
            return HitTarget::Connector {
                source: curve.source_id.clone(),
                target: curve.target_id.clone(),
            };
        }
        HitTarget::Background
    }
}
