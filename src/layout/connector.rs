use std::collections::HashMap;

use serde::Serialize;

use super::geometry::{CubicBezier, Point};
use super::position::{CanvasBounds, NodePosition};
use crate::model::{LayoutConfig, TaskTree};

/// Samples used when hit-testing a curve
const HIT_TEST_STEPS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    /// Parent → child edge implied by the tree
    Hierarchical,
    /// User-drawn edge from the connections overlay
    Custom,
}

/// One renderable, hit-testable connector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorCurve {
    pub source_id: String,
    pub target_id: String,
    pub kind: ConnectorKind,
    pub path: CubicBezier,
    /// Depth of the target node; selects the palette entry
    pub depth: usize,
}

impl ConnectorCurve {
    /// Palette slot for this connector, cycling by target depth
    pub fn color_index(&self, palette_len: usize) -> usize {
        if palette_len == 0 {
            0
        } else {
            self.depth % palette_len
        }
    }

    /// Whether `p` lies within `tolerance` of the curve
    pub fn hit(&self, p: Point, tolerance: f64) -> bool {
        self.path.distance_sq_to(p, HIT_TEST_STEPS) <= tolerance * tolerance
    }
}

/// Build every connector for the current positions.
///
/// Tree edges come first (in position order), then overlay edges in
/// insertion order. Overlay edges with a hidden or unknown endpoint are left
/// out.
pub fn build_connectors(
    tree: &TaskTree,
    positions: &[NodePosition<'_>],
    bounds: CanvasBounds,
    config: &LayoutConfig,
) -> Vec<ConnectorCurve> {
    let index: HashMap<&str, &NodePosition<'_>> = positions.iter().map(|p| (p.id(), p)).collect();
    let mut curves = Vec::new();

    for parent in positions {
        for child in parent.task.visible_children() {
            if let Some(child_pos) = index.get(child.id.as_str()) {
                curves.push(ConnectorCurve {
                    source_id: parent.task.id.clone(),
                    target_id: child.id.clone(),
                    kind: ConnectorKind::Hierarchical,
                    path: forward_curve(parent, child_pos, config),
                    depth: child_pos.depth,
                });
            }
        }
    }

    for (source_id, target_id) in tree.connection_pairs() {
        let (Some(source), Some(target)) = (index.get(source_id), index.get(target_id)) else {
            continue;
        };
        let path = if source.depth > target.depth {
            backward_curve(source, target, bounds, config)
        } else {
            forward_curve(source, target, config)
        };
        curves.push(ConnectorCurve {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            kind: ConnectorKind::Custom,
            path,
            depth: target.depth,
        });
    }

    curves
}

/// Topmost custom connector within `tolerance` of `p` (last drawn wins)
pub fn custom_connector_at(curves: &[ConnectorCurve], p: Point, tolerance: f64) -> Option<&ConnectorCurve> {
    curves
        .iter()
        .rev()
        .filter(|c| c.kind == ConnectorKind::Custom)
        .find(|c| c.hit(p, tolerance))
}

/// Horizontal S-curve from the source's right edge to the target's left edge
fn forward_curve(source: &NodePosition<'_>, target: &NodePosition<'_>, config: &LayoutConfig) -> CubicBezier {
    let start = source.rect(config).right_mid();
    let end = target.rect(config).left_mid();
    let offset = (end.x - start.x).abs() * config.curve_tension;
    CubicBezier {
        start,
        c1: Point::new(start.x + offset, start.y),
        c2: Point::new(end.x - offset, end.y),
        end,
    }
}

/// Detour around the whole canvas for edges pointing to a shallower node.
///
/// Goes over the top when the edge's midpoint is in the upper half of the
/// canvas and under the bottom otherwise; a midpoint exactly on the center
/// line goes under.
fn backward_curve(
    source: &NodePosition<'_>,
    target: &NodePosition<'_>,
    bounds: CanvasBounds,
    config: &LayoutConfig,
) -> CubicBezier {
    let start = source.rect(config).right_mid();
    let end = target.rect(config).left_mid();
    let mid_y = (start.y + end.y) / 2.0;
    let detour_y = if mid_y < bounds.height / 2.0 {
        -config.detour_margin
    } else {
        bounds.height + config.detour_margin
    };
    let offset = ((start.x - end.x).abs() * 0.5).max(config.detour_min_offset);
    CubicBezier {
        start,
        c1: Point::new(start.x + offset, detour_y),
        c2: Point::new(end.x - offset, detour_y),
        end,
    }
}
