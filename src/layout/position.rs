use serde::Serialize;

use super::geometry::Rect;
use super::metrics::SubtreeHeights;
use crate::model::{LayoutConfig, Task};

/// Placement of one visible node (top-left corner of its box)
#[derive(Debug, Clone, Copy)]
pub struct NodePosition<'a> {
    pub task: &'a Task,
    pub x: f64,
    pub y: f64,
    /// Number of expanded ancestors
    pub depth: usize,
}

impl NodePosition<'_> {
    pub fn id(&self) -> &str {
        &self.task.id
    }

    pub fn rect(&self, config: &LayoutConfig) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: config.node_width,
            height: config.node_height,
        }
    }
}

/// Size of the surface that holds every visible node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    /// Nothing to show (no visible nodes)
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Pre-order pass turning subtree heights into absolute positions.
///
/// Root trees are separated by twice the sibling gap. Positions come out in
/// rendering order: a parent before its children, earlier siblings first.
pub fn assign_positions<'a>(
    roots: &'a [Task],
    heights: &SubtreeHeights<'_>,
    config: &LayoutConfig,
) -> (Vec<NodePosition<'a>>, CanvasBounds) {
    let mut positions = Vec::with_capacity(heights.len());
    let mut band_start = 0.0;
    for root in roots {
        let height = place(root, 0, band_start, heights, config, &mut positions);
        band_start += height + 2.0 * config.vertical_spacing;
    }
    let bounds = bounds_of(&positions, config);
    (positions, bounds)
}

/// Place `task` in the band starting at `band_start`; returns the band height
fn place<'a>(
    task: &'a Task,
    depth: usize,
    band_start: f64,
    heights: &SubtreeHeights<'_>,
    config: &LayoutConfig,
    out: &mut Vec<NodePosition<'a>>,
) -> f64 {
    let height = heights.get(&task.id).unwrap_or(config.node_height);
    out.push(NodePosition {
        task,
        x: depth as f64 * config.column_width(),
        y: band_start + height / 2.0 - config.node_height / 2.0,
        depth,
    });

    let mut child_start = band_start;
    for child in task.visible_children() {
        let child_height = place(child, depth + 1, child_start, heights, config, out);
        child_start += child_height + config.vertical_spacing;
    }
    height
}

fn bounds_of(positions: &[NodePosition<'_>], config: &LayoutConfig) -> CanvasBounds {
    positions.iter().fold(CanvasBounds::default(), |acc, p| CanvasBounds {
        width: acc.width.max(p.x + config.node_width),
        height: acc.height.max(p.y + config.node_height),
    })
}
