use std::collections::HashMap;

use crate::model::{LayoutConfig, Task};

/// Subtree heights of every visible node, keyed by task id.
///
/// Lives for one layout call only; it borrows the ids of the snapshot it was
/// computed from.
#[derive(Debug, Default)]
pub struct SubtreeHeights<'a> {
    heights: HashMap<&'a str, f64>,
}

impl<'a> SubtreeHeights<'a> {
    /// Height of the node with `id`, or `None` if it is hidden or unknown
    pub fn get(&self, id: &str) -> Option<f64> {
        self.heights.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// Post-order pass over the visible forest.
///
/// A leaf or collapsed node is one node tall; an expanded node spans its
/// children's bands plus one sibling gap between each pair.
pub fn compute_subtree_heights<'a>(roots: &'a [Task], config: &LayoutConfig) -> SubtreeHeights<'a> {
    let mut out = SubtreeHeights::default();
    for root in roots {
        measure(root, config, &mut out);
    }
    out
}

fn measure<'a>(task: &'a Task, config: &LayoutConfig, out: &mut SubtreeHeights<'a>) -> f64 {
    if let Some(h) = out.get(&task.id) {
        return h;
    }
    let children = task.visible_children();
    let height = if children.is_empty() {
        config.node_height
    } else {
        let sum: f64 = children.iter().map(|c| measure(c, config, out)).sum();
        sum + (children.len() - 1) as f64 * config.vertical_spacing
    };
    out.heights.insert(task.id.as_str(), height);
    height
}
