use serde::Serialize;

use crate::layout::geometry::fmt_num;
use crate::layout::{CanvasBounds, ConnectorKind, MapLayout};
use crate::model::task::{Task, TaskTree, Timer};
use crate::ops::outline::OutlineRow;
use crate::ops::timer_ops::format_remaining;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub collapsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct TimerJson {
    pub duration_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
    /// `mm:ss`
    pub remaining: String,
}

#[derive(Serialize)]
pub struct ConnectionJson {
    pub source: String,
    pub target: String,
}

#[derive(Serialize)]
pub struct TreeJson {
    pub tasks: Vec<TaskJson>,
    pub connections: Vec<ConnectionJson>,
}

#[derive(Serialize)]
pub struct NodeJson {
    pub id: String,
    pub title: String,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Serialize)]
pub struct ConnectorJson {
    pub source: String,
    pub target: String,
    pub kind: ConnectorKind,
    pub depth: usize,
    /// SVG path data of the cubic curve
    pub path: String,
}

#[derive(Serialize)]
pub struct LayoutJson {
    pub bounds: CanvasBounds,
    pub nodes: Vec<NodeJson>,
    pub connectors: Vec<ConnectorJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn timer_to_json(timer: &Timer) -> TimerJson {
    TimerJson {
        duration_secs: timer.duration_secs,
        remaining_secs: timer.remaining_secs,
        running: timer.running,
        remaining: format_remaining(timer.remaining_secs),
    }
}

/// Full subtree, hidden children included
pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        completed: task.completed,
        collapsed: task.collapsed,
        completed_on: task.completed_on.clone(),
        timer: task.timer.as_ref().map(timer_to_json),
        children: task.children.iter().map(task_to_json).collect(),
    }
}

pub fn tree_to_json(tree: &TaskTree) -> TreeJson {
    TreeJson {
        tasks: tree.roots.iter().map(task_to_json).collect(),
        connections: tree
            .connection_pairs()
            .map(|(source, target)| ConnectionJson {
                source: source.to_string(),
                target: target.to_string(),
            })
            .collect(),
    }
}

pub fn layout_to_json(layout: &MapLayout<'_>) -> LayoutJson {
    LayoutJson {
        bounds: layout.bounds,
        nodes: layout
            .positions
            .iter()
            .map(|p| NodeJson {
                id: p.task.id.clone(),
                title: p.task.title.clone(),
                depth: p.depth,
                x: p.x,
                y: p.y,
                width: layout.config.node_width,
                height: layout.config.node_height,
            })
            .collect(),
        connectors: layout
            .connectors
            .iter()
            .map(|c| ConnectorJson {
                source: c.source_id.clone(),
                target: c.target_id.clone(),
                kind: c.kind,
                depth: c.depth,
                path: c.path.to_svg_path(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let timer_str = match &task.timer {
        Some(timer) => format!(
            "  {}{}",
            format_remaining(timer.remaining_secs),
            if timer.running { " ▶" } else { "" }
        ),
        None => String::new(),
    };
    format!("[{}] {} {}{}", check, task.id, task.title, timer_str)
}

/// Indented listing, one line per outline row
pub fn format_outline(rows: &[OutlineRow<'_>]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let fold = if row.folded {
                format!(" [+{}]", row.task.children.len())
            } else {
                String::new()
            };
            format!("{}{}{}", row.guide, format_task_line(row.task), fold)
        })
        .collect()
}

/// Node positions then connectors, one per line
pub fn format_layout(layout: &MapLayout<'_>) -> Vec<String> {
    let mut lines = vec![format!(
        "canvas {} x {}",
        fmt_num(layout.bounds.width),
        fmt_num(layout.bounds.height)
    )];
    for p in &layout.positions {
        lines.push(format!(
            "{}{} at ({}, {})",
            "  ".repeat(p.depth),
            p.task.id,
            fmt_num(p.x),
            fmt_num(p.y)
        ));
    }
    if !layout.connectors.is_empty() {
        lines.push(String::new());
        for c in &layout.connectors {
            let kind = match c.kind {
                ConnectorKind::Hierarchical => "tree",
                ConnectorKind::Custom => "custom",
            };
            lines.push(format!("{} -> {}  {}", c.source_id, c.target_id, kind));
        }
    }
    lines
}
