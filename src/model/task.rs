use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Countdown attached to a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Configured length of one countdown, in seconds
    pub duration_secs: u64,
    /// Seconds left in the current countdown
    pub remaining_secs: u64,
    /// Whether the countdown is ticking
    #[serde(default)]
    pub running: bool,
}

impl Timer {
    /// A stopped timer with a full countdown
    pub fn new(duration_secs: u64) -> Self {
        Timer {
            duration_secs,
            remaining_secs: duration_secs,
            running: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_secs == 0
    }
}

/// A task node. Children are ordered; the order is the vertical stacking
/// order in both the list and the mindmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier like `T-014`
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Hides the subtree in both renderings
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<Timer>,
    /// `2025-05-14` style date set when the task is completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            completed: false,
            collapsed: false,
            children: Vec::new(),
            timer: None,
            completed_on: None,
        }
    }

    /// Builder-style helper used by fixtures and tests
    pub fn with_children(mut self, children: Vec<Task>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Children that take part in layout: none when collapsed
    pub fn visible_children(&self) -> &[Task] {
        if self.collapsed { &[] } else { &self.children }
    }

    /// Visit this task and every descendant, hidden or not, in pre-order
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Task)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

/// User-drawn edges: source id → target ids, both in insertion order.
/// Targets may be dangling or form cycles; nothing here is validated.
pub type Connections = IndexMap<String, IndexSet<String>>;

/// The whole document: ordered root tasks plus the connection overlay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTree {
    #[serde(default)]
    pub roots: Vec<Task>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub connections: Connections,
}

impl TaskTree {
    pub fn new(roots: Vec<Task>) -> Self {
        TaskTree {
            roots,
            connections: Connections::new(),
        }
    }

    /// Iterate every `(source, target)` pair of the overlay in insertion order
    pub fn connection_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.connections.iter().flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |target| (source.as_str(), target.as_str()))
        })
    }

    /// Every task in the tree, hidden or not, in pre-order
    pub fn all_tasks(&self) -> Vec<&Task> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.walk(&mut |task| out.push(task));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
