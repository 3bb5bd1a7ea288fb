use crate::model::task::{Task, TaskTree};

/// One line of the indented tree listing
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineRow<'a> {
    pub task: &'a Task,
    pub depth: usize,
    /// Box-drawing guide drawn before the checkbox (`├─ `, `│  └─ `, ...)
    pub guide: String,
    /// The task is collapsed and has children that are not listed
    pub folded: bool,
}

/// Flatten the tree in pre-order. Collapsed subtrees are skipped unless
/// `include_hidden` is set.
pub fn flatten(tree: &TaskTree, include_hidden: bool) -> Vec<OutlineRow<'_>> {
    let mut rows = Vec::new();
    for root in &tree.roots {
        push_rows(root, 0, "", None, include_hidden, &mut rows);
    }
    rows
}

fn push_rows<'a>(
    task: &'a Task,
    depth: usize,
    indent: &str,
    is_last: Option<bool>,
    include_hidden: bool,
    rows: &mut Vec<OutlineRow<'a>>,
) {
    let guide = match is_last {
        None => String::new(),
        Some(true) => format!("{}└─ ", indent),
        Some(false) => format!("{}├─ ", indent),
    };
    let children: &[Task] = if include_hidden {
        &task.children
    } else {
        task.visible_children()
    };
    rows.push(OutlineRow {
        task,
        depth,
        guide,
        folded: children.is_empty() && !task.children.is_empty(),
    });

    let child_indent = match is_last {
        None => String::new(),
        Some(true) => format!("{}   ", indent),
        Some(false) => format!("{}│  ", indent),
    };
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        push_rows(child, depth + 1, &child_indent, Some(last), include_hidden, rows);
    }
}

/// Index of the row holding `id`, if it is listed
pub fn row_index(rows: &[OutlineRow<'_>], id: &str) -> Option<usize> {
    rows.iter().position(|r| r.task.id == id)
}
