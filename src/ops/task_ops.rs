use chrono::Local;
use tracing::debug;

use crate::model::task::{Task, TaskTree};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("cannot move {0} into its own subtree")]
    InvalidMove(String),
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a task by ID anywhere in the tree (including hidden subtrees).
pub fn find_task<'a>(tree: &'a TaskTree, task_id: &str) -> Option<&'a Task> {
    find_task_in_list(&tree.roots, task_id)
}

/// Find a task by ID anywhere in the tree, return mutable ref.
pub fn find_task_mut<'a>(tree: &'a mut TaskTree, task_id: &str) -> Option<&'a mut Task> {
    find_task_mut_in_list(&mut tree.roots, task_id)
}

fn find_task_in_list<'a>(tasks: &'a [Task], task_id: &str) -> Option<&'a Task> {
    for task in tasks {
        if task.id == task_id {
            return Some(task);
        }
        if let Some(t) = find_task_in_list(&task.children, task_id) {
            return Some(t);
        }
    }
    None
}

fn find_task_mut_in_list<'a>(tasks: &'a mut [Task], task_id: &str) -> Option<&'a mut Task> {
    for task in tasks.iter_mut() {
        if task.id == task_id {
            return Some(task);
        }
        if let Some(t) = find_task_mut_in_list(&mut task.children, task_id) {
            return Some(t);
        }
    }
    None
}

/// Find the sibling list that holds `task_id`, with its index in it.
fn find_parent_list_mut<'a>(tasks: &'a mut Vec<Task>, task_id: &str) -> Option<(&'a mut Vec<Task>, usize)> {
    if let Some(idx) = tasks.iter().position(|t| t.id == task_id) {
        return Some((tasks, idx));
    }
    for task in tasks.iter_mut() {
        if let Some(found) = find_parent_list_mut(&mut task.children, task_id) {
            return Some(found);
        }
    }
    None
}

fn require<'a>(tree: &'a mut TaskTree, task_id: &str) -> Result<&'a mut Task, TaskError> {
    find_task_mut(tree, task_id).ok_or_else(|| TaskError::NotFound(task_id.to_string()))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Add a task at the end of `parent`'s children, or as a new root.
/// Returns the assigned ID.
pub fn add_task(tree: &mut TaskTree, title: &str, parent: Option<&str>, prefix: &str) -> Result<String, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    let id = format!("{}-{:03}", prefix, next_id_number(tree, prefix));
    let task = Task::new(id.clone(), title);

    match parent {
        Some(parent_id) => {
            let parent = require(tree, parent_id)?;
            parent.children.push(task);
            // A new child would be invisible under a collapsed parent
            parent.collapsed = false;
        }
        None => tree.roots.push(task),
    }
    Ok(id)
}

/// Remove a task and its whole subtree. Connections touching any removed
/// task go with it.
pub fn delete_task(tree: &mut TaskTree, task_id: &str) -> Result<Task, TaskError> {
    let (list, idx) =
        find_parent_list_mut(&mut tree.roots, task_id).ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    let removed = list.remove(idx);

    let mut gone = Vec::new();
    removed.walk(&mut |t| gone.push(t.id.clone()));
    for id in &gone {
        tree.connections.shift_remove(id);
    }
    for targets in tree.connections.values_mut() {
        targets.retain(|target| !gone.contains(target));
    }
    tree.connections.retain(|_, targets| !targets.is_empty());
    debug!(task = task_id, removed = gone.len(), "deleted task");
    Ok(removed)
}

pub fn set_title(tree: &mut TaskTree, task_id: &str, title: &str) -> Result<(), TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    require(tree, task_id)?.title = title.to_string();
    Ok(())
}

/// Flip completion; completing stamps today's date, reopening clears it.
/// Returns the new state.
pub fn toggle_completed(tree: &mut TaskTree, task_id: &str) -> Result<bool, TaskError> {
    let task = require(tree, task_id)?;
    task.completed = !task.completed;
    task.completed_on = task.completed.then(today_str);
    Ok(task.completed)
}

/// Flip the collapse flag. Returns the new state.
pub fn toggle_collapsed(tree: &mut TaskTree, task_id: &str) -> Result<bool, TaskError> {
    let task = require(tree, task_id)?;
    task.collapsed = !task.collapsed;
    Ok(task.collapsed)
}

pub fn set_collapsed(tree: &mut TaskTree, task_id: &str, collapsed: bool) -> Result<(), TaskError> {
    require(tree, task_id)?.collapsed = collapsed;
    Ok(())
}

/// Expand every task in the tree
pub fn expand_all(tree: &mut TaskTree) {
    fn expand(tasks: &mut [Task]) {
        for task in tasks {
            task.collapsed = false;
            expand(&mut task.children);
        }
    }
    expand(&mut tree.roots);
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// Move a task under `new_parent` (or to the roots) at `index`, clamped to
/// the end of the destination list.
pub fn move_task(
    tree: &mut TaskTree,
    task_id: &str,
    new_parent: Option<&str>,
    index: Option<usize>,
) -> Result<(), TaskError> {
    let task = find_task(tree, task_id).ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    if let Some(parent_id) = new_parent {
        if find_task_in_list(std::slice::from_ref(task), parent_id).is_some() {
            return Err(TaskError::InvalidMove(task_id.to_string()));
        }
        if find_task(tree, parent_id).is_none() {
            return Err(TaskError::NotFound(parent_id.to_string()));
        }
    }

    let (list, idx) =
        find_parent_list_mut(&mut tree.roots, task_id).ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    let task = list.remove(idx);

    let dest = match new_parent {
        Some(parent_id) => &mut require(tree, parent_id)?.children,
        None => &mut tree.roots,
    };
    let at = index.unwrap_or(dest.len()).min(dest.len());
    dest.insert(at, task);
    Ok(())
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

/// Add a user-drawn edge. Self-loops and duplicates are ignored (returns
/// false); unknown endpoints are an error.
pub fn add_connection(tree: &mut TaskTree, source: &str, target: &str) -> Result<bool, TaskError> {
    for id in [source, target] {
        if find_task(tree, id).is_none() {
            return Err(TaskError::NotFound(id.to_string()));
        }
    }
    if source == target {
        return Ok(false);
    }
    let added = tree
        .connections
        .entry(source.to_string())
        .or_default()
        .insert(target.to_string());
    if added {
        debug!(source, target, "connection added");
    }
    Ok(added)
}

/// Remove a user-drawn edge. Returns whether it existed.
pub fn remove_connection(tree: &mut TaskTree, source: &str, target: &str) -> bool {
    let Some(targets) = tree.connections.get_mut(source) else {
        return false;
    };
    let removed = targets.shift_remove(target);
    if targets.is_empty() {
        tree.connections.shift_remove(source);
    }
    removed
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today_str() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Next free number for IDs shaped like `PREFIX-NNN`
fn next_id_number(tree: &TaskTree, prefix: &str) -> usize {
    let prefix_dash = format!("{}-", prefix);
    tree.all_tasks()
        .iter()
        .filter_map(|t| t.id.strip_prefix(&prefix_dash))
        .filter_map(|n| n.parse::<usize>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> TaskTree {
        // T-001 ─┬─ T-002 ── T-003
        //        └─ T-004
        // T-005
        let mut tree = TaskTree::new(vec![
            Task::new("T-001", "Plan trip").with_children(vec![
                Task::new("T-002", "Book flights").with_children(vec![Task::new("T-003", "Compare prices")]),
                Task::new("T-004", "Pack"),
            ]),
            Task::new("T-005", "Water plants"),
        ]);
        tree.connections
            .entry("T-004".into())
            .or_default()
            .insert("T-003".into());
        tree.connections
            .entry("T-005".into())
            .or_default()
            .insert("T-002".into());
        tree
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_add_root_and_child() {
        let mut tree = sample_tree();
        let id = add_task(&mut tree, "Call mom", None, "T").unwrap();
        assert_eq!(id, "T-006");
        assert_eq!(tree.roots.last().unwrap().title, "Call mom");

        let sub = add_task(&mut tree, "  Pick dates ", Some("T-001"), "T").unwrap();
        assert_eq!(sub, "T-007");
        let parent = find_task(&tree, "T-001").unwrap();
        assert_eq!(ids(&parent.children), vec!["T-002", "T-004", "T-007"]);
        assert_eq!(parent.children[2].title, "Pick dates");
    }

    #[test]
    fn test_add_ignores_foreign_prefixes() {
        let mut tree = TaskTree::new(vec![Task::new("X-900", "Other")]);
        assert_eq!(add_task(&mut tree, "First", None, "T").unwrap(), "T-001");
    }

    #[test]
    fn test_add_under_collapsed_parent_expands_it() {
        let mut tree = sample_tree();
        set_collapsed(&mut tree, "T-002", true).unwrap();
        add_task(&mut tree, "Check baggage rules", Some("T-002"), "T").unwrap();
        assert!(!find_task(&tree, "T-002").unwrap().collapsed);
    }

    #[test]
    fn test_add_errors() {
        let mut tree = sample_tree();
        assert!(matches!(add_task(&mut tree, "   ", None, "T"), Err(TaskError::EmptyTitle)));
        assert!(matches!(
            add_task(&mut tree, "x", Some("T-999"), "T"),
            Err(TaskError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_removes_subtree_and_connections() {
        let mut tree = sample_tree();
        let removed = delete_task(&mut tree, "T-002").unwrap();
        assert_eq!(removed.children.len(), 1);
        assert!(find_task(&tree, "T-003").is_none());
        // T-004 → T-003 and T-005 → T-002 both pointed into the removed subtree
        assert!(tree.connections.is_empty());
    }

    #[test]
    fn test_delete_keeps_unrelated_connections() {
        let mut tree = sample_tree();
        delete_task(&mut tree, "T-005").unwrap();
        assert_eq!(tree.connection_pairs().collect::<Vec<_>>(), vec![("T-004", "T-003")]);
        assert_eq!(ids(&tree.roots), vec!["T-001"]);
    }

    #[test]
    fn test_delete_missing() {
        let mut tree = sample_tree();
        assert!(matches!(delete_task(&mut tree, "T-404"), Err(TaskError::NotFound(_))));
    }

    #[test]
    fn test_toggle_completed_stamps_date() {
        let mut tree = sample_tree();
        assert!(toggle_completed(&mut tree, "T-004").unwrap());
        let task = find_task(&tree, "T-004").unwrap();
        assert_eq!(task.completed_on.as_deref(), Some(today_str().as_str()));

        assert!(!toggle_completed(&mut tree, "T-004").unwrap());
        assert!(find_task(&tree, "T-004").unwrap().completed_on.is_none());
    }

    #[test]
    fn test_toggle_collapsed_and_expand_all() {
        let mut tree = sample_tree();
        assert!(toggle_collapsed(&mut tree, "T-001").unwrap());
        set_collapsed(&mut tree, "T-002", true).unwrap();
        expand_all(&mut tree);
        assert!(tree.all_tasks().iter().all(|t| !t.collapsed));
    }

    #[test]
    fn test_set_title() {
        let mut tree = sample_tree();
        set_title(&mut tree, "T-003", "Compare fares").unwrap();
        assert_eq!(find_task(&tree, "T-003").unwrap().title, "Compare fares");
        assert!(matches!(set_title(&mut tree, "T-003", ""), Err(TaskError::EmptyTitle)));
    }

    #[test]
    fn test_move_between_parents() {
        let mut tree = sample_tree();
        move_task(&mut tree, "T-004", Some("T-005"), None).unwrap();
        assert_eq!(ids(&find_task(&tree, "T-001").unwrap().children), vec!["T-002"]);
        assert_eq!(ids(&find_task(&tree, "T-005").unwrap().children), vec!["T-004"]);
    }

    #[test]
    fn test_move_reorders_roots() {
        let mut tree = sample_tree();
        move_task(&mut tree, "T-005", None, Some(0)).unwrap();
        assert_eq!(ids(&tree.roots), vec!["T-005", "T-001"]);
        // Out-of-range index clamps to the end
        move_task(&mut tree, "T-003", None, Some(99)).unwrap();
        assert_eq!(ids(&tree.roots), vec!["T-005", "T-001", "T-003"]);
    }

    #[test]
    fn test_move_into_own_subtree_rejected() {
        let mut tree = sample_tree();
        assert!(matches!(
            move_task(&mut tree, "T-001", Some("T-003"), None),
            Err(TaskError::InvalidMove(_))
        ));
        assert!(matches!(
            move_task(&mut tree, "T-002", Some("T-002"), None),
            Err(TaskError::InvalidMove(_))
        ));
        // Tree untouched
        assert_eq!(tree, sample_tree());
    }

    #[test]
    fn test_add_connection_rules() {
        let mut tree = sample_tree();
        assert!(add_connection(&mut tree, "T-003", "T-005").unwrap());
        // duplicate
        assert!(!add_connection(&mut tree, "T-003", "T-005").unwrap());
        // self-loop
        assert!(!add_connection(&mut tree, "T-003", "T-003").unwrap());
        assert!(matches!(
            add_connection(&mut tree, "T-003", "T-404"),
            Err(TaskError::NotFound(_))
        ));
        // cycles are fine
        assert!(add_connection(&mut tree, "T-002", "T-005").unwrap());
        assert_eq!(tree.connection_pairs().count(), 4);
    }

    #[test]
    fn test_remove_connection() {
        let mut tree = sample_tree();
        assert!(remove_connection(&mut tree, "T-004", "T-003"));
        assert!(!tree.connections.contains_key("T-004"));
        assert!(!remove_connection(&mut tree, "T-004", "T-003"));
        assert!(!remove_connection(&mut tree, "T-005", "T-001"));
        assert_eq!(tree.connection_pairs().count(), 1);
    }
}
