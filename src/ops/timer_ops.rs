use std::collections::HashMap;

use tracing::debug;

use crate::model::task::{Task, TaskTree, Timer};
use crate::ops::task_ops::find_task_mut;

/// Error type for timer operations
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task {0} has no timer")]
    NoTimer(String),
    #[error("timer duration must be a positive number of minutes")]
    InvalidDuration,
}

fn timer_mut<'a>(tree: &'a mut TaskTree, task_id: &str) -> Result<&'a mut Timer, TimerError> {
    let task = find_task_mut(tree, task_id).ok_or_else(|| TimerError::NotFound(task_id.to_string()))?;
    task.timer
        .as_mut()
        .ok_or_else(|| TimerError::NoTimer(task_id.to_string()))
}

/// Attach (or replace) a stopped countdown of `minutes`
pub fn set_timer(tree: &mut TaskTree, task_id: &str, minutes: u64) -> Result<(), TimerError> {
    let secs = minutes
        .checked_mul(60)
        .filter(|&secs| secs > 0)
        .ok_or(TimerError::InvalidDuration)?;
    let task = find_task_mut(tree, task_id).ok_or_else(|| TimerError::NotFound(task_id.to_string()))?;
    task.timer = Some(Timer::new(secs));
    Ok(())
}

/// Start the countdown. A finished timer restarts from its full duration.
pub fn start_timer(tree: &mut TaskTree, task_id: &str) -> Result<(), TimerError> {
    let timer = timer_mut(tree, task_id)?;
    if timer.is_finished() {
        timer.remaining_secs = timer.duration_secs;
    }
    timer.running = true;
    debug!(task = task_id, remaining = timer.remaining_secs, "timer started");
    Ok(())
}

pub fn pause_timer(tree: &mut TaskTree, task_id: &str) -> Result<(), TimerError> {
    timer_mut(tree, task_id)?.running = false;
    Ok(())
}

/// Stop and refill the countdown
pub fn reset_timer(tree: &mut TaskTree, task_id: &str) -> Result<(), TimerError> {
    let timer = timer_mut(tree, task_id)?;
    *timer = Timer::new(timer.duration_secs);
    Ok(())
}

/// Remove the timer from a task
pub fn clear_timer(tree: &mut TaskTree, task_id: &str) -> Result<(), TimerError> {
    let task = find_task_mut(tree, task_id).ok_or_else(|| TimerError::NotFound(task_id.to_string()))?;
    if task.timer.take().is_none() {
        return Err(TimerError::NoTimer(task_id.to_string()));
    }
    Ok(())
}

/// Advance every running timer by `secs`. Timers that reach zero stop;
/// their task IDs are returned in tree order.
pub fn tick(tree: &mut TaskTree, secs: u64) -> Vec<String> {
    fn tick_list(tasks: &mut [Task], secs: u64, finished: &mut Vec<String>) {
        for task in tasks {
            if let Some(timer) = task.timer.as_mut().filter(|t| t.running) {
                timer.remaining_secs = timer.remaining_secs.saturating_sub(secs);
                if timer.is_finished() {
                    timer.running = false;
                    finished.push(task.id.clone());
                }
            }
            tick_list(&mut task.children, secs, finished);
        }
    }

    let mut finished = Vec::new();
    if secs > 0 {
        tick_list(&mut tree.roots, secs, &mut finished);
    }
    for id in &finished {
        debug!(task = %id, "timer finished");
    }
    finished
}

/// Whether any timer in the tree is counting down
pub fn any_running(tree: &TaskTree) -> bool {
    tree.all_tasks()
        .iter()
        .any(|t| t.timer.is_some_and(|timer| timer.running))
}

/// Timer state of every task that has one, keyed by task ID
pub fn snapshot(tree: &TaskTree) -> HashMap<String, Timer> {
    tree.all_tasks()
        .into_iter()
        .filter_map(|t| t.timer.map(|timer| (t.id.clone(), timer)))
        .collect()
}

/// Carry countdown progress from `local` onto a tree freshly read from
/// disk. A task takes its local timer only when the disk copy still equals
/// `base`, the state last synced with disk; timers someone else set,
/// paused or cleared keep the disk version. Returns how many were carried.
pub fn merge_progress(disk: &mut TaskTree, base: &HashMap<String, Timer>, local: &HashMap<String, Timer>) -> usize {
    fn merge_list(tasks: &mut [Task], base: &HashMap<String, Timer>, local: &HashMap<String, Timer>) -> usize {
        let mut carried = 0;
        for task in tasks {
            if let Some(mine) = local.get(&task.id)
                && task.timer != Some(*mine)
                && task.timer == base.get(&task.id).copied()
            {
                task.timer = Some(*mine);
                carried += 1;
            }
            carried += merge_list(&mut task.children, base, local);
        }
        carried
    }
    merge_list(&mut disk.roots, base, local)
}

/// `mm:ss`, with minutes allowed past 59
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
