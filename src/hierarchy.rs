//! Parent/child ordering for the task list and the chart rows.
//!
//! Tasks form a forest that is meant to be one level deep. Top-level tasks
//! are ordered by start date and each is followed by its own children, also
//! by start date. Children whose parent is not a top-level task in the
//! collection come last, in input order.

use std::collections::HashSet;

use uuid::Uuid;

use crate::model::Task;

/// One row of the list view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskRow<'a> {
    pub task: &'a Task,
    /// The task names a parent (even one that cannot be found).
    pub is_child: bool,
    /// Some task in the collection names this one as its parent.
    pub has_children: bool,
}

/// Display order: every parent immediately followed by its children.
///
/// Stable: equal start dates keep their input order.
pub fn sort_tasks(tasks: &[Task]) -> Vec<&Task> {
    let (mut parents, children): (Vec<&Task>, Vec<&Task>) =
        tasks.iter().partition(|t| t.parent_id.is_none());
    parents.sort_by_key(|t| t.start);

    let mut ordered = Vec::with_capacity(tasks.len());
    for parent in &parents {
        ordered.push(*parent);
        let mut own: Vec<&Task> = children
            .iter()
            .copied()
            .filter(|c| c.parent_id == Some(parent.id))
            .collect();
        own.sort_by_key(|t| t.start);
        ordered.extend(own);
    }

    let parent_ids: HashSet<Uuid> = parents.iter().map(|p| p.id).collect();
    ordered.extend(
        children
            .into_iter()
            .filter(|c| c.parent_id.is_some_and(|pid| !parent_ids.contains(&pid))),
    );
    ordered
}

/// Rows for the list view, in [`sort_tasks`] order.
pub fn sorted_rows(tasks: &[Task]) -> Vec<TaskRow<'_>> {
    let referenced: HashSet<Uuid> = tasks.iter().filter_map(|t| t.parent_id).collect();
    sort_tasks(tasks)
        .into_iter()
        .map(|task| TaskRow {
            task,
            is_child: task.is_child(),
            has_children: referenced.contains(&task.id),
        })
        .collect()
}

/// Candidates for the parent picker: every task except the one being edited.
pub fn potential_parents(tasks: &[Task], editing: Option<Uuid>) -> Vec<&Task> {
    tasks.iter().filter(|t| Some(t.id) != editing).collect()
}

/// Shapes the sorter tolerates but renders as orphans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingIssue {
    /// The task names itself as parent.
    SelfParent { task: Uuid },
    /// The task's parent is itself a child, so the task is shown as an orphan.
    TooDeep { task: Uuid, parent: Uuid },
    /// The named parent is not in the collection.
    MissingParent { task: Uuid, parent: Uuid },
}

/// Report hierarchy shapes that fall outside the one-level model.
pub fn nesting_issues(tasks: &[Task]) -> Vec<NestingIssue> {
    tasks
        .iter()
        .filter_map(|task| {
            let parent_id = task.parent_id?;
            if parent_id == task.id {
                return Some(NestingIssue::SelfParent { task: task.id });
            }
            match tasks.iter().find(|t| t.id == parent_id) {
                None => Some(NestingIssue::MissingParent {
                    task: task.id,
                    parent: parent_id,
                }),
                Some(parent) if parent.is_child() => Some(NestingIssue::TooDeep {
                    task: task.id,
                    parent: parent_id,
                }),
                Some(_) => None,
            }
        })
        .collect()
}
