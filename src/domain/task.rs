use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Task identifier. Positive; 0 is reserved for the synthetic root.
pub type TaskId = u64;

/// The synthetic root id. All top-level tasks have it as their parent.
pub const ROOT_TASK_ID: TaskId = 0;

/// A named unit of work that time can be logged against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id, assigned by the storage layer (never 0)
    pub id: TaskId,
    /// Display name
    pub name: String,
    /// Parent task id; 0 means top-level
    pub parent: TaskId,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>, parent: TaskId) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
        }
    }

    /// Whether this task sits directly under the synthetic root
    pub fn is_top_level(&self) -> bool {
        self.parent == ROOT_TASK_ID
    }
}

/// Arena entry wrapping a task with its materialized children links.
///
/// Children are stored as ids, never as references, so the forest has no
/// ownership cycles. The model owns all items exclusively.
#[derive(Debug, Clone)]
pub struct TaskTreeItem {
    task: Task,
    children: Vec<TaskId>,
}

impl TaskTreeItem {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            children: Vec::new(),
        }
    }

    /// The synthetic root item (task id 0)
    pub fn root() -> Self {
        Self::new(Task::new(ROOT_TASK_ID, "", ROOT_TASK_ID))
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn task_id(&self) -> TaskId {
        self.task.id
    }

    /// Child task ids, in insertion order
    pub fn children(&self) -> &[TaskId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn set_task(&mut self, task: Task) {
        self.task = task;
    }

    pub(crate) fn add_child(&mut self, id: TaskId) {
        self.children.push(id);
    }

    pub(crate) fn remove_child(&mut self, id: TaskId) {
        self.children.retain(|&child| child != id);
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }
}

/// Check that every task in the list has a unique, non-zero id
pub fn unique_task_ids(tasks: &[Task]) -> bool {
    let mut seen = HashSet::new();
    tasks
        .iter()
        .all(|task| task.id != ROOT_TASK_ID && seen.insert(task.id))
}

/// Validate that a task list forms a well-formed forest.
///
/// Every non-zero parent must be present in the list, and every parent
/// chain must terminate at the root without revisiting a task. Returns the
/// first offending task as `DuplicateId`, `DanglingParent` or
/// `CycleDetected`.
pub fn check_forest(tasks: &[Task]) -> ModelResult<()> {
    let mut parents: HashMap<TaskId, TaskId> = HashMap::with_capacity(tasks.len());
    for task in tasks {
        if task.id == ROOT_TASK_ID || parents.insert(task.id, task.parent).is_some() {
            return Err(ModelError::DuplicateId(task.id));
        }
    }

    for task in tasks {
        if task.parent != ROOT_TASK_ID && !parents.contains_key(&task.parent) {
            return Err(ModelError::DanglingParent {
                task: task.id,
                parent: task.parent,
            });
        }
    }

    // Walk every parent chain; a chain longer than the task count has looped
    for task in tasks {
        let mut current = task.parent;
        let mut steps = 0;
        while current != ROOT_TASK_ID {
            if current == task.id || steps > tasks.len() {
                return Err(ModelError::CycleDetected(task.id));
            }
            current = match parents.get(&current) {
                Some(&parent) => parent,
                None => break,
            };
            steps += 1;
        }
    }

    Ok(())
}

/// Overlay an imported task list onto an existing one.
///
/// Tasks from `imported` replace existing tasks with the same id; all
/// other existing tasks are kept. Both inputs must have unique, non-zero
/// ids, and the combined list must still form a well-formed forest, or the
/// merge is rejected without a result. Callers feed the merged list to
/// `set_all_tasks`.
pub fn merge_task_lists(existing: &[Task], imported: &[Task]) -> ModelResult<Vec<Task>> {
    let mut merged: BTreeMap<TaskId, Task> = BTreeMap::new();
    for task in existing {
        if task.id == ROOT_TASK_ID || merged.insert(task.id, task.clone()).is_some() {
            return Err(ModelError::DuplicateId(task.id));
        }
    }

    let mut seen = HashSet::with_capacity(imported.len());
    for task in imported {
        if task.id == ROOT_TASK_ID || !seen.insert(task.id) {
            return Err(ModelError::DuplicateId(task.id));
        }
        merged.insert(task.id, task.clone());
    }

    let merged: Vec<Task> = merged.into_values().collect();
    check_forest(&merged)?;
    Ok(merged)
}

/// Number of decimal digits needed to print the largest id in the list.
///
/// Purely a formatting aid for consumers that right-align task ids.
pub fn padding_length(ids: impl IntoIterator<Item = TaskId>) -> usize {
    let max = ids.into_iter().max().unwrap_or(0);
    let mut digits = 1;
    let mut value = max;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}
