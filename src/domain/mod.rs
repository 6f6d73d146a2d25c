pub mod event;
pub mod task;

pub use event::{Event, EventId};
pub use task::{
    check_forest, merge_task_lists, padding_length, unique_task_ids, Task, TaskId, TaskTreeItem,
    ROOT_TASK_ID,
};
