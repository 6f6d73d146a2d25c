//! In-memory model of a task-based time-tracking application.
//!
//! The [`DataModel`] owns the task forest, the event store and the set of
//! currently running events, and notifies registered [`ModelAdapter`]
//! observers of every change. Views, reports, undo/command sequencing and
//! persistence are collaborators layered on top of this crate, not part of
//! it.

pub mod adapter;
pub mod config;
pub mod domain;
pub mod error;
pub mod model;
pub mod ticker;

pub use adapter::{AdapterHandle, ModelAdapter};
pub use config::ModelConfig;
pub use domain::{Event, EventId, Task, TaskId, TaskTreeItem, ROOT_TASK_ID};
pub use error::{ModelError, ModelResult};
pub use model::{DataModel, EventMap, EventRequest};
