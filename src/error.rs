use thiserror::Error;

/// Errors returned by model mutations and queries.
///
/// All failures are synchronous and leave the model unchanged; bulk
/// operations validate fully before touching state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The id is already taken (or is the reserved root id 0)
    #[error("id {0} already exists in the store")]
    DuplicateId(u64),

    /// No task or event with this id
    #[error("id {0} not found in the store")]
    NotFound(u64),

    /// A task declares a parent that is not in the store
    #[error("task {task} references missing parent {parent}")]
    DanglingParent { task: u64, parent: u64 },

    /// The parent chain does not terminate at the root
    #[error("task {0} would create a cycle in the task tree")]
    CycleDetected(u64),

    /// The task still has child tasks; callers must reparent or delete them first
    #[error("task {0} still has child tasks")]
    HasChildren(u64),

    /// The task still has events logged against it
    #[error("task {0} still has events")]
    HasEvents(u64),

    /// The operation conflicts with a configured policy
    #[error("policy violation: {0}")]
    PolicyViolation(&'static str),
}

pub type ModelResult<T> = Result<T, ModelError>;
