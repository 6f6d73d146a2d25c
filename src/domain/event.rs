use super::task::TaskId;
use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

/// Event identifier. Positive; assigned by the storage layer.
pub type EventId = u64;

/// A timed interval logged against exactly one task.
///
/// An event without an end timestamp is a currently running timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique id, assigned by the storage layer (never 0)
    pub id: EventId,
    /// The task this interval is logged against
    pub task_id: TaskId,
    /// When the timer was started
    pub start: DateTime<Local>,
    /// When the timer was stopped; absent while running
    pub end: Option<DateTime<Local>>,
    /// Free-form comment
    pub comment: String,
}

impl Event {
    pub fn new(id: EventId, task_id: TaskId, start: DateTime<Local>) -> Self {
        Self {
            id,
            task_id,
            start,
            end: None,
            comment: String::new(),
        }
    }

    /// Whether the timer is still running
    pub fn is_active(&self) -> bool {
        self.end.is_none()
    }

    /// Recorded duration of a finished event; `None` while running
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end.signed_duration_since(self.start))
    }

    /// Duration up to `now`, for running events shown by a ticking view
    pub fn elapsed(&self, now: DateTime<Local>) -> Duration {
        self.end.unwrap_or(now).signed_duration_since(self.start)
    }
}
