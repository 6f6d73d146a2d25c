use crate::domain::{EventId, TaskId};
use crate::model::DataModel;
use std::cell::RefCell;
use std::rc::Rc;

/// Non-owning handle under which adapters are registered with the model
pub type AdapterHandle = Rc<RefCell<dyn ModelAdapter>>;

/// Observer of model changes, typically backing a view or report builder.
///
/// Every successful mutation invokes the matching callback on every
/// registered adapter, synchronously and in registration order, before the
/// mutation returns to its caller. The `model` argument is the already
/// updated state, so adapters can query it without seeing torn reads.
///
/// All callbacks default to no-ops; adapters implement only the changes
/// they care about.
#[allow(unused_variables)]
pub trait ModelAdapter {
    /// The entire task forest was replaced or cleared
    fn tasks_reset(&mut self, model: &DataModel) {}

    fn task_added(&mut self, model: &DataModel, id: TaskId) {}

    fn task_modified(&mut self, model: &DataModel, id: TaskId) {}

    fn task_deleted(&mut self, model: &DataModel, id: TaskId) {}

    /// The entire event store was replaced or cleared
    fn events_reset(&mut self, model: &DataModel) {}

    fn event_added(&mut self, model: &DataModel, id: EventId) {}

    /// Also re-issued by the periodic update tick for every active event,
    /// so views refresh elapsed durations without a data change
    fn event_modified(&mut self, model: &DataModel, id: EventId) {}

    fn event_deleted(&mut self, model: &DataModel, id: EventId) {}

    /// The event entered the active set (its timer is now running)
    fn event_activated(&mut self, model: &DataModel, id: EventId) {}

    /// The event left the active set (its timer was stopped)
    fn event_deactivated(&mut self, model: &DataModel, id: EventId) {}
}
