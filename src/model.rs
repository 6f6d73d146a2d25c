use crate::adapter::{AdapterHandle, ModelAdapter};
use crate::config::ModelConfig;
use crate::domain::{
    check_forest, padding_length, Event, EventId, Task, TaskId, TaskTreeItem, ROOT_TASK_ID,
};
use crate::error::{ModelError, ModelResult};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Map of all stored events, keyed by id
pub type EventMap = BTreeMap<EventId, Event>;

/// A request the model hands back to its caller instead of mutating state
/// itself.
///
/// Creating an event needs an id from the storage layer and ending one
/// needs a wall-clock timestamp; both live with the command layer, so the
/// model phrases start/stop as requests for that layer to fulfil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRequest {
    /// Mint a new event for this task, then activate it
    MakeAndActivate { task_id: TaskId },
    /// Give this event an end timestamp of "now"
    End { event_id: EventId },
}

/// The application's authoritative in-memory state: the task forest, the
/// event store, and the set of currently running (active) events.
///
/// Single-threaded and synchronous; registered adapters are notified in
/// registration order before any mutation returns. Views, reports and
/// persistence all layer on top of this type.
pub struct DataModel {
    tasks: BTreeMap<TaskId, TaskTreeItem>,
    root: TaskTreeItem,
    events: EventMap,
    // derived: ids of events without an end timestamp
    active_event_ids: BTreeSet<EventId>,
    adapters: Vec<AdapterHandle>,
    config: ModelConfig,
    task_padding_length: usize,
}

impl DataModel {
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            tasks: BTreeMap::new(),
            root: TaskTreeItem::root(),
            events: EventMap::new(),
            active_event_ids: BTreeSet::new(),
            adapters: Vec::new(),
            config,
            task_padding_length: 1,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Register an observer. Registration is append-only for the session;
    /// adapters are notified in registration order.
    pub fn register_adapter(&mut self, adapter: AdapterHandle) {
        self.adapters.push(adapter);
    }

    // ---- task store ----

    /// Replace the entire task forest.
    ///
    /// All-or-nothing: the list is validated as a well-formed forest
    /// (unique ids, resolvable parents, no cycles) before the prior state
    /// is discarded.
    pub fn set_all_tasks(&mut self, tasks: Vec<Task>) -> ModelResult<()> {
        check_forest(&tasks)?;

        self.tasks.clear();
        self.root.clear_children();
        for task in tasks {
            self.tasks.insert(task.id, TaskTreeItem::new(task));
        }
        self.rebuild_links();
        self.recompute_padding();
        debug!("task forest replaced, {} tasks", self.tasks.len());
        self.notify(|adapter, model| adapter.tasks_reset(model));
        Ok(())
    }

    /// Insert a single task under its declared parent
    pub fn add_task(&mut self, task: Task) -> ModelResult<()> {
        if task.id == ROOT_TASK_ID || self.tasks.contains_key(&task.id) {
            return Err(ModelError::DuplicateId(task.id));
        }
        if task.parent != ROOT_TASK_ID && !self.tasks.contains_key(&task.parent) {
            return Err(ModelError::DanglingParent {
                task: task.id,
                parent: task.parent,
            });
        }

        let id = task.id;
        let parent = task.parent;
        self.tasks.insert(id, TaskTreeItem::new(task));
        self.link(parent, id);
        self.recompute_padding();
        self.notify(|adapter, model| adapter.task_added(model, id));
        Ok(())
    }

    /// Replace an existing task's name and parent by id.
    ///
    /// A parent change re-links the task under the new parent; its own
    /// children move with it. Fails if the new parent is missing or the
    /// move would create a cycle.
    pub fn modify_task(&mut self, task: Task) -> ModelResult<()> {
        let old_parent = match self.tasks.get(&task.id) {
            Some(item) => item.task().parent,
            None => return Err(ModelError::NotFound(task.id)),
        };

        if task.parent != old_parent {
            if task.parent != ROOT_TASK_ID && !self.tasks.contains_key(&task.parent) {
                return Err(ModelError::DanglingParent {
                    task: task.id,
                    parent: task.parent,
                });
            }
            self.check_no_cycle(task.id, task.parent)?;
        }

        let id = task.id;
        let new_parent = task.parent;
        if new_parent != old_parent {
            self.unlink(old_parent, id);
            self.link(new_parent, id);
        }
        if let Some(item) = self.tasks.get_mut(&id) {
            item.set_task(task);
        }
        self.notify(|adapter, model| adapter.task_modified(model, id));
        Ok(())
    }

    /// Remove a task by id.
    ///
    /// The model does not cascade: a task that still has children or
    /// events is rejected, and the caller must reparent or delete those
    /// first.
    pub fn delete_task(&mut self, id: TaskId) -> ModelResult<()> {
        let item = self.tasks.get(&id).ok_or(ModelError::NotFound(id))?;
        if !item.is_leaf() {
            return Err(ModelError::HasChildren(id));
        }
        if self.events.values().any(|event| event.task_id == id) {
            return Err(ModelError::HasEvents(id));
        }

        let parent = item.task().parent;
        self.unlink(parent, id);
        self.tasks.remove(&id);
        self.recompute_padding();
        self.notify(|adapter, model| adapter.task_deleted(model, id));
        Ok(())
    }

    /// Empty the forest back to the synthetic root. Events are untouched;
    /// reload sequences clear them separately.
    pub fn clear_tasks(&mut self) {
        self.tasks.clear();
        self.root.clear_children();
        self.task_padding_length = 1;
        debug!("task forest cleared");
        self.notify(|adapter, model| adapter.tasks_reset(model));
    }

    /// Tree item for a task id; id 0 returns the synthetic root whose
    /// children are all top-level tasks
    pub fn task_tree_item(&self, id: TaskId) -> Option<&TaskTreeItem> {
        if id == ROOT_TASK_ID {
            Some(&self.root)
        } else {
            self.tasks.get(&id)
        }
    }

    /// Convenience: the task itself (id 0 returns the synthetic root task)
    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.task_tree_item(id).map(|item| item.task())
    }

    /// Flattened snapshot of all stored tasks, ascending by id
    pub fn all_tasks(&self) -> Vec<Task> {
        self.tasks.values().map(|item| item.task().clone()).collect()
    }

    pub fn task_exists(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// The tree item of this task's parent
    pub fn parent_item(&self, task: &Task) -> Option<&TaskTreeItem> {
        self.task_tree_item(task.parent)
    }

    /// Digits needed to print the largest stored task id; consumers use it
    /// to right-align ids
    pub fn task_padding_length(&self) -> usize {
        self.task_padding_length
    }

    // ---- event store ----

    /// Replace the entire event store.
    ///
    /// All-or-nothing: ids must be unique, every referenced task must
    /// exist, and the configured policies must hold across the full list.
    /// The active-event set is rebuilt from scratch.
    pub fn set_all_events(&mut self, events: Vec<Event>) -> ModelResult<()> {
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if event.id == 0 || !seen.insert(event.id) {
                return Err(ModelError::DuplicateId(event.id));
            }
            self.check_event_task(event)?;
        }
        if self.config.one_event_at_a_time
            && events.iter().filter(|event| event.is_active()).count() > 1
        {
            return Err(ModelError::PolicyViolation(
                "more than one active event in bulk load",
            ));
        }

        self.events = events.into_iter().map(|event| (event.id, event)).collect();
        self.active_event_ids = self
            .events
            .values()
            .filter(|event| event.is_active())
            .map(|event| event.id)
            .collect();
        debug!(
            "event store replaced, {} events ({} active)",
            self.events.len(),
            self.active_event_ids.len()
        );
        self.notify(|adapter, model| adapter.events_reset(model));
        Ok(())
    }

    /// Insert a single event. An event without an end timestamp enters the
    /// active set immediately.
    pub fn add_event(&mut self, event: Event) -> ModelResult<()> {
        if event.id == 0 || self.events.contains_key(&event.id) {
            return Err(ModelError::DuplicateId(event.id));
        }
        self.check_event_task(&event)?;
        if event.is_active() {
            self.check_single_active(event.id)?;
        }

        let id = event.id;
        let active = event.is_active();
        self.events.insert(id, event);
        if active {
            self.active_event_ids.insert(id);
        }
        self.notify(|adapter, model| adapter.event_added(model, id));
        if active {
            self.notify(|adapter, model| adapter.event_activated(model, id));
        }
        Ok(())
    }

    /// Replace an existing event by id, recomputing its active-set
    /// membership from the new end timestamp
    pub fn modify_event(&mut self, event: Event) -> ModelResult<()> {
        if !self.events.contains_key(&event.id) {
            return Err(ModelError::NotFound(event.id));
        }
        self.check_event_task(&event)?;
        let was_active = self.active_event_ids.contains(&event.id);
        let now_active = event.is_active();
        if now_active && !was_active {
            self.check_single_active(event.id)?;
        }

        let id = event.id;
        self.events.insert(id, event);
        if now_active {
            self.active_event_ids.insert(id);
        } else {
            self.active_event_ids.remove(&id);
        }
        self.notify(|adapter, model| adapter.event_modified(model, id));
        if now_active && !was_active {
            self.notify(|adapter, model| adapter.event_activated(model, id));
        } else if was_active && !now_active {
            self.notify(|adapter, model| adapter.event_deactivated(model, id));
        }
        Ok(())
    }

    /// Remove an event by id, dropping it from the active set if running
    pub fn delete_event(&mut self, id: EventId) -> ModelResult<()> {
        if self.events.remove(&id).is_none() {
            return Err(ModelError::NotFound(id));
        }
        let was_active = self.active_event_ids.remove(&id);
        if was_active {
            self.notify(|adapter, model| adapter.event_deactivated(model, id));
        }
        self.notify(|adapter, model| adapter.event_deleted(model, id));
        Ok(())
    }

    /// Empty the event store and the active-event set
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.active_event_ids.clear();
        debug!("event store cleared");
        self.notify(|adapter, model| adapter.events_reset(model));
    }

    pub fn event_for_id(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Constant access to the full event map, keyed by id. This is what
    /// the persistence layer walks when writing out.
    pub fn event_map(&self) -> &EventMap {
        &self.events
    }

    /// All events logged against a task, ascending by event id
    pub fn events_for_task(&self, task_id: TaskId) -> Vec<&Event> {
        self.events
            .values()
            .filter(|event| event.task_id == task_id)
            .collect()
    }

    pub fn event_exists(&self, id: EventId) -> bool {
        self.events.contains_key(&id)
    }

    // ---- active events ----

    /// Is any event currently running for this task?
    pub fn is_task_active(&self, task_id: TaskId) -> bool {
        self.active_events().any(|event| event.task_id == task_id)
    }

    /// Is this event currently running?
    pub fn is_event_active(&self, id: EventId) -> bool {
        self.active_event_ids.contains(&id)
    }

    /// The active event for a task.
    ///
    /// Fails with `NotFound` if the task has no running event. With the
    /// one-event-at-a-time policy off a task can have several running
    /// events; the lowest-id one is returned, unless the policy is on, in
    /// which case more than one is a policy violation.
    pub fn active_event_for(&self, task_id: TaskId) -> ModelResult<&Event> {
        let mut matches = self.active_events().filter(|event| event.task_id == task_id);
        let first = matches.next().ok_or(ModelError::NotFound(task_id))?;
        if self.config.one_event_at_a_time && matches.next().is_some() {
            return Err(ModelError::PolicyViolation(
                "multiple active events for one task",
            ));
        }
        Ok(first)
    }

    /// Request that a new event be minted and activated for this task.
    ///
    /// The model does not create the event; the command layer owns id
    /// assignment and the clock, and feeds the result back via
    /// [`add_event`](Self::add_event).
    pub fn start_event_requested(&self, task_id: TaskId) -> ModelResult<EventRequest> {
        let item = self.tasks.get(&task_id).ok_or(ModelError::NotFound(task_id))?;
        if self.config.events_in_leafs_only && !item.is_leaf() {
            return Err(ModelError::PolicyViolation(
                "events may only be logged against leaf tasks",
            ));
        }
        Ok(EventRequest::MakeAndActivate { task_id })
    }

    /// Request that the task's running event be given an end timestamp of
    /// "now". Wall-clock capture stays with the caller.
    pub fn end_event_requested(&self, task_id: TaskId) -> ModelResult<EventRequest> {
        let event = self.active_event_for(task_id)?;
        Ok(EventRequest::End { event_id: event.id })
    }

    /// End-requests for every running event, ascending by event id, so all
    /// timers stop together (shutdown, explicit "stop all")
    pub fn end_all_events_requested(&self) -> Vec<EventRequest> {
        self.active_event_ids
            .iter()
            .map(|&event_id| EventRequest::End { event_id })
            .collect()
    }

    /// Mark an already-stored event as the one running for its task.
    ///
    /// Membership in the active set is derived from the end timestamp, so
    /// only an event without one can be activated.
    pub fn activate_event(&mut self, id: EventId) -> ModelResult<()> {
        let event = self.events.get(&id).ok_or(ModelError::NotFound(id))?;
        if !event.is_active() {
            return Err(ModelError::PolicyViolation(
                "cannot activate an event that already ended",
            ));
        }
        self.check_single_active(id)?;

        self.active_event_ids.insert(id);
        self.notify(|adapter, model| adapter.event_activated(model, id));
        Ok(())
    }

    /// Periodic refresh driven by the surrounding runtime's timer.
    ///
    /// Mutates nothing; re-issues `event_modified` for every running event
    /// so views can redraw elapsed durations.
    pub fn event_update_tick(&self) {
        for &id in &self.active_event_ids {
            self.notify(|adapter, model| adapter.event_modified(model, id));
        }
    }

    // ---- internals ----

    fn active_events(&self) -> impl Iterator<Item = &Event> {
        self.active_event_ids
            .iter()
            .filter_map(|id| self.events.get(id))
    }

    /// The referenced task must exist and, under the leafs-only policy,
    /// have no children
    fn check_event_task(&self, event: &Event) -> ModelResult<()> {
        let item = self
            .tasks
            .get(&event.task_id)
            .ok_or(ModelError::NotFound(event.task_id))?;
        if self.config.events_in_leafs_only && !item.is_leaf() {
            return Err(ModelError::PolicyViolation(
                "events may only be logged against leaf tasks",
            ));
        }
        Ok(())
    }

    /// Under the one-event-at-a-time policy, no event other than `id` may
    /// be running
    fn check_single_active(&self, id: EventId) -> ModelResult<()> {
        if self.config.one_event_at_a_time
            && self.active_event_ids.iter().any(|&active| active != id)
        {
            return Err(ModelError::PolicyViolation(
                "another event is already active",
            ));
        }
        Ok(())
    }

    fn link(&mut self, parent: TaskId, child: TaskId) {
        if parent == ROOT_TASK_ID {
            self.root.add_child(child);
        } else if let Some(item) = self.tasks.get_mut(&parent) {
            item.add_child(child);
        }
    }

    fn unlink(&mut self, parent: TaskId, child: TaskId) {
        if parent == ROOT_TASK_ID {
            self.root.remove_child(child);
        } else if let Some(item) = self.tasks.get_mut(&parent) {
            item.remove_child(child);
        }
    }

    fn rebuild_links(&mut self) {
        let links: Vec<(TaskId, TaskId)> = self
            .tasks
            .values()
            .map(|item| (item.task().id, item.task().parent))
            .collect();
        for (id, parent) in links {
            self.link(parent, id);
        }
    }

    /// The new parent's chain up to the root must not pass through the
    /// task being re-linked
    fn check_no_cycle(&self, id: TaskId, new_parent: TaskId) -> ModelResult<()> {
        let mut current = new_parent;
        while current != ROOT_TASK_ID {
            if current == id {
                return Err(ModelError::CycleDetected(id));
            }
            current = match self.tasks.get(&current) {
                Some(item) => item.task().parent,
                None => break,
            };
        }
        Ok(())
    }

    fn recompute_padding(&mut self) {
        self.task_padding_length = padding_length(self.tasks.keys().copied());
    }

    fn notify<F>(&self, mut callback: F)
    where
        F: FnMut(&mut dyn ModelAdapter, &DataModel),
    {
        for adapter in &self.adapters {
            callback(&mut *adapter.borrow_mut(), self);
        }
    }
}

impl Default for DataModel {
    fn default() -> Self {
        Self::new()
    }
}
