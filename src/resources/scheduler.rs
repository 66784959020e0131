//! Delayed task queue.
//!
//! Work that must happen "a little later" (committing a state change after
//! its visual cue, clearing a transition once its animation has settled) is
//! queued here against [`WorldTime::elapsed`](crate::resources::worldtime::WorldTime).
//! [`run_due_tasks`](crate::systems::scheduler::run_due_tasks) pops and
//! executes whatever is due each frame.
//!
//! Each task fires at most once. A queued task can be cancelled by id, or in
//! bulk for an element that is being removed.

use bevy_ecs::prelude::*;

use crate::components::activeelement::ElementId;

/// Handle of a queued task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    /// Write the element's new state-machine state to the store.
    CommitState { element: ElementId, state: String },
    /// Clear a group's angle transition record.
    FinishAngleTransition { group: ElementId },
    /// Complete a group's splay or retract animation.
    FinishComposure { group: ElementId },
}

impl Task {
    /// Element the task acts on directly, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Task::CommitState { element, .. } => Some(*element),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Scheduled {
    id: TaskId,
    due: f64,
    task: Task,
}

#[derive(Resource, Debug, Default)]
pub struct Scheduler {
    queue: Vec<Scheduled>,
    next_id: u64,
}

impl Scheduler {
    /// Queue `task` to run once simulated time reaches `due`.
    pub fn schedule_at(&mut self, due: f64, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Scheduled { id, due, task });
        id
    }

    /// Returns `true` if the task was still queued.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|s| s.id != id);
        self.queue.len() != before
    }

    /// Cancel every queued task acting on `element`. Returns how many.
    pub fn cancel_for_element(&mut self, element: ElementId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|s| s.task.element() != Some(element));
        before - self.queue.len()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.queue.iter().any(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Remove and return every task due at `now`, earliest first.
    ///
    /// Tasks due at the same time keep the order they were queued in.
    pub fn take_due(&mut self, now: f64) -> Vec<(TaskId, Task)> {
        let mut due: Vec<Scheduled> = Vec::new();
        let mut i = 0;
        while i < self.queue.len() {
            if self.queue[i].due <= now {
                due.push(self.queue.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|s| (s.id, s.task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(id: u64) -> Task {
        Task::CommitState {
            element: ElementId(id),
            state: "s".into(),
        }
    }

    #[test]
    fn test_take_due_orders_by_time_then_queue_order() {
        let mut s = Scheduler::default();
        let late = s.schedule_at(2.0, commit(1));
        let early = s.schedule_at(1.0, commit(2));
        let early_too = s.schedule_at(1.0, commit(3));
        let due = s.take_due(5.0);
        let ids: Vec<TaskId> = due.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![early, early_too, late]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_take_due_leaves_future_tasks() {
        let mut s = Scheduler::default();
        s.schedule_at(1.0, commit(1));
        let later = s.schedule_at(3.0, commit(2));
        assert_eq!(s.take_due(1.5).len(), 1);
        assert!(s.is_pending(later));
        assert!(s.take_due(1.5).is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::default();
        let id = s.schedule_at(1.0, Task::FinishComposure { group: ElementId(1) });
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(s.take_due(10.0).is_empty());
    }

    #[test]
    fn test_cancel_for_element_keeps_group_tasks() {
        let mut s = Scheduler::default();
        s.schedule_at(1.0, commit(7));
        s.schedule_at(1.0, commit(7));
        s.schedule_at(1.0, commit(8));
        s.schedule_at(1.0, Task::FinishAngleTransition { group: ElementId(7) });
        assert_eq!(s.cancel_for_element(ElementId(7)), 2);
        assert_eq!(s.len(), 2);
    }
}
