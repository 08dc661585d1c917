//! Single-threaded cooperative task queue with per-instance debouncing.
//!
//! Nothing here runs on its own: the owner of a [`Scheduler`] drives it with
//! [`Scheduler::run_due`] or [`Scheduler::run_until_idle`]. Tasks run on the
//! calling thread, one at a time, and may schedule further tasks.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of time for a [`Scheduler`].
pub trait Clock {
    fn now(&self) -> Instant;

    /// Blocks (or, for test clocks, jumps) until `deadline` has been reached.
    fn sleep_until(&self, deadline: Instant);
}

/// Wall-clock time; `sleep_until` parks the thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep_until(&self, deadline: Instant) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}

/// Handle to a scheduled task, usable with [`Scheduler::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

type Task = Box<dyn FnOnce()>;

struct SchedulerState {
    next_id: u64,
    tasks: BTreeMap<TaskId, (Instant, Task)>,
}

/// Cheap-clone handle to a shared task queue.
#[derive(Clone)]
pub struct Scheduler {
    clock: Rc<dyn Clock>,
    state: Rc<RefCell<SchedulerState>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl Scheduler {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Scheduler {
            clock,
            state: Rc::new(RefCell::new(SchedulerState {
                next_id: 0,
                tasks: BTreeMap::new(),
            })),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn schedule_at(&self, deadline: Instant, task: impl FnOnce() + 'static) -> TaskId {
        let mut state = self.state.borrow_mut();
        let id = TaskId(state.next_id);
        state.next_id += 1;
        state.tasks.insert(id, (deadline, Box::new(task)));
        log::trace!("scheduled task {:?}", id);
        id
    }

    pub fn schedule_after(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskId {
        self.schedule_at(self.now() + delay, task)
    }

    /// Drops a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&self, id: TaskId) -> bool {
        self.state.borrow_mut().tasks.remove(&id).is_some()
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.state.borrow().tasks.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.state
            .borrow()
            .tasks
            .values()
            .map(|(deadline, _)| *deadline)
            .min()
    }

    /// Runs every task whose deadline has passed, earliest first, ties in
    /// submission order. Returns the number of tasks run.
    pub fn run_due(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due() {
            // The queue is not borrowed here, so tasks are free to schedule.
            task();
            ran += 1;
        }
        ran
    }

    /// Keeps advancing the clock to the next deadline until the queue is empty.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = self.run_due();
        while let Some(deadline) = self.next_deadline() {
            self.clock.sleep_until(deadline);
            ran += self.run_due();
        }
        ran
    }

    fn pop_due(&self) -> Option<Task> {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        let id = state
            .tasks
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .min_by_key(|(id, (deadline, _))| (*deadline, **id))
            .map(|(id, _)| *id)?;
        log::trace!("running task {:?}", id);
        state.tasks.remove(&id).map(|(_, task)| task)
    }
}

/// Trailing-edge debounce bound to one owner.
///
/// Each [`Debouncer::trigger`] supersedes the previous pending task, so only
/// the latest one runs, one window after the last trigger.
#[derive(Debug)]
pub struct Debouncer {
    scheduler: Scheduler,
    window: Duration,
    pending: Cell<Option<TaskId>>,
}

impl Debouncer {
    pub fn new(scheduler: Scheduler, window: Duration) -> Self {
        Debouncer {
            scheduler,
            window,
            pending: Cell::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn trigger(&self, task: impl FnOnce() + 'static) {
        self.cancel();
        let id = self.scheduler.schedule_after(self.window, task);
        self.pending.set(Some(id));
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .get()
            .map_or(false, |id| self.scheduler.is_scheduled(id))
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> (Rc<ManualClock>, Scheduler) {
        let clock = Rc::new(ManualClock::new());
        let scheduler = Scheduler::new(clock.clone());
        (clock, scheduler)
    }

    #[test]
    fn test_tasks_wait_for_deadline() {
        let (clock, scheduler) = manual();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        scheduler.schedule_after(Duration::from_millis(10), move || h.set(h.get() + 1));

        assert_eq!(scheduler.run_due(), 0);
        clock.advance(Duration::from_millis(9));
        assert_eq!(scheduler.run_due(), 0);
        clock.advance(Duration::from_millis(1));
        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_due_tasks_run_in_deadline_order() {
        let (clock, scheduler) = manual();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (name, ms) in [("late", 5u64), ("early", 1), ("tie", 5)] {
            let order = order.clone();
            scheduler.schedule_after(Duration::from_millis(ms), move || {
                order.borrow_mut().push(name)
            });
        }
        clock.advance(Duration::from_millis(5));
        scheduler.run_due();
        assert_eq!(*order.borrow(), vec!["early", "late", "tie"]);
    }

    #[test]
    fn test_debouncer_keeps_only_latest() {
        let (clock, scheduler) = manual();
        let debouncer = Debouncer::new(scheduler.clone(), Duration::from_millis(16));
        let seen = Rc::new(RefCell::new(Vec::new()));

        for i in 0..5 {
            let seen = seen.clone();
            debouncer.trigger(move || seen.borrow_mut().push(i));
            clock.advance(Duration::from_millis(4));
            scheduler.run_due();
        }
        assert!(seen.borrow().is_empty());
        assert!(debouncer.is_pending());

        scheduler.run_until_idle();
        assert_eq!(*seen.borrow(), vec![4]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_tasks_can_schedule_tasks() {
        let (_clock, scheduler) = manual();
        let hits = Rc::new(Cell::new(0));
        let inner = scheduler.clone();
        let h = hits.clone();
        scheduler.schedule_after(Duration::from_millis(16), move || {
            h.set(h.get() + 1);
            let h = h.clone();
            inner.schedule_after(Duration::from_millis(16), move || h.set(h.get() + 10));
        });
        assert_eq!(scheduler.run_until_idle(), 2);
        assert_eq!(hits.get(), 11);
    }

    #[test]
    fn test_cancel() {
        let (clock, scheduler) = manual();
        let id = scheduler.schedule_after(Duration::from_millis(1), || panic!("cancelled"));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        clock.advance(Duration::from_millis(2));
        assert_eq!(scheduler.run_due(), 0);
    }
}
