//! Deferred tasks: the release half of a note is always run through here.
//!
//! Two clocks implement [`Scheduler`]:
//! - [`VirtualClock`] is advanced explicitly, either by a test or by the audio
//!   render callback (the browser build counts rendered frames).
//! - [`LocalTimer`] sleeps on the tokio timer wheel and needs a `LocalSet`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// A deferred unit of work. Runs at most once.
pub type Task = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Fired,
    Cancelled,
}

/// Handle to a scheduled task.
///
/// Clones share state, so a handle can be kept by the caller while the clock
/// owns another copy.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    state: Rc<Cell<TaskState>>,
}

impl TaskHandle {
    fn new() -> Self {
        TaskHandle {
            state: Rc::new(Cell::new(TaskState::Pending)),
        }
    }

    /// Prevent the task from running. Returns false if it already fired
    /// or was cancelled before.
    pub fn cancel(&self) -> bool {
        if self.state.get() == TaskState::Pending {
            self.state.set(TaskState::Cancelled);
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    pub fn is_pending(&self) -> bool {
        self.state.get() == TaskState::Pending
    }

    fn fire(&self, task: Task) {
        if self.state.get() == TaskState::Pending {
            self.state.set(TaskState::Fired);
            task();
        }
    }
}

/// Something that can run a task after a delay.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
}

struct Entry {
    due: Duration,
    seq: u64,
    handle: TaskHandle,
    task: Task,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_seq: u64,
    queue: Vec<Entry>,
}

/// A clock that only moves when told to.
///
/// Tasks due at the same instant run in the order they were scheduled.
#[derive(Clone, Default)]
pub struct VirtualClock {
    inner: Rc<RefCell<ClockState>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the clock was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of tasks still waiting to run.
    pub fn pending(&self) -> usize {
        self.inner
            .borrow()
            .queue
            .iter()
            .filter(|e| e.handle.is_pending())
            .count()
    }

    /// Move time forward, running every task that falls due on the way.
    /// Tasks scheduled by a running task are picked up if they fall due
    /// before the new time as well.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(entry) = self.pop_due(target) {
            entry.handle.fire(entry.task);
        }
        self.inner.borrow_mut().now = target;
    }

    fn pop_due(&self, target: Duration) -> Option<Entry> {
        let mut state = self.inner.borrow_mut();
        let idx = state
            .queue
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= target)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;
        let entry = state.queue.swap_remove(idx);
        state.now = state.now.max(entry.due);
        Some(entry)
    }
}

impl Scheduler for VirtualClock {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let mut state = self.inner.borrow_mut();
        let entry = Entry {
            due: state.now + delay,
            seq: state.next_seq,
            handle: handle.clone(),
            task,
        };
        state.next_seq += 1;
        state.queue.push(entry);
        handle
    }
}

/// Wall-clock timer on the current thread's tokio `LocalSet`.
///
/// Scheduling outside of a `LocalSet` panics, as `spawn_local` does.
#[cfg(feature = "native")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimer;

#[cfg(feature = "native")]
impl Scheduler for LocalTimer {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let timer = handle.clone();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            timer.fire(task);
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |label: &'static str| -> Task {
            let sink = sink.clone();
            Box::new(move || sink.borrow_mut().push(label))
        };
        (log, make)
    }

    #[test]
    fn runs_task_only_once_due() {
        let clock = VirtualClock::new();
        let (log, task) = recorder();
        let handle = clock.schedule(Duration::from_millis(200), task("release"));

        clock.advance(Duration::from_millis(199));
        assert!(log.borrow().is_empty());
        assert!(handle.is_pending());

        clock.advance(Duration::from_millis(1));
        assert_eq!(*log.borrow(), vec!["release"]);
        assert_eq!(handle.state(), TaskState::Fired);

        clock.advance(Duration::from_secs(1));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn orders_by_due_time_then_schedule_order() {
        let clock = VirtualClock::new();
        let (log, task) = recorder();
        clock.schedule(Duration::from_millis(50), task("late"));
        clock.schedule(Duration::from_millis(10), task("early-a"));
        clock.schedule(Duration::from_millis(10), task("early-b"));

        clock.advance(Duration::from_millis(100));
        assert_eq!(*log.borrow(), vec!["early-a", "early-b", "late"]);
        assert_eq!(clock.now(), Duration::from_millis(100));
    }

    #[test]
    fn cancelled_task_never_runs() {
        let clock = VirtualClock::new();
        let (log, task) = recorder();
        let handle = clock.schedule(Duration::from_millis(10), task("cut"));

        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert_eq!(clock.pending(), 0);

        clock.advance(Duration::from_millis(20));
        assert!(log.borrow().is_empty());
        assert_eq!(handle.state(), TaskState::Cancelled);
    }

    #[test]
    fn cancel_after_fire_is_refused() {
        let clock = VirtualClock::new();
        let (_log, task) = recorder();
        let handle = clock.schedule(Duration::ZERO, task("now"));
        clock.advance(Duration::ZERO);
        assert!(!handle.cancel());
        assert_eq!(handle.state(), TaskState::Fired);
    }

    #[test]
    fn task_scheduled_from_task_runs_in_same_advance() {
        let clock = VirtualClock::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_clock = clock.clone();
        let inner_log = log.clone();
        clock.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                inner_log.borrow_mut().push(inner_clock.now());
                let nested_log = inner_log.clone();
                let nested_clock = inner_clock.clone();
                inner_clock.schedule(
                    Duration::from_millis(5),
                    Box::new(move || nested_log.borrow_mut().push(nested_clock.now())),
                );
            }),
        );

        clock.advance(Duration::from_millis(30));
        assert_eq!(
            *log.borrow(),
            vec![Duration::from_millis(10), Duration::from_millis(15)]
        );
    }

    #[cfg(feature = "native")]
    #[tokio::test(start_paused = true)]
    async fn local_timer_fires_after_delay() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let hits = Rc::new(Cell::new(0));
                let counter = hits.clone();
                let handle = LocalTimer.schedule(
                    Duration::from_millis(200),
                    Box::new(move || counter.set(counter.get() + 1)),
                );

                tokio::time::sleep(Duration::from_millis(199)).await;
                assert_eq!(hits.get(), 0);

                tokio::time::sleep(Duration::from_millis(2)).await;
                assert_eq!(hits.get(), 1);
                assert_eq!(handle.state(), TaskState::Fired);
            })
            .await;
    }

    #[cfg(feature = "native")]
    #[tokio::test(start_paused = true)]
    async fn local_timer_respects_cancel() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let hits = Rc::new(Cell::new(0));
                let counter = hits.clone();
                let handle = LocalTimer.schedule(
                    Duration::from_millis(50),
                    Box::new(move || counter.set(counter.get() + 1)),
                );
                handle.cancel();

                tokio::time::sleep(Duration::from_millis(100)).await;
                assert_eq!(hits.get(), 0);
            })
            .await;
    }
}
