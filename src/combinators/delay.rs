//! Deferred invocation on a cooperative timer queue.
//!
//! [`delay`] hands a function and its arguments to a [`Scheduler`] and
//! returns immediately with a cancellable [`TimerHandle`]. The host owns
//! the scheduler; this module only depends on its "run this task after
//! `wait`" primitive.
//!
//! [`EventLoop`] is the provided single-threaded scheduler: a min-heap of
//! deadlines driven by the host calling [`EventLoop::run_ready`],
//! [`EventLoop::advance`] or [`EventLoop::run_until_idle`]. It runs on a
//! system clock or on a manual (virtual) clock for deterministic tests.
//!
//! # Cancellation
//!
//! A timer moves from `Pending` to exactly one of `Fired` or `Cancelled`
//! by compare-and-swap on a shared atomic. A handle may be sent to another
//! thread; when firing and cancelling race, exactly one of them wins, so
//! the function runs at most once and never after a successful cancel.
//!
//! # Errors
//!
//! Errors returned by a deferred function cannot reach the caller of
//! `delay`, who has already returned. They are routed to the scheduler's
//! unhandled-error channel instead (see [`EventLoop::take_unhandled`]).

use std::cell::{Cell, RefCell};
use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::BoxError;

/// A unit of deferred work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() -> Result<(), BoxError>>;

/// Host timer facility: runs a task once, no earlier than `wait` from now.
pub trait Scheduler {
    /// Enqueues `task`. Must not run it synchronously.
    fn schedule(&self, wait: Duration, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    fn schedule(&self, wait: Duration, task: Task) {
        (**self).schedule(wait, task);
    }
}

impl<S: Scheduler + ?Sized> Scheduler for std::rc::Rc<S> {
    fn schedule(&self, wait: Duration, task: Task) {
        (**self).schedule(wait, task);
    }
}

/// Return types accepted from a deferred function.
///
/// Implemented for `()` and for `Result<(), E>` where `E` converts into a
/// [`BoxError`].
pub trait TaskOutcome {
    /// Converts the function's return value into a task result.
    fn into_result(self) -> Result<(), BoxError>;
}

impl TaskOutcome for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> TaskOutcome for Result<(), E> {
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

// ============================================================================
// Timer handle
// ============================================================================

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Lifecycle of a deferred invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Not yet fired or cancelled.
    Pending,
    /// The function has been invoked.
    Fired,
    /// The invocation was suppressed.
    Cancelled,
}

/// Cancellable handle to a deferred invocation.
///
/// Cheap to clone; all clones observe and control the same timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    state: Arc<AtomicU8>,
}

impl TimerHandle {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn try_fire(&self) -> bool {
        self.transition(FIRED)
    }

    /// Suppresses the invocation.
    ///
    /// Returns `true` if the timer was still pending, which guarantees the
    /// function never runs. Returns `false` if it already fired or was
    /// already cancelled.
    pub fn cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    /// Current state of the timer.
    pub fn state(&self) -> TimerState {
        match self.state.load(Ordering::Acquire) {
            PENDING => TimerState::Pending,
            FIRED => TimerState::Fired,
            _ => TimerState::Cancelled,
        }
    }

    /// Returns `true` while neither fired nor cancelled.
    pub fn is_pending(&self) -> bool {
        self.state() == TimerState::Pending
    }
}

/// Schedules `func(args)` to run once, no earlier than `wait` from now.
///
/// Returns immediately; the caller never blocks. `func` may return `()` or
/// `Result<(), E>`; an error is reported through the scheduler's
/// unhandled-error channel.
///
/// # Examples
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use u_collections::combinators::{delay, EventLoop};
///
/// let event_loop = EventLoop::manual();
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&log);
/// delay(
///     &event_loop,
///     move |(a, b): (&str, &str)| sink.borrow_mut().push(format!("{a}{b}")),
///     Duration::from_millis(500),
///     ("a", "b"),
/// );
///
/// event_loop.advance(Duration::from_millis(499));
/// assert!(log.borrow().is_empty());
/// event_loop.advance(Duration::from_millis(1));
/// assert_eq!(*log.borrow(), vec!["ab".to_string()]);
/// ```
pub fn delay<S, F, A, O>(scheduler: &S, func: F, wait: Duration, args: A) -> TimerHandle
where
    S: Scheduler + ?Sized,
    F: FnOnce(A) -> O + 'static,
    A: 'static,
    O: TaskOutcome,
{
    let handle = TimerHandle::new();
    let timer = handle.clone();
    scheduler.schedule(
        wait,
        Box::new(move || {
            if timer.try_fire() {
                func(args).into_result()
            } else {
                Ok(())
            }
        }),
    );
    handle
}

// ============================================================================
// Event loop
// ============================================================================

enum Clock {
    System(Instant),
    Manual(Cell<Duration>),
}

impl Clock {
    fn now(&self) -> Duration {
        match self {
            Clock::System(start) => start.elapsed(),
            Clock::Manual(now) => now.get(),
        }
    }
}

struct Entry {
    due: Duration,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

// Earlier deadline first; FIFO among equal deadlines.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

type UnhandledHook = Box<dyn FnMut(BoxError)>;

/// Single-threaded cooperative timer queue.
///
/// Tasks run only when the host drives the loop, on the thread that drives
/// it. A task may schedule further tasks; they run in deadline order, ties
/// in scheduling order.
pub struct EventLoop {
    clock: Clock,
    queue: RefCell<BinaryHeap<Reverse<Entry>>>,
    next_seq: Cell<u64>,
    unhandled: RefCell<Vec<BoxError>>,
    hook: RefCell<Option<UnhandledHook>>,
}

impl EventLoop {
    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            queue: RefCell::new(BinaryHeap::new()),
            next_seq: Cell::new(0),
            unhandled: RefCell::new(Vec::new()),
            hook: RefCell::new(None),
        }
    }

    /// Creates a loop driven by the system monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Clock::System(Instant::now()))
    }

    /// Creates a loop driven by a virtual clock that only moves through
    /// [`advance`](Self::advance) and [`run_until_idle`](Self::run_until_idle).
    pub fn manual() -> Self {
        Self::with_clock(Clock::Manual(Cell::new(Duration::ZERO)))
    }

    /// Time elapsed since the loop was created.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Number of queued tasks, including cancelled ones not yet reached.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns `true` if no task is queued.
    pub fn is_idle(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Routes future task errors to `hook` instead of the internal buffer.
    pub fn on_unhandled<H: FnMut(BoxError) + 'static>(&self, hook: H) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    /// Drains the errors reported by tasks since the last call.
    pub fn take_unhandled(&self) -> Vec<BoxError> {
        std::mem::take(&mut *self.unhandled.borrow_mut())
    }

    /// Runs every task whose deadline has passed. Returns how many ran.
    pub fn run_ready(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(self.now()) {
            self.execute(task);
            ran += 1;
        }
        ran
    }

    /// Lets `by` elapse, then runs every task that became due.
    ///
    /// A manual clock jumps forward; a system clock sleeps the calling
    /// thread. Tasks due at intermediate instants run in deadline order.
    pub fn advance(&self, by: Duration) -> usize {
        match &self.clock {
            Clock::Manual(now) => {
                let target = now.get() + by;
                let mut ran = 0;
                while let Some(due) = self.next_due().filter(|due| *due <= target) {
                    now.set(now.get().max(due));
                    ran += self.run_ready();
                }
                now.set(target);
                ran + self.run_ready()
            }
            Clock::System(_) => {
                std::thread::sleep(by);
                self.run_ready()
            }
        }
    }

    /// Runs tasks until the queue is empty, waiting for each deadline.
    /// Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(due) = self.next_due() {
            let now = self.now();
            if due > now {
                match &self.clock {
                    Clock::Manual(clock) => clock.set(due),
                    Clock::System(_) => std::thread::sleep(due - now),
                }
            }
            ran += self.run_ready();
        }
        ran
    }

    fn next_due(&self) -> Option<Duration> {
        self.queue.borrow().peek().map(|Reverse(entry)| entry.due)
    }

    fn pop_due(&self, now: Duration) -> Option<Task> {
        let mut queue = self.queue.borrow_mut();
        if queue.peek()?.0.due > now {
            return None;
        }
        queue.pop().map(|Reverse(entry)| entry.task)
    }

    // The queue borrow is released before the task runs so it can schedule.
    fn execute(&self, task: Task) {
        if let Err(err) = task() {
            self.report(err);
        }
    }

    // The hook is taken out while it runs so it may replace itself.
    fn report(&self, err: BoxError) {
        let taken = self.hook.borrow_mut().take();
        match taken {
            Some(mut hook) => {
                hook(err);
                let mut slot = self.hook.borrow_mut();
                if slot.is_none() {
                    *slot = Some(hook);
                }
            }
            None => self.unhandled.borrow_mut().push(err),
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for EventLoop {
    fn schedule(&self, wait: Duration, task: Task) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let due = self.now() + wait;
        self.queue
            .borrow_mut()
            .push(Reverse(Entry { due, seq, task }));
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .field("unhandled", &self.unhandled.borrow().len())
            .finish_non_exhaustive()
    }
}
