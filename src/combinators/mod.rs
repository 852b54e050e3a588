//! Function-wrapping combinators.
//!
//! Each combinator returns a small owned state object that captures the
//! wrapped callable together with its cache or timer state. No state is
//! global: two wrappers of the same function never share a cache.
//!
//! - [`Once`]: runs its function on the first call only.
//! - [`Memoized`], [`TryMemoized`], [`SyncMemoized`]: argument-keyed caches.
//! - [`delay`]: deferred invocation on a [`Scheduler`].

pub mod delay;
pub mod memoize;
pub mod once;

pub use delay::{delay, EventLoop, Scheduler, Task, TaskOutcome, TimerHandle, TimerState};
pub use memoize::{
    memoize, memoize_fallible, memoize_sync, MemoStats, Memoized, SyncMemoized, TryMemoized,
};
pub use once::{once, Once};
