//! Argument-keyed memoization.
//!
//! A memoized wrapper computes `f(x)` on the first call with `x`, stores the
//! result keyed by `x`, and answers later calls with the same `x` from the
//! cache without running `f`. Keys compare by exact value (`Eq + Hash`), so
//! the argument is expected to be a primitive-like value: integers, `char`,
//! `bool`, strings, or tuples of them.
//!
//! # Resource growth
//!
//! Caches are **never evicted**. Each distinct argument adds one entry that
//! lives as long as the wrapper. Callers needing bounded memory should drop
//! the wrapper or use a bounded cache of their own.
//!
//! # Variants
//!
//! | Wrapper | Function | Threads |
//! |---|---|---|
//! | [`Memoized`] | `Fn(A) -> R` | one (`RefCell`) |
//! | [`TryMemoized`] | `Fn(A) -> Result<R, E>`, caches `Ok` only | one (`RefCell`) |
//! | [`SyncMemoized`] | `Fn(A) -> R` | many (`Mutex`) |
//!
//! The cache is never borrowed or locked while the wrapped function runs,
//! so a function may call back into its own wrapper.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Hit/miss counters and current size of a memo cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoStats {
    /// Calls answered from the cache.
    pub hits: u64,
    /// Calls that ran the wrapped function.
    pub misses: u64,
    /// Number of cached results.
    pub entries: usize,
}

impl MemoStats {
    /// Fraction of calls answered from the cache, or `None` before any call.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        if total == 0 {
            None
        } else {
            Some(self.hits as f64 / total as f64)
        }
    }
}

/// Single-threaded cache shared by [`Memoized`] and [`TryMemoized`].
struct LocalCache<A, V> {
    entries: RefCell<HashMap<A, V>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<A: Eq + Hash, V: Clone> LocalCache<A, V> {
    fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    fn lookup(&self, arg: &A) -> Option<V> {
        let found = self.entries.borrow().get(arg).cloned();
        match found {
            Some(_) => self.hits.set(self.hits.get() + 1),
            None => self.misses.set(self.misses.get() + 1),
        }
        found
    }

    // A reentrant call may have stored the same key first; keep that one.
    fn store(&self, arg: A, value: V) {
        self.entries.borrow_mut().entry(arg).or_insert(value);
    }

    fn contains(&self, arg: &A) -> bool {
        self.entries.borrow().contains_key(arg)
    }

    fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.entries.borrow().len(),
        }
    }
}

// ============================================================================
// Memoized
// ============================================================================

/// A function wrapped with a per-argument result cache.
///
/// Created by [`memoize`].
pub struct Memoized<F, A, R> {
    func: F,
    cache: LocalCache<A, R>,
}

/// Wraps `func` with a cache keyed by its argument.
///
/// # Examples
/// ```
/// use std::cell::Cell;
/// use u_collections::combinators::memoize;
///
/// let runs = Cell::new(0);
/// let square = memoize(|x: u64| {
///     runs.set(runs.get() + 1);
///     x * x
/// });
/// assert_eq!(square.call(12), 144);
/// assert_eq!(square.call(12), 144);
/// assert_eq!(runs.get(), 1);
/// assert_eq!(square.stats().hits, 1);
/// ```
pub fn memoize<F, A, R>(func: F) -> Memoized<F, A, R>
where
    F: Fn(A) -> R,
    A: Eq + Hash + Clone,
    R: Clone,
{
    Memoized {
        func,
        cache: LocalCache::new(),
    }
}

impl<F, A, R> Memoized<F, A, R>
where
    F: Fn(A) -> R,
    A: Eq + Hash + Clone,
    R: Clone,
{
    /// Returns the cached result for `arg`, computing and storing it first
    /// if `arg` has not been seen.
    pub fn call(&self, arg: A) -> R {
        if let Some(hit) = self.cache.lookup(&arg) {
            return hit;
        }
        let value = (self.func)(arg.clone());
        self.cache.store(arg, value.clone());
        value
    }

    /// Returns `true` if a result for `arg` is cached.
    pub fn is_cached(&self, arg: &A) -> bool {
        self.cache.contains(arg)
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.cache.entries.borrow().len()
    }

    /// Returns `true` if nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cache counters.
    pub fn stats(&self) -> MemoStats {
        self.cache.stats()
    }
}

impl<F, A, R> fmt::Debug for Memoized<F, A, R>
where
    A: Eq + Hash,
    R: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("stats", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TryMemoized
// ============================================================================

/// A fallible function wrapped with a cache of its successful results.
///
/// Created by [`memoize_fallible`]. Errors are returned to the caller and
/// never cached, so the next call with the same argument retries.
pub struct TryMemoized<F, A, R> {
    func: F,
    cache: LocalCache<A, R>,
}

/// Wraps a fallible `func` with a cache of its `Ok` results.
///
/// # Examples
/// ```
/// use std::cell::Cell;
/// use u_collections::combinators::memoize_fallible;
///
/// let attempts = Cell::new(0);
/// let flaky = memoize_fallible(|x: u32| {
///     attempts.set(attempts.get() + 1);
///     if attempts.get() == 1 { Err("transient") } else { Ok(x + 1) }
/// });
/// assert_eq!(flaky.call(1), Err("transient"));
/// assert_eq!(flaky.call(1), Ok(2)); // retried
/// assert_eq!(flaky.call(1), Ok(2)); // cached
/// assert_eq!(attempts.get(), 2);
/// ```
pub fn memoize_fallible<F, A, R, E>(func: F) -> TryMemoized<F, A, R>
where
    F: Fn(A) -> Result<R, E>,
    A: Eq + Hash + Clone,
    R: Clone,
{
    TryMemoized {
        func,
        cache: LocalCache::new(),
    }
}

impl<F, A, R> TryMemoized<F, A, R>
where
    A: Eq + Hash + Clone,
    R: Clone,
{
    /// Returns the cached result for `arg`, or runs the wrapped function
    /// and caches its result if it succeeds.
    ///
    /// # Errors
    /// Whatever the wrapped function returns; the failure is not cached.
    pub fn call<E>(&self, arg: A) -> Result<R, E>
    where
        F: Fn(A) -> Result<R, E>,
    {
        if let Some(hit) = self.cache.lookup(&arg) {
            return Ok(hit);
        }
        let value = (self.func)(arg.clone())?;
        self.cache.store(arg, value.clone());
        Ok(value)
    }

    /// Returns `true` if a successful result for `arg` is cached.
    pub fn is_cached(&self, arg: &A) -> bool {
        self.cache.contains(arg)
    }

    /// Cache counters. A failed call counts as a miss.
    pub fn stats(&self) -> MemoStats {
        self.cache.stats()
    }
}

impl<F, A, R> fmt::Debug for TryMemoized<F, A, R>
where
    A: Eq + Hash,
    R: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryMemoized")
            .field("stats", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SyncMemoized
// ============================================================================

/// A memoized function whose cache is guarded by a mutex.
///
/// Created by [`memoize_sync`]. Shareable across threads when `F`, `A` and
/// `R` are. The lock is released while the wrapped function runs, so two
/// threads missing on the same key at the same time may both run it; the
/// first stored result is kept and returned to later callers.
pub struct SyncMemoized<F, A, R> {
    func: F,
    entries: Mutex<HashMap<A, R>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Wraps `func` with a thread-safe cache keyed by its argument.
///
/// # Examples
/// ```
/// use u_collections::combinators::memoize_sync;
///
/// let len = memoize_sync(|s: String| s.len());
/// std::thread::scope(|scope| {
///     for _ in 0..4 {
///         scope.spawn(|| assert_eq!(len.call("abc".to_string()), 3));
///     }
/// });
/// assert_eq!(len.stats().entries, 1);
/// ```
pub fn memoize_sync<F, A, R>(func: F) -> SyncMemoized<F, A, R>
where
    F: Fn(A) -> R,
    A: Eq + Hash + Clone,
    R: Clone,
{
    SyncMemoized {
        func,
        entries: Mutex::new(HashMap::new()),
        hits: AtomicU64::new(0),
        misses: AtomicU64::new(0),
    }
}

impl<F, A, R> SyncMemoized<F, A, R> {
    fn entries(&self) -> MutexGuard<'_, HashMap<A, R>> {
        // The map is always left consistent, so a poisoned lock is usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache counters.
    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries().len(),
        }
    }
}

impl<F, A, R> SyncMemoized<F, A, R>
where
    F: Fn(A) -> R,
    A: Eq + Hash + Clone,
    R: Clone,
{
    /// Returns the cached result for `arg`, computing it first if needed.
    pub fn call(&self, arg: A) -> R {
        let cached = self.entries().get(&arg).cloned();
        if let Some(hit) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hit;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = (self.func)(arg.clone());
        self.entries().entry(arg).or_insert(value).clone()
    }

    /// Returns `true` if a result for `arg` is cached.
    pub fn is_cached(&self, arg: &A) -> bool {
        self.entries().contains_key(arg)
    }
}

impl<F, A, R> fmt::Debug for SyncMemoized<F, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncMemoized")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::sync::atomic::AtomicUsize;

    // --- memoize ---

    #[test]
    fn test_memoize_calls_once_per_argument() {
        let runs = Cell::new(0);
        let double = memoize(|x: i32| {
            runs.set(runs.get() + 1);
            x * 2
        });
        assert_eq!(double.call(3), 6);
        assert_eq!(double.call(3), 6);
        assert_eq!(double.call(4), 8);
        assert_eq!(runs.get(), 2);
        assert_eq!(
            double.stats(),
            MemoStats {
                hits: 1,
                misses: 2,
                entries: 2
            }
        );
    }

    #[test]
    fn test_memoize_keys_by_argument() {
        let upper = memoize(|s: String| s.to_uppercase());
        assert_eq!(upper.call("a".into()), "A");
        assert_eq!(upper.call("b".into()), "B");
        assert!(upper.is_cached(&"a".to_string()));
        assert!(!upper.is_cached(&"c".to_string()));
        assert_eq!(upper.len(), 2);
    }

    #[test]
    fn test_memoize_starts_empty() {
        let id = memoize(|x: u8| x);
        assert!(id.is_empty());
        assert_eq!(id.stats().hit_rate(), None);
    }

    #[test]
    fn test_memoize_independent_caches() {
        let f = |x: u8| x;
        let a = memoize(f);
        let b = memoize(f);
        a.call(1);
        assert!(a.is_cached(&1));
        assert!(!b.is_cached(&1));
    }

    #[test]
    fn test_memoize_returns_identical_cached_value() {
        let boxed = memoize(|x: u8| Rc::new(x));
        let first = boxed.call(9);
        let second = boxed.call(9);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_memoize_reentrant_recursion() {
        type Fib = Rc<dyn Fn(u64) -> u64>;
        let slot: Rc<RefCell<Option<Fib>>> = Rc::new(RefCell::new(None));
        let inner = Rc::clone(&slot);
        let fib = Rc::new(memoize(move |n: u64| {
            if n < 2 {
                return n;
            }
            let recurse = inner.borrow().clone();
            match recurse {
                Some(f) => f(n - 1) + f(n - 2),
                None => unreachable!("slot is filled before the first call"),
            }
        }));
        let outer = Rc::clone(&fib);
        let wrapper: Fib = Rc::new(move |n| outer.call(n));
        *slot.borrow_mut() = Some(Rc::clone(&wrapper));

        assert_eq!(wrapper(50), 12_586_269_025);
        assert_eq!(fib.stats().misses, 51);
        // break the Rc cycle
        slot.borrow_mut().take();
    }

    #[test]
    fn test_hit_rate() {
        let stats = MemoStats {
            hits: 3,
            misses: 1,
            entries: 1,
        };
        assert_eq!(stats.hit_rate(), Some(0.75));
    }

    // --- memoize_fallible ---

    #[test]
    fn test_fallible_does_not_cache_errors() {
        let runs = Cell::new(0);
        let parse = memoize_fallible(|s: &'static str| {
            runs.set(runs.get() + 1);
            s.parse::<i32>()
        });
        assert!(parse.call("x").is_err());
        assert!(parse.call("x").is_err());
        assert_eq!(runs.get(), 2);
        assert!(!parse.is_cached(&"x"));

        assert_eq!(parse.call("7"), Ok(7));
        assert_eq!(parse.call("7"), Ok(7));
        assert_eq!(runs.get(), 3);
        assert_eq!(parse.stats().hits, 1);
    }

    // --- memoize_sync ---

    #[test]
    fn test_sync_single_thread_call_count() {
        let runs = AtomicUsize::new(0);
        let cube = memoize_sync(|x: i64| {
            runs.fetch_add(1, Ordering::SeqCst);
            x * x * x
        });
        assert_eq!(cube.call(3), 27);
        assert_eq!(cube.call(3), 27);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(cube.is_cached(&3));
    }

    #[test]
    fn test_sync_many_threads() {
        let runs = AtomicUsize::new(0);
        let square = memoize_sync(|x: u32| {
            runs.fetch_add(1, Ordering::SeqCst);
            u64::from(x) * u64::from(x)
        });
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for x in 0..100_u32 {
                        assert_eq!(square.call(x), u64::from(x) * u64::from(x));
                    }
                });
            }
        });
        let stats = square.stats();
        assert_eq!(stats.entries, 100);
        assert_eq!(stats.hits + stats.misses, 800);
        assert!(runs.load(Ordering::SeqCst) >= 100);
    }

    #[test]
    fn test_debug_shows_stats() {
        let id = memoize(|x: u8| x);
        id.call(1);
        let text = format!("{id:?}");
        assert!(text.starts_with("Memoized { stats: MemoStats { hits: 0, misses: 1, entries: 1 }"));
    }
}
