//! Single-invocation guard.
//!
//! [`once`] wraps a function so it runs lazily on the **first** call and
//! never again. Every call, including the first, returns a reference to
//! the same cached result; arguments of later calls are dropped unused.
//!
//! A fallible function is expressed with `R = Result<T, E>`: the first
//! caller receives the error, and since the function never runs twice the
//! same `Err` is what later callers see.

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::marker::PhantomData;

/// A function that runs at most once and caches its result.
///
/// Created by [`once`]. Not `Sync`: the first call and the cache live on
/// one thread.
pub struct Once<F, A, R> {
    func: Cell<Option<F>>,
    value: OnceCell<R>,
    _args: PhantomData<fn(A)>,
}

/// Wraps `func` so it runs on the first call only.
///
/// # Examples
/// ```
/// use std::cell::Cell;
/// use u_collections::combinators::once;
///
/// let runs = Cell::new(0);
/// let init = once(|base: i32| {
///     runs.set(runs.get() + 1);
///     base * 10
/// });
/// assert_eq!(*init.call(4), 40);
/// assert_eq!(*init.call(7), 40); // arguments ignored after the first call
/// assert_eq!(runs.get(), 1);
/// ```
pub fn once<F, A, R>(func: F) -> Once<F, A, R>
where
    F: FnOnce(A) -> R,
{
    Once {
        func: Cell::new(Some(func)),
        value: OnceCell::new(),
        _args: PhantomData,
    }
}

impl<F, A, R> Once<F, A, R>
where
    F: FnOnce(A) -> R,
{
    /// Runs the wrapped function on the first call, then returns its
    /// cached result on every call.
    ///
    /// # Panics
    /// Panics if called from inside the wrapped function, or after the
    /// wrapped function panicked on its first call.
    pub fn call(&self, args: A) -> &R {
        if let Some(value) = self.value.get() {
            return value;
        }
        let Some(func) = self.func.take() else {
            panic!("Once::call re-entered while its function was running, or after it panicked");
        };
        let value = func(args);
        self.value.get_or_init(|| value)
    }

    /// Returns the cached result without running anything.
    pub fn get(&self) -> Option<&R> {
        self.value.get()
    }

    /// Returns `true` once the wrapped function has completed.
    pub fn has_run(&self) -> bool {
        self.value.get().is_some()
    }

    /// Consumes the wrapper, returning the cached result if any.
    pub fn into_inner(self) -> Option<R> {
        self.value.into_inner()
    }
}

impl<F, A, R: fmt::Debug> fmt::Debug for Once<F, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Once").field("value", &self.value.get()).finish()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn first_argument_wins(args in proptest::collection::vec(any::<i64>(), 1..30)) {
            let runs = Cell::new(0_usize);
            let wrapped = once(|x: i64| {
                runs.set(runs.get() + 1);
                x
            });
            for &a in &args {
                prop_assert_eq!(*wrapped.call(a), args[0]);
            }
            prop_assert_eq!(runs.get(), 1);
        }
    }
}
