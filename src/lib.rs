//! # u-collections
//!
//! Collection and function primitives for the U-Engine ecosystem.
//!
//! This crate provides set algebra, flattening, ordering, and function
//! combinators over plain slices. Every sequence operation reads its inputs
//! and returns a freshly allocated result; nothing is mutated in place
//! except where a function name says so.
//!
//! ## Modules
//!
//! - [`equality`]: The [`Identical`] kernel shared by every membership test
//! - [`sets`]: Order-preserving `uniq`, `intersection`, `difference`
//! - [`flatten`]: Arbitrary-depth nesting with a stack-safe leaf iterator
//! - [`ordering`]: Stable key sorting and ragged `zip`
//! - [`select`]: Leading/trailing elements and `index_of`
//! - [`combinators`]: `once`, `memoize`, and scheduler-driven `delay`
//! - [`value`]: Dynamically typed elements with fail-fast facades
//! - [`random`]: Seeded shuffling (feature `random`)
//! - [`error`]: Error types
//!
//! ## Design Philosophy
//!
//! - **One equality**: value equality for scalars, reference equality for
//!   shared handles, applied the same way by every operation
//! - **Stable output order**: results follow first-occurrence order of the
//!   primary input
//! - **No recursion on data**: nesting depth is bounded by the heap, not the
//!   call stack
//! - **Property-based testing**: algebraic laws verified via proptest

pub mod combinators;
pub mod equality;
pub mod error;
pub mod flatten;
pub mod ordering;
#[cfg(feature = "random")]
pub mod random;
pub mod select;
pub mod sets;
pub mod value;

pub use equality::Identical;
pub use error::{BoxError, Error};
pub use flatten::Nested;
