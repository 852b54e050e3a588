//! Structural flattening of arbitrarily nested sequences.
//!
//! A [`Nested<T>`] is either a leaf or a list of further nested values.
//! Only [`Nested::List`] is a container; every `T` is an atomic leaf, even
//! when `T` is itself a map, a `Vec`, or any other composite type.
//!
//! # Algorithm
//!
//! Depth-first, left-to-right traversal driven by an explicit work stack of
//! `(slice, index)` frames instead of native recursion. Stack usage is
//! bounded by the heap, so pathological depth cannot overflow the thread
//! stack. The traversal is exposed as the lazy iterator [`Flatten`], which
//! can be paused (stop pulling) or cancelled (drop it) at any point.
//!
//! # Complexity
//! Time: O(leaves + lists), Space: O(depth)

/// A value that is either a leaf or a list of nested values.
///
/// Dropping, cloning and comparing a `Nested` are iterative, so arbitrarily
/// deep values never exhaust the stack. `Debug` output still recurses and
/// is meant for shallow values.
///
/// # Examples
/// ```
/// use u_collections::flatten::{flatten, Nested};
/// let n = vec![Nested::Leaf(1), Nested::List(vec![Nested::Leaf(2), Nested::List(vec![])])];
/// assert_eq!(flatten(&n), vec![1, 2]);
/// ```
#[derive(Debug)]
pub enum Nested<T> {
    /// An atomic element.
    Leaf(T),
    /// A container whose elements are visited in order.
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Wraps every element of `items` as a leaf of one flat list.
    pub fn from_leaves<I: IntoIterator<Item = T>>(items: I) -> Vec<Nested<T>> {
        items.into_iter().map(Nested::Leaf).collect()
    }

    /// Returns `true` for [`Nested::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self, Nested::Leaf(_))
    }

    /// Maximum list depth below this node. A leaf has depth 0, `[]` has depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(&Nested<T>, usize)> = vec![(self, 0)];
        while let Some((node, level)) = stack.pop() {
            if let Nested::List(items) = node {
                max = max.max(level + 1);
                stack.extend(items.iter().map(|child| (child, level + 1)));
            }
        }
        max
    }
}

impl<T> From<T> for Nested<T> {
    fn from(value: T) -> Self {
        Nested::Leaf(value)
    }
}

impl<T: Clone> Clone for Nested<T> {
    fn clone(&self) -> Self {
        let items = match self {
            Nested::Leaf(value) => return Nested::Leaf(value.clone()),
            Nested::List(items) => items,
        };
        // One frame per open list: its source cursor and the copy so far.
        let mut frames = vec![(items.iter(), Vec::with_capacity(items.len()))];
        loop {
            let open = frames.len();
            let Some((source, copy)) = frames.last_mut() else {
                break;
            };
            match source.next() {
                Some(Nested::Leaf(value)) => copy.push(Nested::Leaf(value.clone())),
                Some(Nested::List(children)) => {
                    frames.push((children.iter(), Vec::with_capacity(children.len())));
                }
                None if open == 1 => break,
                None => {
                    if let Some((_, done)) = frames.pop() {
                        if let Some((_, parent)) = frames.last_mut() {
                            parent.push(Nested::List(done));
                        }
                    }
                }
            }
        }
        Nested::List(frames.pop().map(|(_, root)| root).unwrap_or_default())
    }
}

impl<T: PartialEq> PartialEq for Nested<T> {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Nested::Leaf(a), Nested::Leaf(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (Nested::List(a), Nested::List(b)) => {
                    if a.len() != b.len() {
                        return false;
                    }
                    pending.extend(a.iter().zip(b.iter()));
                }
                _ => return false,
            }
        }
        true
    }
}

impl<T> Drop for Nested<T> {
    fn drop(&mut self) {
        let Nested::List(items) = self else {
            return;
        };
        if items.iter().all(Nested::is_leaf) {
            return;
        }
        let mut pending = std::mem::take(items);
        while let Some(mut node) = pending.pop() {
            if let Nested::List(children) = &mut node {
                pending.append(children);
            }
            // `node` now owns no lists and drops without recursing.
        }
    }
}

/// Lazy depth-first iterator over the leaves of nested lists.
///
/// Created by [`Flatten::new`] or [`iter_leaves`].
#[derive(Debug, Clone)]
pub struct Flatten<'a, T> {
    frames: Vec<std::slice::Iter<'a, Nested<T>>>,
}

impl<'a, T> Flatten<'a, T> {
    /// Starts a traversal of `items`.
    pub fn new(items: &'a [Nested<T>]) -> Self {
        Self {
            frames: vec![items.iter()],
        }
    }

    /// Current number of open frames (the nesting level of the cursor).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl<'a, T> Iterator for Flatten<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            let frame = self.frames.last_mut()?;
            match frame.next() {
                Some(Nested::Leaf(value)) => return Some(value),
                Some(Nested::List(children)) => self.frames.push(children.iter()),
                None => {
                    self.frames.pop();
                }
            }
        }
    }
}

impl<T> std::iter::FusedIterator for Flatten<'_, T> {}

/// Returns a lazy iterator over the leaves of `items`.
pub fn iter_leaves<T>(items: &[Nested<T>]) -> Flatten<'_, T> {
    Flatten::new(items)
}

/// Collapses nested lists into one flat sequence of leaves.
///
/// Leaves are emitted in depth-first, left-to-right order.
///
/// # Examples
/// ```
/// use u_collections::{flatten::flatten, nested};
/// assert_eq!(flatten(&nested![1, [2, [3, [4]], 5]]), vec![1, 2, 3, 4, 5]);
/// ```
pub fn flatten<T: Clone>(items: &[Nested<T>]) -> Vec<T> {
    Flatten::new(items).cloned().collect()
}

/// Builds a `Vec<Nested<_>>` from a bracketed literal.
///
/// Bracketed groups become [`Nested::List`]; every other token tree is a
/// leaf expression. Wrap multi-token leaves in parentheses, e.g. `(-1)`.
///
/// # Examples
/// ```
/// use u_collections::{nested, flatten::Nested};
/// let n = nested![1, [2, []]];
/// assert_eq!(
///     n,
///     vec![
///         Nested::Leaf(1),
///         Nested::List(vec![Nested::Leaf(2), Nested::List(vec![])]),
///     ]
/// );
/// ```
#[macro_export]
macro_rules! nested {
    (@node [$($inner:tt)*]) => {
        $crate::flatten::Nested::List($crate::nested![$($inner)*])
    };
    (@node $leaf:expr) => {
        $crate::flatten::Nested::Leaf($leaf)
    };
    ($($node:tt),* $(,)?) => {
        ::std::vec![$($crate::nested!(@node $node)),*]
    };
}
