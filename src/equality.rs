//! The equality kernel: exact-match comparison used by every other module.
//!
//! Two elements are **identical** when they are the same primitive value
//! or the same shared allocation. There is no deep or structural
//! comparison:
//!
//! | Type | Identical when |
//! |---|---|
//! | integers, `bool`, `char`, `()` | values are equal |
//! | `str`, `String` | contents are equal (strings are primitives) |
//! | `f32`, `f64` | IEEE `==`: `NaN` is never identical, `0.0` is identical to `-0.0` |
//! | `Rc<T>`, `Arc<T>` | both point to the same allocation |
//! | `&T`, `Option<T>` | the referents / payloads are identical |
//!
//! Callers that need structural equality of composite elements layer it
//! explicitly through the `*_by` operations (see [`crate::sets`]) instead
//! of changing this relation.

use std::rc::Rc;
use std::sync::Arc;

/// Exact-match equality: same primitive value or same reference.
///
/// # Examples
/// ```
/// use std::rc::Rc;
/// use u_collections::equality::Identical;
///
/// assert!(3_i32.identical(&3));
/// assert!(!f64::NAN.identical(&f64::NAN));
///
/// let a = Rc::new(vec![1, 2]);
/// let b = Rc::new(vec![1, 2]);
/// assert!(a.identical(&Rc::clone(&a)));
/// assert!(!a.identical(&b)); // equal contents, different allocations
/// ```
pub trait Identical {
    /// Returns `true` if `self` and `other` are the same value or reference.
    fn identical(&self, other: &Self) -> bool;
}

/// Free-function form of [`Identical::identical`].
///
/// # Examples
/// ```
/// use u_collections::equality::equals;
/// assert!(equals(&"a", &"a"));
/// assert!(!equals(&1, &2));
/// ```
#[inline]
pub fn equals<T: Identical + ?Sized>(a: &T, b: &T) -> bool {
    a.identical(b)
}

/// Returns `true` if some element of `seq` is identical to `target`.
#[inline]
pub(crate) fn occurs_in<T: Identical>(seq: &[T], target: &T) -> bool {
    seq.iter().any(|x| x.identical(target))
}

macro_rules! impl_identical_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl Identical for $t {
                #[inline]
                fn identical(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_identical_by_value!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, (), str, String,
    f32, f64,
);

impl<T: Identical + ?Sized> Identical for &T {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        (**self).identical(*other)
    }
}

impl<T: Identical> Identical for Option<T> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.identical(b),
            _ => false,
        }
    }
}

impl<T: ?Sized> Identical for Rc<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identical for Arc<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}
