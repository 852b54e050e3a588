//! Dynamically typed elements and the fallible facades over them.
//!
//! The typed API in [`sets`](crate::sets), [`flatten`](crate::flatten) and
//! [`ordering`](crate::ordering) cannot receive a non-sequence where a
//! sequence is expected. [`Value`] models data whose shape is only known at
//! run time (decoded documents, scripting bridges). The functions in this
//! module validate their arguments, fail fast with
//! [`Error::InvalidArgument`] on malformed input, and delegate to the typed
//! core.
//!
//! # Equality
//!
//! `PartialEq` for `Value` **is** the equality kernel: scalars compare by
//! value, arrays and objects by reference (`Rc` pointer). Two separately
//! built arrays with equal contents are not equal; use
//! [`Value::structural_eq`] to compare contents explicitly.
//!
//! # Ordering
//!
//! Only numbers, strings, and booleans are orderable sort keys, and only
//! against keys of the same kind. `NaN`, `undefined`, `null`, arrays,
//! objects, and mixed kinds fail with [`Error::IncomparableKeys`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::equality::Identical;
use crate::error::Error;
use crate::{ordering, sets};

/// A dynamically typed element.
///
/// Dropping a `Value` is iterative, so arbitrarily deep arrays and objects
/// are freed without exhausting the stack.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Missing value; also the absent marker of [`zip`].
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// IEEE double.
    Number(f64),
    /// Immutable string, compared by content.
    Str(Rc<str>),
    /// Shared sequence, compared by reference.
    Array(Rc<Vec<Value>>),
    /// Shared mapping, compared by reference. Never recursed into by
    /// [`flatten`].
    Object(Rc<BTreeMap<String, Value>>),
}

impl Value {
    /// Builds an array value.
    ///
    /// # Examples
    /// ```
    /// use u_collections::value::Value;
    /// let v = Value::array([1, 2, 3]);
    /// assert_eq!(v.as_array().unwrap().len(), 3);
    /// ```
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Builds an object value from key/value pairs.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(Rc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Name of the runtime type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Returns the elements of an array value.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `self` is not an array.
    pub fn as_array(&self) -> Result<&[Value], Error> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(Error::expected_array("value", other.type_name())),
        }
    }

    /// Reads `self[field]`.
    ///
    /// Objects return the named entry; strings and arrays answer `"length"`.
    /// Anything else is [`Value::Undefined`].
    ///
    /// # Examples
    /// ```
    /// use u_collections::value::Value;
    /// let moe = Value::object([("name", Value::from("moe")), ("age", Value::from(40))]);
    /// assert_eq!(moe.get("age"), Value::Number(40.0));
    /// assert_eq!(moe.get("missing"), Value::Undefined);
    /// assert_eq!(Value::from("héllo").get("length"), Value::Number(5.0));
    /// ```
    pub fn get(&self, field: &str) -> Value {
        match (self, field) {
            (Value::Object(map), _) => map.get(field).cloned().unwrap_or_default(),
            (Value::Str(s), "length") => Value::Number(s.encode_utf16().count() as f64),
            (Value::Array(items), "length") => Value::Number(items.len() as f64),
            _ => Value::Undefined,
        }
    }

    /// Deep comparison of contents, for callers that need structural rather
    /// than reference equality.
    ///
    /// Recurses once per level of nesting.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y)))
            }
            (Value::Object(a), Value::Object(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter()
                            .zip(b.iter())
                            .all(|((ka, va), (kb, vb))| ka == kb && va.structural_eq(vb)))
            }
            _ => self.identical(other),
        }
    }

    fn is_orderable(&self) -> bool {
        match self {
            Value::Number(n) => !n.is_nan(),
            Value::Str(_) | Value::Bool(_) => true,
            _ => false,
        }
    }
}

// Moves the children of a uniquely owned array or object into `out`,
// leaving the container empty. Shared containers are left alone; their
// other owners keep them alive.
fn detach_children(value: &mut Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            if let Some(items) = Rc::get_mut(items) {
                out.append(items);
            }
        }
        Value::Object(map) => {
            if let Some(map) = Rc::get_mut(map) {
                out.extend(std::mem::take(map).into_values());
            }
        }
        _ => {}
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut child) = pending.pop() {
            detach_children(&mut child, &mut pending);
            // `child` now owns no containers and drops without recursing.
        }
    }
}

impl Identical for Value {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.identical(other)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ if self.identical(other) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(f64::from(n))
                }
            }
        )*
    };
}

impl_from_number!(f64, f32, i32, u32, i16, u16, i8, u8);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Undefined, Into::into)
    }
}

// ============================================================================
// Facades
// ============================================================================

fn array_arg<'a>(value: &'a Value, what: &str) -> Result<&'a [Value], Error> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Error::expected_array(what, other.type_name())),
    }
}

fn array_args(values: &[Value]) -> Result<Vec<&[Value]>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| array_arg(v, &format!("argument {i}")))
        .collect()
}

/// [`sets::uniq`] over an array value.
///
/// # Errors
/// [`Error::InvalidArgument`] if `seq` is not an array.
pub fn uniq(seq: &Value) -> Result<Value, Error> {
    Ok(sets::uniq(array_arg(seq, "argument 0")?).into())
}

/// [`sets::intersection`] over array values.
///
/// # Errors
/// [`Error::InvalidArgument`] if any argument is not an array.
///
/// # Examples
/// ```
/// use u_collections::value::{intersection, Value};
/// let out = intersection(&[Value::array([1, 2, 3]), Value::array([2, 3, 4])]).unwrap();
/// assert!(out.structural_eq(&Value::array([2, 3])));
///
/// assert!(intersection(&[Value::array([1]), Value::from(1)]).is_err());
/// ```
pub fn intersection(seqs: &[Value]) -> Result<Value, Error> {
    Ok(sets::intersection(&array_args(seqs)?).into())
}

/// [`sets::difference`] over array values.
///
/// # Errors
/// [`Error::InvalidArgument`] if any argument is not an array.
pub fn difference(seq: &Value, others: &[Value]) -> Result<Value, Error> {
    let seq = array_arg(seq, "argument 0")?;
    let others = others
        .iter()
        .enumerate()
        .map(|(i, v)| array_arg(v, &format!("argument {}", i + 1)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sets::difference(seq, &others).into())
}

/// Flattens nested arrays into one array of leaves.
///
/// Only arrays are containers; objects and scalars are leaves. Traversal
/// uses an explicit stack, so depth is bounded by the heap.
///
/// # Errors
/// [`Error::InvalidArgument`] if `nested` is not an array.
///
/// # Examples
/// ```
/// use u_collections::value::{flatten, Value};
/// let nested = Value::array([
///     Value::from(1),
///     Value::array([Value::from(2), Value::array([Value::from(3)])]),
/// ]);
/// assert!(flatten(&nested).unwrap().structural_eq(&Value::array([1, 2, 3])));
/// ```
pub fn flatten(nested: &Value) -> Result<Value, Error> {
    let root = array_arg(nested, "argument 0")?;
    let mut leaves = Vec::new();
    let mut frames = vec![root.iter()];
    while let Some(frame) = frames.last_mut() {
        match frame.next() {
            Some(Value::Array(children)) => frames.push(children.iter()),
            Some(leaf) => leaves.push(leaf.clone()),
            None => {
                frames.pop();
            }
        }
    }
    Ok(leaves.into())
}

/// How [`sort_by`] derives a key from each element.
#[derive(Clone, Copy)]
pub enum SortKey<'a> {
    /// `element[name]`, see [`Value::get`].
    Field(&'a str),
    /// A fallible key function; its first error is returned by the sort.
    Func(&'a dyn Fn(&Value) -> Result<Value, Error>),
}

impl SortKey<'_> {
    fn extract(&self, item: &Value) -> Result<Value, Error> {
        match self {
            SortKey::Field(name) => Ok(item.get(name)),
            SortKey::Func(f) => f(item),
        }
    }
}

impl<'a> From<&'a str> for SortKey<'a> {
    fn from(name: &'a str) -> Self {
        SortKey::Field(name)
    }
}

impl fmt::Debug for SortKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Field(name) => f.debug_tuple("Field").field(name).finish(),
            SortKey::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Stable sort of an array value by a field name or key function.
///
/// # Errors
/// - [`Error::InvalidArgument`] if `seq` is not an array.
/// - Any error returned by a [`SortKey::Func`].
/// - [`Error::IncomparableKeys`] if a key is not a number, string or
///   boolean, is `NaN`, or differs in kind from the other keys.
///
/// # Examples
/// ```
/// use u_collections::value::{sort_by, SortKey, Value};
/// let people = Value::array([
///     Value::object([("name", "curly"), ("rank", "b")]),
///     Value::object([("name", "moe"), ("rank", "a")]),
/// ]);
/// let sorted = sort_by(&people, SortKey::Field("rank")).unwrap();
/// let first = &sorted.as_array().unwrap()[0];
/// assert_eq!(first.get("name"), Value::from("moe"));
/// ```
pub fn sort_by(seq: &Value, key: SortKey<'_>) -> Result<Value, Error> {
    let items = array_arg(seq, "argument 0")?;
    let mut index = 0;
    let sorted = ordering::try_sort_by(items, |item| {
        let k = key.extract(item)?;
        let at = index;
        index += 1;
        if k.is_orderable() {
            Ok(k)
        } else {
            Err(Error::IncomparableKeys { left: at, right: at })
        }
    })?;
    Ok(sorted.into())
}

/// [`ordering::zip`] over array values, with [`Value::Undefined`] as the
/// absent marker. Each tuple is an array value.
///
/// # Errors
/// [`Error::InvalidArgument`] if any argument is not an array.
pub fn zip(seqs: &[Value]) -> Result<Value, Error> {
    let rows = ordering::zip(&array_args(seqs)?);
    Ok(Value::array(
        rows.into_iter()
            .map(|row| Value::array(row.into_iter().map(Option::unwrap_or_default))),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(v: &Value) -> Vec<f64> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|x| match x {
                Value::Number(n) => *n,
                other => panic!("expected number, got {}", other.type_name()),
            })
            .collect()
    }

    fn person(name: &str, age: i32) -> Value {
        Value::object([("name", Value::from(name)), ("age", Value::from(age))])
    }

    fn names(v: &Value) -> Vec<String> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|p| match &p.get("name") {
                Value::Str(s) => s.to_string(),
                other => panic!("expected string, got {}", other.type_name()),
            })
            .collect()
    }

    // --- Value ---

    #[test]
    fn test_kernel_equality() {
        let arr = Value::array([1, 2]);
        assert_eq!(arr, arr.clone());
        assert_ne!(arr, Value::array([1, 2]));
        assert_eq!(Value::from("a"), Value::from(String::from("a")));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Null, Value::Undefined);
        assert_ne!(Value::from(1), Value::from("1"));
    }

    #[test]
    fn test_structural_eq() {
        let a = Value::array([Value::from(1), Value::object([("k", "v")])]);
        let b = Value::array([Value::from(1), Value::object([("k", "v")])]);
        let c = Value::array([Value::from(1), Value::object([("k", "w")])]);
        assert!(a.structural_eq(&b));
        assert!(!a.structural_eq(&c));
    }

    #[test]
    fn test_as_array_rejects_scalars() {
        let err = Value::from(3).as_array().unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("value must be an array, got number".into())
        );
    }

    #[test]
    fn test_get_non_object() {
        assert_eq!(Value::from(1).get("x"), Value::Undefined);
        assert_eq!(Value::array([1, 2]).get("length"), Value::Number(2.0));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Undefined);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }

    // --- set facades ---

    #[test]
    fn test_uniq_reference_semantics() {
        let shared = Value::array([1]);
        let input = Value::array([shared.clone(), Value::array([1]), shared.clone(), Value::from(2), Value::from(2)]);
        let out = uniq(&input).unwrap();
        let out = out.as_array().unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], shared);
    }

    #[test]
    fn test_uniq_rejects_non_array() {
        assert!(matches!(uniq(&Value::Null), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_intersection_names_bad_argument() {
        let err = intersection(&[Value::array([1]), Value::from("x")]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("argument 1 must be an array, got string".into())
        );
    }

    #[test]
    fn test_difference() {
        let out = difference(&Value::array([1, 2, 3, 4]), &[Value::array([2, 4])]).unwrap();
        assert_eq!(nums(&out), vec![1.0, 3.0]);
    }

    #[test]
    fn test_difference_names_bad_other() {
        let err = difference(&Value::array([1]), &[Value::array([1]), Value::Undefined]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("argument 2 must be an array, got undefined".into())
        );
    }

    // --- flatten ---

    #[test]
    fn test_flatten_deep() {
        let nested = Value::array([
            Value::from(1),
            Value::array([
                Value::from(2),
                Value::array([Value::from(3), Value::array([4])]),
                Value::from(5),
            ]),
        ]);
        assert_eq!(nums(&flatten(&nested).unwrap()), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_flatten_objects_are_leaves() {
        let obj = Value::object([("inner", Value::array([1, 2]))]);
        let nested = Value::array([Value::array([obj.clone()]), Value::from(3)]);
        let out = flatten(&nested).unwrap();
        let out = out.as_array().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], obj);
    }

    #[test]
    fn test_flatten_rejects_non_array() {
        assert!(flatten(&Value::object([("a", 1)])).is_err());
    }

    #[test]
    fn test_flatten_pathological_depth() {
        let mut v = Value::array([0]);
        for i in 1..100_000 {
            v = Value::array([Value::from(i), v]);
        }
        let out = flatten(&v).unwrap();
        assert_eq!(out.as_array().unwrap().len(), 100_000);
        drop(v);
    }

    // --- Drop ---

    #[test]
    fn test_drop_deep_object_chain() {
        let mut v = Value::object([("leaf", 0)]);
        for _ in 0..100_000 {
            v = Value::object([("next", v)]);
        }
        drop(v);
    }

    #[test]
    fn test_drop_keeps_shared_children_alive() {
        let shared = Value::array([1, 2]);
        let outer = Value::array([Value::array([shared.clone()]), Value::from(3)]);
        drop(outer);
        assert_eq!(shared.as_array().unwrap().len(), 2);
        assert_eq!(shared, shared.clone());
    }

    // --- sort_by ---

    #[test]
    fn test_sort_by_field_number() {
        let people = Value::array([person("curly", 60), person("moe", 40), person("larry", 50)]);
        let out = sort_by(&people, SortKey::Field("age")).unwrap();
        assert_eq!(names(&out), vec!["moe", "larry", "curly"]);
    }

    #[test]
    fn test_sort_by_field_string() {
        let people = Value::array([person("curly", 60), person("moe", 40), person("larry", 50)]);
        let out = sort_by(&people, "name".into()).unwrap();
        assert_eq!(names(&out), vec!["curly", "larry", "moe"]);
    }

    #[test]
    fn test_sort_by_length_field() {
        let words = Value::array(["ccc", "a", "bb"]);
        let out = sort_by(&words, SortKey::Field("length")).unwrap();
        let got: Vec<Value> = out.as_array().unwrap().to_vec();
        assert_eq!(got, vec![Value::from("a"), Value::from("bb"), Value::from("ccc")]);
    }

    #[test]
    fn test_sort_by_func() {
        let negate = |v: &Value| match v {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(Error::InvalidArgument(format!("not a number: {}", other.type_name()))),
        };
        let out = sort_by(&Value::array([1, 3, 2]), SortKey::Func(&negate)).unwrap();
        assert_eq!(nums(&out), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_sort_by_func_error_propagates() {
        let strict = |v: &Value| match v {
            Value::Number(_) => Ok(v.clone()),
            other => Err(Error::InvalidArgument(format!("not a number: {}", other.type_name()))),
        };
        let input = Value::array([Value::from(1), Value::from("x")]);
        let err = sort_by(&input, SortKey::Func(&strict)).unwrap_err();
        assert_eq!(err, Error::InvalidArgument("not a number: string".into()));
    }

    #[test]
    fn test_sort_by_mixed_kinds_fails() {
        let input = Value::array([Value::from(1), Value::from("1")]);
        let identity = |v: &Value| Ok(v.clone());
        let err = sort_by(&input, SortKey::Func(&identity)).unwrap_err();
        assert_eq!(err, Error::IncomparableKeys { left: 0, right: 1 });
    }

    #[test]
    fn test_sort_by_missing_field_fails() {
        let input = Value::array([person("moe", 40), Value::object([("name", "shemp")])]);
        let err = sort_by(&input, SortKey::Field("age")).unwrap_err();
        assert_eq!(err, Error::IncomparableKeys { left: 1, right: 1 });
    }

    #[test]
    fn test_sort_by_stable() {
        let people = Value::array([person("a", 2), person("b", 1), person("c", 2), person("d", 1)]);
        let out = sort_by(&people, SortKey::Field("age")).unwrap();
        assert_eq!(names(&out), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_key_debug() {
        assert_eq!(format!("{:?}", SortKey::Field("age")), "Field(\"age\")");
    }

    // --- zip ---

    #[test]
    fn test_zip_undefined_marker() {
        let out = zip(&[Value::array(["a", "b", "c"]), Value::array([1, 2])]).unwrap();
        let rows = out.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        let last = rows[2].as_array().unwrap();
        assert_eq!(last, &[Value::from("c"), Value::Undefined]);
    }

    #[test]
    fn test_zip_rejects_non_array() {
        assert!(zip(&[Value::array([1]), Value::Bool(true)]).is_err());
    }
}
