//! Three-way comparison functions and the factory that builds them.
//!
//! A [`ComparerSpec`] describes *how* to order values: naturally, by one key
//! path, by a list of key paths (lexicographically), or by a caller-supplied
//! function. It is resolved once into a [`Comparer`], so key paths are
//! parsed and validated at construction and never during comparison.

use std::{cmp::Ordering, fmt, sync::Arc};

use coseq_common::{Error, Result};
use serde_json::Value;

use crate::{
    key_path::KeyPath,
    orderable::{Orderable, compare_keys},
};

type CompareFn<T> = dyn Fn(&T, &T) -> Ordering + Send + Sync;

/// A shareable three-way ordering function.
pub struct Comparer<T> {
    f: Arc<CompareFn<T>>,
}

impl<T> Clone for Comparer<T> {
    fn clone(&self) -> Self {
        Comparer { f: self.f.clone() }
    }
}

impl<T> fmt::Debug for Comparer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Comparer")
    }
}

impl<T: 'static> Comparer<T> {
    /// Wraps a caller-supplied comparison function.
    pub fn from_fn<F>(f: F) -> Comparer<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Comparer { f: Arc::new(f) }
    }

    /// Orders values with their `PartialOrd` implementation; incomparable
    /// pairs compare equal.
    pub fn natural() -> Comparer<T>
    where
        T: PartialOrd,
    {
        Comparer::from_fn(|a: &T, b: &T| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }

    /// Builds an ascending comparer from `spec`.
    pub fn ascending(spec: impl Into<ComparerSpec<T>>) -> Result<Comparer<T>>
    where
        T: Orderable,
    {
        match spec.into() {
            ComparerSpec::Natural => Ok(Comparer::from_fn(|a: &T, b: &T| a.natural_cmp(b))),
            ComparerSpec::KeyPath(path) => {
                let path = KeyPath::parse(&path)?;
                Ok(Comparer::from_fn(move |a: &T, b: &T| {
                    compare_by_path(a, b, &path)
                }))
            }
            ComparerSpec::KeyPathList(paths) => {
                if paths.is_empty() {
                    return Err(Error::invalid_comparer_spec("[]", "empty key path list"));
                }
                let paths = paths
                    .iter()
                    .map(|p| KeyPath::parse(p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Comparer::from_fn(move |a: &T, b: &T| {
                    paths
                        .iter()
                        .map(|path| compare_by_path(a, b, path))
                        .find(|o| o.is_ne())
                        .unwrap_or(Ordering::Equal)
                }))
            }
            ComparerSpec::Custom(comparer) => Ok(comparer),
        }
    }

    /// Builds the ascending comparer for `spec` and negates it.
    pub fn descending(spec: impl Into<ComparerSpec<T>>) -> Result<Comparer<T>>
    where
        T: Orderable,
    {
        Ok(Comparer::ascending(spec)?.reversed())
    }

    /// Returns a comparer with every non-equal result negated.
    pub fn reversed(&self) -> Comparer<T> {
        let inner = self.f.clone();
        Comparer::from_fn(move |a: &T, b: &T| inner(a, b).reverse())
    }
}

impl<T> Comparer<T> {
    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.f)(a, b)
    }

    #[inline]
    pub fn is_less(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

fn compare_by_path<T: Orderable>(a: &T, b: &T, path: &KeyPath) -> Ordering {
    let left = a.lookup(path);
    let right = b.lookup(path);
    compare_keys(left.as_deref(), right.as_deref())
}

/// Describes how a [`Comparer`] should order values.
pub enum ComparerSpec<T> {
    /// `<` / `>` ordering of the values themselves.
    Natural,
    /// Compare the values found at one key path.
    KeyPath(String),
    /// Compare key paths in order; the first non-equal result decides.
    KeyPathList(Vec<String>),
    /// A ready-made comparer, used unchanged.
    Custom(Comparer<T>),
}

impl<T> ComparerSpec<T> {
    /// Interprets a dynamically-typed spec: `null` is natural ordering, a
    /// string is a key path, an array of strings is a key-path list.
    /// Anything else is rejected with `InvalidComparerSpec`.
    pub fn from_value(value: &Value) -> Result<ComparerSpec<T>> {
        match value {
            Value::Null => Ok(ComparerSpec::Natural),
            Value::String(path) => Ok(ComparerSpec::KeyPath(path.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        Error::invalid_comparer_spec(
                            value.to_string(),
                            "key path list should contain only strings",
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(ComparerSpec::KeyPathList),
            other => Err(Error::invalid_comparer_spec(
                other.to_string(),
                "expected null, a string or an array of strings",
            )),
        }
    }
}

impl<T> Default for ComparerSpec<T> {
    fn default() -> Self {
        ComparerSpec::Natural
    }
}

impl<T> fmt::Debug for ComparerSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparerSpec::Natural => f.write_str("Natural"),
            ComparerSpec::KeyPath(p) => f.debug_tuple("KeyPath").field(p).finish(),
            ComparerSpec::KeyPathList(p) => f.debug_tuple("KeyPathList").field(p).finish(),
            ComparerSpec::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl<T> From<()> for ComparerSpec<T> {
    fn from(_: ()) -> Self {
        ComparerSpec::Natural
    }
}

impl<T> From<&str> for ComparerSpec<T> {
    fn from(path: &str) -> Self {
        ComparerSpec::KeyPath(path.to_string())
    }
}

impl<T> From<String> for ComparerSpec<T> {
    fn from(path: String) -> Self {
        ComparerSpec::KeyPath(path)
    }
}

impl<T> From<&[&str]> for ComparerSpec<T> {
    fn from(paths: &[&str]) -> Self {
        ComparerSpec::KeyPathList(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl<T, const N: usize> From<[&str; N]> for ComparerSpec<T> {
    fn from(paths: [&str; N]) -> Self {
        ComparerSpec::from(&paths[..])
    }
}

impl<T> From<Vec<String>> for ComparerSpec<T> {
    fn from(paths: Vec<String>) -> Self {
        ComparerSpec::KeyPathList(paths)
    }
}

impl<T> From<Comparer<T>> for ComparerSpec<T> {
    fn from(comparer: Comparer<T>) -> Self {
        ComparerSpec::Custom(comparer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn person(name: &str, age: i64) -> Value {
        json!({ "name": name, "age": age })
    }

    #[test]
    fn test_natural() {
        let c = Comparer::<i32>::ascending(()).unwrap();
        assert_eq!(c.compare(&1, &2), Ordering::Less);
        assert_eq!(c.compare(&2, &2), Ordering::Equal);
        assert_eq!(c.compare(&3, &2), Ordering::Greater);

        let c = Comparer::<String>::ascending(ComparerSpec::Natural).unwrap();
        assert!(c.is_less(&"abc".to_string(), &"abd".to_string()));

        let c = Comparer::<Vec<i32>>::natural();
        assert!(c.is_less(&vec![1, 2], &vec![1, 2, 0]));
    }

    #[test]
    fn test_single_key_path() {
        let c = Comparer::ascending("age").unwrap();
        assert_eq!(c.compare(&person("a", 3), &person("b", 5)), Ordering::Less);
        assert_eq!(c.compare(&person("a", 5), &person("b", 5)), Ordering::Equal);

        let nested = Comparer::ascending("address.city").unwrap();
        let a = json!({ "address": { "city": "Bergen" } });
        let b = json!({ "address": { "city": "Oslo" } });
        assert_eq!(nested.compare(&a, &b), Ordering::Less);
        assert_eq!(nested.compare(&a, &json!({})), Ordering::Equal);
    }

    #[test]
    fn test_key_path_list_falls_back_to_next_key() {
        let asc = Comparer::ascending(["age", "name"]).unwrap();
        let desc = Comparer::descending(["age", "name"]).unwrap();

        let ann = person("ann", 30);
        let bob = person("bob", 30);
        let cid = person("cid", 25);
        assert_eq!(asc.compare(&ann, &bob), Ordering::Less);
        assert_eq!(asc.compare(&bob, &ann), Ordering::Greater);
        assert_eq!(asc.compare(&cid, &ann), Ordering::Less);
        assert_eq!(asc.compare(&ann, &ann), Ordering::Equal);

        for (a, b) in [(&ann, &bob), (&bob, &ann), (&cid, &ann), (&ann, &ann)] {
            assert_eq!(desc.compare(a, b), asc.compare(a, b).reverse());
        }
    }

    #[test]
    fn test_custom_is_used_unchanged() {
        let by_len = Comparer::from_fn(|a: &String, b: &String| a.len().cmp(&b.len()));
        let c = Comparer::ascending(by_len).unwrap();
        assert!(c.is_less(&"zz".to_string(), &"aaa".to_string()));
        let d = Comparer::descending(ComparerSpec::Custom(c)).unwrap();
        assert!(d.is_less(&"aaa".to_string(), &"zz".to_string()));
    }

    #[test]
    fn test_descending_preserves_zero() {
        let d = Comparer::<i64>::descending(()).unwrap();
        assert_eq!(d.compare(&4, &4), Ordering::Equal);
        assert_eq!(d.compare(&1, &4), Ordering::Greater);
    }

    #[test]
    fn test_invalid_specs() {
        let is_invalid = |r: Result<Comparer<Value>>| {
            matches!(
                r.unwrap_err().kind(),
                coseq_common::ErrorKind::InvalidComparerSpec { .. }
            )
        };
        assert!(is_invalid(Comparer::ascending("a..b")));
        assert!(is_invalid(Comparer::ascending(Vec::<String>::new())));
        assert!(is_invalid(ComparerSpec::from_value(&json!(42)).and_then(Comparer::ascending)));
        assert!(is_invalid(
            ComparerSpec::from_value(&json!(["age", 1])).and_then(Comparer::ascending)
        ));
    }

    #[test]
    fn test_spec_from_value() {
        let c: Comparer<Value> =
            Comparer::ascending(ComparerSpec::from_value(&json!(["age", "name"])).unwrap())
                .unwrap();
        assert_eq!(
            c.compare(&person("b", 1), &person("a", 1)),
            Ordering::Greater
        );
        assert!(matches!(
            ComparerSpec::<Value>::from_value(&Value::Null).unwrap(),
            ComparerSpec::Natural
        ));
    }
}
