//! Parsed property paths used to extract comparison keys from records.
//!
//! Grammar (informal):
//!
//! ```text
//! path     := segment ( '.' segment | '[' index ']' | '[' quoted ']' )*
//! segment  := one or more chars other than '.', '[' and ']'
//! index    := decimal digits
//! quoted   := '"' chars '"' | '\'' chars '\''
//! ```
//!
//! A plain segment made only of digits (`items.0.name`) addresses an array
//! element when applied to an array and an object field otherwise.

use std::borrow::Cow;

use coseq_common::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// A validated, pre-split property path such as `address.city` or
/// `tags[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    source: String,
    segments: Vec<PathSegment>,
}

impl KeyPath {
    pub fn parse(path: &str) -> Result<KeyPath> {
        let segments = parse_segments(path)?;
        Ok(KeyPath {
            source: path.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Resolves this path against a JSON value, borrowing the target.
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Field(name), Value::Object(map)) => map.get(name)?,
                (PathSegment::Field(name), Value::Array(items)) => {
                    items.get(name.parse::<usize>().ok()?)?
                }
                (PathSegment::Index(i), Value::Array(items)) => items.get(*i)?,
                (PathSegment::Index(i), Value::Object(map)) => map.get(&i.to_string())?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Like [`KeyPath::resolve`], wrapped for use as an `Orderable::lookup`
    /// result.
    pub fn lookup<'v>(&self, root: &'v Value) -> Option<Cow<'v, Value>> {
        self.resolve(root).map(Cow::Borrowed)
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KeyPath::parse(s)
    }
}

fn invalid(path: &str, reason: &str) -> Error {
    Error::invalid_comparer_spec(path, reason)
}

fn parse_segments(path: &str) -> Result<Vec<PathSegment>> {
    if path.is_empty() {
        return Err(invalid(path, "empty key path"));
    }

    let mut segments = Vec::new();
    let mut chars = path.char_indices().peekable();
    let mut current = String::new();
    // Set after a closing bracket: the next char must be '.', '[' or end.
    let mut after_bracket = false;

    while let Some((pos, c)) = chars.next() {
        match c {
            '.' => {
                if after_bracket {
                    after_bracket = false;
                } else {
                    if current.is_empty() {
                        return Err(invalid(path, "empty segment"));
                    }
                    segments.push(PathSegment::Field(std::mem::take(&mut current)));
                }
                if chars.peek().is_none() {
                    return Err(invalid(path, "trailing '.'"));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut current)));
                } else if segments.is_empty() && pos != 0 {
                    return Err(invalid(path, "empty segment"));
                }
                let mut inner = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(invalid(path, "unbalanced '['"));
                }
                segments.push(parse_bracket(path, inner.trim())?);
                after_bracket = true;
            }
            ']' => return Err(invalid(path, "unbalanced ']'")),
            c => {
                if after_bracket {
                    return Err(invalid(path, "expected '.' or '[' after ']'"));
                }
                current.push(c);
            }
        }
    }

    if !current.is_empty() {
        segments.push(PathSegment::Field(current));
    }
    if segments.is_empty() {
        return Err(invalid(path, "empty key path"));
    }
    Ok(segments)
}

fn parse_bracket(path: &str, inner: &str) -> Result<PathSegment> {
    if inner.is_empty() {
        return Err(invalid(path, "empty brackets"));
    }
    let quoted = |q: char| inner.len() >= 2 && inner.starts_with(q) && inner.ends_with(q);
    if quoted('"') || quoted('\'') {
        return Ok(PathSegment::Field(inner[1..inner.len() - 1].to_string()));
    }
    inner
        .parse::<usize>()
        .map(PathSegment::Index)
        .map_err(|_| invalid(path, "bracket content must be an index or a quoted name"))
}
