//! Configuration tree types
//!
//! A configuration is a tree of scalars (string, int, float, bool, null),
//! sequences (arrays) and mappings (objects). Positions in the tree are
//! addressed structurally with [`ValuePath`], which renders as a dotted
//! path such as `database.password` or `servers[0].token`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A configuration value that may contain volume file references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value (may be a reference like `volumefile:secret.txt`)
    String(String),
    /// Sequence of values
    Sequence(Vec<Value>),
    /// Mapping of string keys to values
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Parse a configuration tree from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::parse(e.to_string()))
    }

    /// Parse a configuration tree from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::parse(e.to_string()))
    }

    /// Get as i64 if this is an Integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mapping if this is a Mapping
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Get a value by dotted path (e.g., "database.host" or "servers[0].name")
    ///
    /// Keys containing `.` or `[` cannot be addressed this way; use
    /// [`Value::get_at`] with a [`ValuePath`] instead.
    pub fn get_path(&self, path: &str) -> Result<&Value> {
        let parsed = ValuePath::parse(path)?;
        self.get_at(&parsed)
            .ok_or_else(|| Error::path_not_found(path))
    }

    /// Set a value by dotted path, creating intermediate mappings as needed
    ///
    /// Same key limitations as [`Value::get_path`].
    pub fn set_path(&mut self, path: &str, value: Value) -> Result<()> {
        let parsed = ValuePath::parse(path)?;
        self.set_at(&parsed, value)
    }

    /// Get the value at a structural position
    pub fn get_at(&self, path: &ValuePath) -> Option<&Value> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Mapping(map)) => map.get(key.as_str())?,
                (PathSegment::Index(idx), Value::Sequence(seq)) => seq.get(*idx)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set the value at a structural position
    ///
    /// Missing mapping nodes along the path are created. A sequence index
    /// past the end, or a scalar where a container is expected, is an error
    /// and leaves the tree unchanged.
    pub fn set_at(&mut self, path: &ValuePath, value: Value) -> Result<()> {
        let segments = path.segments();
        if segments.is_empty() {
            *self = value;
            return Ok(());
        }

        let split = self
            .write_point(segments)
            .ok_or_else(|| Error::path_not_found(path.to_string()))?;

        // Keys below the write point don't exist yet; build them detached
        let node = segments[split + 1..]
            .iter()
            .rev()
            .filter_map(PathSegment::as_key)
            .fold(value, |child, key| {
                Value::Mapping(IndexMap::from([(key.to_string(), child)]))
            });

        let mut current = self;
        for segment in &segments[..split] {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Mapping(map)) => map.get_mut(key.as_str()),
                (PathSegment::Index(idx), Value::Sequence(seq)) => seq.get_mut(*idx),
                _ => None,
            }
            .ok_or_else(|| Error::internal(format!("Write point for '{}' moved", path)))?;
        }

        match (&segments[split], current) {
            (PathSegment::Key(key), Value::Mapping(map)) => {
                map.insert(key.clone(), node);
            }
            (PathSegment::Index(idx), Value::Sequence(seq)) if *idx < seq.len() => {
                seq[*idx] = node;
            }
            _ => return Err(Error::internal(format!("Write point for '{}' moved", path))),
        }
        Ok(())
    }

    /// Index of the segment where a write along `segments` attaches
    ///
    /// Everything before it exists as a container. Everything after it is a
    /// missing mapping key. `None` if the path can't be written.
    fn write_point(&self, segments: &[PathSegment]) -> Option<usize> {
        let mut current = self;
        for (i, segment) in segments.iter().enumerate() {
            let child = match (segment, current) {
                (PathSegment::Key(key), Value::Mapping(map)) => map.get(key.as_str()),
                (PathSegment::Index(idx), Value::Sequence(seq)) => Some(seq.get(*idx)?),
                _ => return None,
            };
            match child {
                Some(child) => current = child,
                None => {
                    return segments[i + 1..]
                        .iter()
                        .all(|s| s.as_key().is_some())
                        .then_some(i)
                }
            }
        }
        Some(segments.len() - 1)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Mapping(m)
    }
}

/// A segment in a structural path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A key in a mapping (e.g., "database" in "database.host")
    Key(String),
    /// An index in a sequence (e.g., 0 in "servers[0]")
    Index(usize),
}

impl PathSegment {
    fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

/// Structural position of a node in a configuration tree
///
/// The empty path addresses the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ValuePath(Vec<PathSegment>);

impl ValuePath {
    /// The root position
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path string
    /// Supports: "key", "key.subkey", "key[0]", "key[0].subkey"
    pub fn parse(path: &str) -> Result<Self> {
        parse_path(path).map(Self)
    }

    /// Extend with a mapping key, builder style
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.push(PathSegment::Key(key.into()));
        self
    }

    /// Extend with a sequence index, builder style
    pub fn index(mut self, idx: usize) -> Self {
        self.push(PathSegment::Index(idx));
        self
    }

    /// Descend one level in place
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// Step back up one level in place
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// The segments from the root down
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// True for the empty path addressing the root
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
                let index_str: String = chars.by_ref().take_while(|&c| c != ']').collect();
                let idx: usize = index_str.parse().map_err(|_| {
                    Error::parse(format!("Invalid array index in path: {}", index_str))
                })?;
                segments.push(PathSegment::Index(idx));
            }
            ']' => {
                return Err(Error::parse("Unexpected ']' in path"));
            }
            _ => current_key.push(c),
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Key(current_key));
    }

    Ok(segments)
}
