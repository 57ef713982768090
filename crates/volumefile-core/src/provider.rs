//! Value providers
//!
//! A provider answers "what is the value of this named setting?". The
//! resolution engine only ever asks for the mount variable, but keeping the
//! lookup behind a trait lets callers and tests substitute their own source.

use std::collections::HashMap;

/// Trait for named value lookups
pub trait ValueProvider: Send + Sync {
    /// Look up `key`, returning `None` when it is not defined
    fn get(&self, key: &str) -> Option<String>;
}

/// Provider backed by the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProvider;

impl ValueProvider for EnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        // Non-unicode values are treated as undefined
        std::env::var(key).ok()
    }
}

/// Provider backed by a fixed in-memory map
#[derive(Debug, Clone, Default)]
pub struct MapProvider {
    values: HashMap<String, String>,
}

impl MapProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapProvider
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ValueProvider for MapProvider {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A simple function-based provider
pub struct FnProvider<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    func: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    /// Create a new function-based provider
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> ValueProvider for FnProvider<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.func)(key)
    }
}
