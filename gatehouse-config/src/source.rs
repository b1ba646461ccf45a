// Key-value configuration sources

use crate::{ConfigError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

/// A flat, string-keyed configuration source.
///
/// Lookups happen at call time, so a source that changes underneath (the
/// process environment, a [`MapSource`] updated by a reload task) is observed
/// on the next read.
pub trait ConfigSource: Send + Sync {
    /// Raw value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Value for `key`, treating the empty string as absent.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Whether `key` holds a non-empty value.
    fn has(&self, key: &str) -> bool {
        self.get_non_empty(key).is_some()
    }

    /// Value for `key`, or [`ConfigError::KeyNotFound`].
    fn require(&self, key: &str) -> Result<String> {
        self.get_non_empty(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Reads the process environment on every lookup.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: Option<String>,
}

impl EnvSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Look keys up as `{PREFIX}_{KEY}`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Load a single variable, surfacing why it could not be read.
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Copy every matching variable into a map, with the prefix stripped.
    pub fn snapshot(&self) -> HashMap<String, String> {
        env::vars()
            .filter_map(|(key, value)| match &self.prefix {
                Some(prefix) => key
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| (rest.to_string(), value)),
                None => Some((key, value)),
            })
            .collect()
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(self.full_key(key)).ok()
    }
}

/// In-memory source. Values can be replaced at runtime.
#[derive(Debug, Default)]
pub struct MapSource {
    values: RwLock<HashMap<String, String>>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.write().remove(key)
    }

    /// Replace the whole content atomically.
    pub fn replace(&self, values: HashMap<String, String>) {
        *self.values.write() = values;
    }

    pub fn extend<I, K, V>(&self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = self.values.write();
        for (k, v) in pairs {
            values.insert(k.into(), v.into());
        }
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Sorted key list.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }
}

/// Consults each layer in order; the first non-empty value wins.
#[derive(Clone, Default)]
pub struct LayeredSource {
    layers: Vec<Arc<dyn ConfigSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: impl ConfigSource + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    pub fn push(&mut self, layer: Arc<dyn ConfigSource>) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl ConfigSource for LayeredSource {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get_non_empty(key))
    }
}
