/// Read-only view over a JSON configuration object.
///
/// Keys are looked up by dotted path (`"Prevent Other Sounds.Default Sound"`).
/// Every getter returns `None` for an absent key or a value of the wrong type;
/// callers decide whether that means "use the default" or "invalid".
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSection {
    path: String,
    name: String,
    values: Map<String, Value>,
}

impl ConfigSection {
    pub fn new(path: impl Into<String>, values: Map<String, Value>) -> Self {
        let path = path.into();
        Self {
            name: path.clone(),
            path,
            values,
        }
    }

    fn child(&self, key: &str, values: &Map<String, Value>) -> Self {
        Self {
            path: self.child_path(key),
            name: key.to_string(),
            values: values.clone(),
        }
    }

    /// Wrap a JSON value; anything but an object yields `None`.
    pub fn from_value(path: impl Into<String>, value: Value) -> Option<Self> {
        match value {
            Value::Object(values) => Some(Self::new(path, values)),
            _ => None,
        }
    }

    /// Read a whole JSON file as the root section. A missing file is `Ok(None)`.
    pub fn load(file: &Path) -> Result<Option<Self>, ConfigError> {
        if !file.exists() {
            return Ok(None);
        }

        let failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: file.display().to_string(),
            source,
        };

        let content = fs::read_to_string(file).map_err(|e| failed(Box::new(e)))?;
        let value: Value = serde_json::from_str(&content).map_err(|e| failed(Box::new(e)))?;
        let root = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::from_value(root, value)
            .map(Some)
            .ok_or_else(|| ConfigError::Invalid(format!("{} is not a JSON object", file.display())))
    }

    /// Full dotted path of this section, for error messages.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    /// String list; a single string counts as a one-element list.
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            Value::String(s) => Some(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }

    pub fn get_section(&self, key: &str) -> Option<ConfigSection> {
        match self.get(key)? {
            Value::Object(values) => Some(self.child(key, values)),
            _ => None,
        }
    }

    /// Direct children in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Direct children that are themselves sections, in insertion order.
    pub fn sections(&self) -> Vec<ConfigSection> {
        self.values
            .iter()
            .filter_map(|(k, v)| match v {
                Value::Object(values) => Some(self.child(k, values)),
                _ => None,
            })
            .collect()
    }

    /// Key this section was stored under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
