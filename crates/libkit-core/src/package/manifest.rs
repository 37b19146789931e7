//! package.json access with field order preserved

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// A parsed package.json object
///
/// Fields keep their original order so rewritten manifests diff cleanly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageManifest {
    fields: Map<String, Value>,
}

impl PackageManifest {
    pub fn parse(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("Invalid JSON")?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => anyhow::bail!("Expected a JSON object, found {}", json_kind(&other)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }

    /// The package name, failing if it is missing or not a string
    pub fn require_name(&self) -> Result<&str> {
        match self.name() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => anyhow::bail!("package.json has no \"name\" field"),
        }
    }

    /// Set a field, keeping its position if it already exists
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Remove a field without disturbing the order of the others
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Two-space indented JSON
    pub fn to_pretty_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.fields).context("Failed to serialize package.json")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
