use crate::error::BundleError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;

use super::task::null_as_default;
use super::workflow::WorkflowRef;

/// The top-level export document.
///
/// `objects` and `references` keep document order. Every "first match" rule in
/// the resolver and the introspection helpers relies on that order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub version: u64,
    #[serde(default)]
    pub exported_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: IndexMap<String, BundleObject>,
    #[serde(default)]
    pub references: Option<IndexMap<String, Reference>>,
}

/// A single exported object. The shape of `fields` depends on `kind`.
///
/// Missing or `null` members fall back to empty values so one malformed
/// object never fails the whole document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleObject {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: ObjectKind,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub fields: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nonfunctional_fields: IndexMap<String, Value>,
}

/// The open set of object types found in a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectKind {
    Workflow,
    Trigger,
    Action,
    Other(String),
}

/// Maps the hash of a target object to every location that uses it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    #[serde(default, deserialize_with = "null_as_default")]
    pub src_key_hash: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
}

impl From<String> for ObjectKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "workflow" => ObjectKind::Workflow,
            "trigger" => ObjectKind::Trigger,
            "action" => ObjectKind::Action,
            _ => ObjectKind::Other(value),
        }
    }
}

/// An object without a `type` is kept as an unnamed kind.
impl Default for ObjectKind {
    fn default() -> Self {
        ObjectKind::Other(String::new())
    }
}

impl From<ObjectKind> for String {
    fn from(kind: ObjectKind) -> Self {
        kind.as_str().to_string()
    }
}

impl ObjectKind {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectKind::Workflow => "workflow",
            ObjectKind::Trigger => "trigger",
            ObjectKind::Action => "action",
            ObjectKind::Other(name) => name,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BundleObject {
    /// The content-addressed identity of the object.
    pub fn identity(&self) -> Option<&str> {
        self.hash.as_deref().or(self.content_hash.as_deref())
    }

    pub fn is_workflow(&self) -> bool {
        self.kind == ObjectKind::Workflow
    }

    pub fn is_trigger(&self) -> bool {
        self.kind == ObjectKind::Trigger
    }

    /// Reads a string value from `fields`.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Reads a string value from `nonfunctional_fields`.
    pub fn nonfunctional_str(&self, name: &str) -> Option<&str> {
        self.nonfunctional_fields.get(name).and_then(Value::as_str)
    }

    /// The presentation name, preferring the nonfunctional display name.
    pub fn display_name(&self) -> Option<&str> {
        self.nonfunctional_str("name")
            .or_else(|| self.nonfunctional_str("display_name"))
            .or_else(|| self.nonfunctional_str("displayName"))
            .or_else(|| self.field_str("name"))
            .filter(|name| !name.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.nonfunctional_str("description")
            .or_else(|| self.field_str("description"))
    }

    /// The raw `fields.tasks` array, if this object has one.
    pub fn raw_tasks(&self) -> Option<&Vec<Value>> {
        self.fields.get("tasks").and_then(Value::as_array)
    }
}

impl Bundle {
    /// Parses a bundle from a JSON string. No validation is performed.
    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        serde_json::from_str(json).map_err(|e| BundleError::JsonParseError(e.to_string()))
    }

    /// Parses a bundle from raw bytes, e.g. an uploaded file.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BundleError> {
        serde_json::from_slice(bytes).map_err(|e| BundleError::JsonParseError(e.to_string()))
    }

    /// Loads a bundle from disk.
    pub fn from_file(path: &str) -> Result<Self, BundleError> {
        let bytes = fs::read(path).map_err(|e| BundleError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_slice(&bytes)
    }

    /// Checks the minimal structural requirements of an export.
    pub fn validate(&self) -> Result<(), BundleError> {
        if !matches!(self.version, 1 | 2) {
            return Err(BundleError::UnsupportedVersion(self.version));
        }
        if self.exported_at.is_none() {
            return Err(BundleError::MissingExportedAt);
        }
        if self.objects.is_empty() {
            return Err(BundleError::NoObjects);
        }
        let has_workflow = self
            .objects
            .values()
            .any(|object| object.is_workflow() && object.raw_tasks().is_some());
        if !has_workflow {
            return Err(BundleError::NoWorkflow);
        }
        if self.version == 1 && self.references.is_none() {
            return Err(BundleError::MissingReferences);
        }
        Ok(())
    }

    /// Iterates references in document order. A missing map yields nothing.
    pub fn references(&self) -> impl Iterator<Item = (&String, &Reference)> {
        self.references.iter().flat_map(|refs| refs.iter())
    }

    /// Iterates all workflow objects in document order.
    pub fn workflows(&self) -> impl Iterator<Item = WorkflowRef<'_>> {
        self.objects
            .iter()
            .filter(|(_, object)| object.is_workflow())
            .map(|(key, object)| WorkflowRef::new(key, object))
    }

    /// Iterates all trigger objects in document order.
    pub fn triggers(&self) -> impl Iterator<Item = (&String, &BundleObject)> {
        self.objects.iter().filter(|(_, object)| object.is_trigger())
    }
}
