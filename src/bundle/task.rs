use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// A single workflow step, decoded from one entry of `fields.tasks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action: Option<ActionRef>,
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next: Vec<Transition>,
    #[serde(default)]
    pub timeout: Option<Value>,
    #[serde(default)]
    pub transition_mode: Option<String>,
    #[serde(default)]
    pub retry: Option<Value>,
    #[serde(default)]
    pub is_mocked: Option<bool>,
    #[serde(default)]
    pub run_as_org_id: Option<String>,
    #[serde(default)]
    pub security_schema: Option<Value>,
    #[serde(default)]
    pub human_seconds_saved: Option<f64>,
    #[serde(default)]
    pub publish_result_as: Option<String>,
}

/// The action a task invokes: a reference id plus the inline ref string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawActionRef")]
pub struct ActionRef {
    pub id: Option<String>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawActionRef {
    Inline(String),
    Full {
        #[serde(default)]
        id: Option<String>,
        #[serde(default, rename = "ref")]
        reference: Option<String>,
    },
}

impl From<RawActionRef> for ActionRef {
    fn from(raw: RawActionRef) -> Self {
        match raw {
            RawActionRef::Inline(reference) => ActionRef {
                id: None,
                reference: Some(reference),
            },
            RawActionRef::Full { id, reference } => ActionRef { id, reference },
        }
    }
}

/// An outgoing branch of a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub when: Option<String>,
    #[serde(rename = "do", default, deserialize_with = "one_or_many")]
    pub targets: Vec<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub publish: Option<Value>,
}

impl Transition {
    /// More than one target means every branch is taken.
    pub fn is_follow_all(&self) -> bool {
        self.targets.len() > 1
    }
}

impl Task {
    /// Decodes a task from its raw JSON entry.
    ///
    /// A task that fails the typed decode keeps its id and name so it still
    /// shows up as a node. Entries without a string id are dropped.
    pub fn from_value(index: usize, raw: &Value) -> Option<Task> {
        match Task::deserialize(raw) {
            Ok(task) => Some(task),
            Err(e) => {
                let id = raw.get("id").and_then(Value::as_str);
                match id {
                    Some(id) => {
                        warn!(task = id, index, error = %e, "Task has an unexpected shape, keeping id only");
                        Some(Task {
                            id: id.to_string(),
                            name: raw.get("name").and_then(Value::as_str).map(str::to_string),
                            ..Task::default()
                        })
                    }
                    None => {
                        warn!(index, error = %e, "Skipping task without an id");
                        None
                    }
                }
            }
        }
    }

    /// The name shown for this task, falling back to its id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.id)
    }

    pub fn action_id(&self) -> Option<&str> {
        self.action.as_ref().and_then(|a| a.id.as_deref())
    }

    pub fn action_ref(&self) -> Option<&str> {
        self.action.as_ref().and_then(|a| a.reference.as_deref())
    }
}

pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(target)) => vec![target],
        Some(OneOrMany::Many(targets)) => targets,
        None => Vec::new(),
    })
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}
