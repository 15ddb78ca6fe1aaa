use ahash::AHashMap;
use indexmap::IndexMap;
use serde_json::Value;

/// The per-task fields stored in the `nonfunctional_fields` side table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskField {
    /// `tasks[i].metadata`, usually carrying the stored canvas position.
    Metadata,
    /// `tasks[i].description`
    Description,
    /// `tasks[i].next[j].label`
    TransitionLabel(usize),
    /// Any other `tasks[i].<path>` entry, keyed by its remaining path.
    Other(String),
}

impl TaskField {
    /// The on-disk key for this field of task `task_index`.
    pub fn key(&self, task_index: usize) -> String {
        match self {
            TaskField::Metadata => format!("tasks[{}].metadata", task_index),
            TaskField::Description => format!("tasks[{}].description", task_index),
            TaskField::TransitionLabel(transition) => {
                format!("tasks[{}].next[{}].label", task_index, transition)
            }
            TaskField::Other(path) => format!("tasks[{}].{}", task_index, path),
        }
    }
}

/// Typed view of the side table that annotates tasks by synthetic path keys.
///
/// On disk the table is keyed by strings such as `tasks[3].metadata`; this
/// parses those keys once so lookups are by `(task index, field)`.
#[derive(Debug, Clone, Default)]
pub struct TaskAnnotations {
    entries: AHashMap<(usize, TaskField), Value>,
}

impl TaskAnnotations {
    pub fn from_fields(fields: &IndexMap<String, Value>) -> Self {
        let mut entries = AHashMap::new();
        for (key, value) in fields {
            if let Some(slot) = parse_key(key) {
                // First entry wins if a key is repeated under different spellings.
                entries.entry(slot).or_insert_with(|| value.clone());
            }
        }
        Self { entries }
    }

    pub fn get(&self, task_index: usize, field: &TaskField) -> Option<&Value> {
        self.entries.get(&(task_index, field.clone()))
    }

    pub fn metadata(&self, task_index: usize) -> Option<&Value> {
        self.get(task_index, &TaskField::Metadata)
    }

    pub fn description(&self, task_index: usize) -> Option<&str> {
        self.get(task_index, &TaskField::Description)
            .and_then(Value::as_str)
    }

    pub fn transition_label(&self, task_index: usize, transition_index: usize) -> Option<&str> {
        self.get(task_index, &TaskField::TransitionLabel(transition_index))
            .and_then(Value::as_str)
    }

    /// The stored canvas position of a task, if its metadata carries one.
    pub fn position(&self, task_index: usize) -> Option<(f64, f64)> {
        let metadata = self.metadata(task_index)?;
        let source = metadata.get("position").unwrap_or(metadata);
        let x = source.get("x").and_then(Value::as_f64)?;
        let y = source.get("y").and_then(Value::as_f64)?;
        Some((x, y))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Parses `tasks[<i>].<rest>` into a slot. Returns `None` for unrelated keys.
fn parse_key(key: &str) -> Option<(usize, TaskField)> {
    let (index, rest) = parse_indexed(key.strip_prefix("tasks")?)?;
    let rest = rest.strip_prefix('.')?;

    let field = match rest {
        "metadata" => TaskField::Metadata,
        "description" => TaskField::Description,
        _ => match rest.strip_prefix("next").and_then(parse_indexed) {
            Some((transition, ".label")) => TaskField::TransitionLabel(transition),
            _ if rest.is_empty() => return None,
            _ => TaskField::Other(rest.to_string()),
        },
    };
    Some((index, field))
}

/// Parses a leading `[<n>]`, returning the index and the remainder.
fn parse_indexed(s: &str) -> Option<(usize, &str)> {
    let inner = s.strip_prefix('[')?;
    let close = inner.find(']')?;
    let index = inner[..close].trim().parse().ok()?;
    Some((index, &inner[close + 1..]))
}
