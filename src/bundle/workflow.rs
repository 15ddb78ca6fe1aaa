use super::annotations::TaskAnnotations;
use super::model::BundleObject;
use super::task::Task;

/// Fallback display name for workflows that carry none.
pub const UNNAMED_WORKFLOW: &str = "Unnamed Workflow";

/// A borrowed workflow object together with its key in `objects`.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowRef<'a> {
    pub key: &'a str,
    pub object: &'a BundleObject,
}

impl<'a> WorkflowRef<'a> {
    pub fn new(key: &'a str, object: &'a BundleObject) -> Self {
        Self { key, object }
    }

    /// The workflow id: `fields.id`, falling back to the object key.
    pub fn id(&self) -> &'a str {
        self.object.field_str("id").unwrap_or(self.key)
    }

    pub fn name(&self) -> &'a str {
        self.object.display_name().unwrap_or(UNNAMED_WORKFLOW)
    }

    pub fn task_count(&self) -> usize {
        self.object.raw_tasks().map_or(0, Vec::len)
    }

    pub fn has_tasks(&self) -> bool {
        self.object.raw_tasks().is_some()
    }

    /// Decodes the task list, paired with each task's position in the raw array.
    ///
    /// The index is the key into the side table, so it is kept even when an
    /// earlier entry was dropped.
    pub fn tasks(&self) -> Vec<(usize, Task)> {
        self.object
            .raw_tasks()
            .map(|raw| {
                raw.iter()
                    .enumerate()
                    .filter_map(|(index, value)| Task::from_value(index, value).map(|t| (index, t)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn annotations(&self) -> TaskAnnotations {
        TaskAnnotations::from_fields(&self.object.nonfunctional_fields)
    }

    /// Whether `id` names this workflow by `fields.id` or object key.
    pub fn matches_id(&self, id: &str) -> bool {
        self.id() == id || self.key == id
    }
}
