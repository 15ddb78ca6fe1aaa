//! Read-only queries over a bundle: workflow listings, side-table lookups and
//! content heuristics used while building nodes.

pub mod subworkflow;

pub use subworkflow::{SubWorkflowDetection, SubWorkflowRule, detect_sub_workflow};

use crate::bundle::{Bundle, BundleObject, TaskField, WorkflowRef};
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;

/// A workflow entry as listed for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub task_count: usize,
}

/// Lists every workflow, largest first.
///
/// Workflows with equal task counts keep their document order.
pub fn get_workflows(bundle: &Bundle) -> Vec<WorkflowSummary> {
    bundle
        .workflows()
        .map(|workflow| WorkflowSummary {
            id: workflow.id().to_string(),
            name: workflow.name().to_string(),
            task_count: workflow.task_count(),
        })
        .sorted_by(|a, b| b.task_count.cmp(&a.task_count))
        .collect()
}

/// Finds the workflow a selection id refers to.
///
/// Bundle versions disagree on how workflows are keyed, so three strategies
/// are tried in order: `fields.id`, the object key, and finally the last
/// `:`-separated segment of a composite id against either.
pub fn find_workflow<'b>(bundle: &'b Bundle, selected_id: &str) -> Option<WorkflowRef<'b>> {
    if let Some(workflow) = bundle
        .workflows()
        .find(|w| w.object.field_str("id") == Some(selected_id))
    {
        return Some(workflow);
    }

    if let Some((key, object)) = bundle.objects.get_key_value(selected_id) {
        if object.is_workflow() {
            return Some(WorkflowRef::new(key, object));
        }
    }

    let suffix = last_segment(selected_id);
    bundle
        .workflows()
        .find(|w| last_segment(w.id()) == suffix || last_segment(w.key) == suffix)
}

fn last_segment(id: &str) -> &str {
    id.rsplit(':').next().unwrap_or(id)
}

/// `tasks[index].metadata` of a workflow, if present.
pub fn get_task_metadata(index: usize, workflow: &BundleObject) -> Option<&Value> {
    workflow
        .nonfunctional_fields
        .get(&TaskField::Metadata.key(index))
}

/// `tasks[index].description` of a workflow, if present and a string.
pub fn get_task_description(index: usize, workflow: &BundleObject) -> Option<&str> {
    workflow
        .nonfunctional_fields
        .get(&TaskField::Description.key(index))
        .and_then(Value::as_str)
}

/// `tasks[task_index].next[transition_index].label` of a workflow.
pub fn get_transition_label(
    task_index: usize,
    transition_index: usize,
    workflow: &BundleObject,
) -> Option<&str> {
    workflow
        .nonfunctional_fields
        .get(&TaskField::TransitionLabel(transition_index).key(task_index))
        .and_then(Value::as_str)
}

/// Reports whether any string inside `value` contains both `{{` and `}}`.
///
/// This is a cheap structural scan, not a template parser: literal text that
/// happens to contain both delimiters is reported too.
pub fn detect_jinja_templates(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains("{{") && s.contains("}}"),
        Value::Array(items) => items.iter().any(detect_jinja_templates),
        Value::Object(map) => map.values().any(detect_jinja_templates),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}
