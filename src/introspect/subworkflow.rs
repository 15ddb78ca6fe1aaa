use crate::bundle::{Bundle, BundleObject, Task};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

static WORKFLOW_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""workflowId"\s*:\s*"([^"]+)""#).expect("workflowId pattern is valid")
});

/// Which heuristic classified a task as invoking a sub-workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubWorkflowRule {
    /// The task's resolved object is itself a workflow.
    ResolvedWorkflow,
    /// The action ref string mentions "workflow".
    ActionRef,
    /// The task name mentions "workflow".
    TaskName,
    /// The task input carries a `"workflowId"` entry.
    InputWorkflowId,
    /// Another workflow points at this task's id from an action or transition.
    ReferencedElsewhere,
}

/// The outcome of sub-workflow detection for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubWorkflowDetection {
    pub is_sub_workflow_task: bool,
    pub sub_workflow_id: Option<String>,
    pub rule: Option<SubWorkflowRule>,
}

struct RuleInput<'a> {
    task: &'a Task,
    resolved: Option<&'a BundleObject>,
    bundle: &'a Bundle,
}

/// A rule either does not match, or matches with an optional workflow id.
type RuleFn = fn(&RuleInput<'_>) -> Option<Option<String>>;

const RULES: [(SubWorkflowRule, RuleFn); 5] = [
    (SubWorkflowRule::ResolvedWorkflow, resolved_is_workflow),
    (SubWorkflowRule::ActionRef, action_ref_mentions_workflow),
    (SubWorkflowRule::TaskName, name_mentions_workflow),
    (SubWorkflowRule::InputWorkflowId, input_names_workflow),
    (SubWorkflowRule::ReferencedElsewhere, referenced_by_other_workflow),
];

/// Classifies a task as a sub-workflow invocation.
///
/// The rules are evaluated in priority order. The first rule that matches
/// decides the classification; the id is the first one any matching rule
/// produces, so a name-based match can still pick up an id from the input.
/// This is a heuristic and can misclassify in both directions.
pub fn detect_sub_workflow(
    task: &Task,
    resolved: Option<&BundleObject>,
    bundle: &Bundle,
) -> SubWorkflowDetection {
    let input = RuleInput {
        task,
        resolved,
        bundle,
    };

    let mut detection = SubWorkflowDetection::default();
    for (rule, check) in RULES {
        // Later rules only matter while an id is still missing.
        if detection.is_sub_workflow_task && detection.sub_workflow_id.is_some() {
            break;
        }
        if let Some(id) = check(&input) {
            if !detection.is_sub_workflow_task {
                detection.is_sub_workflow_task = true;
                detection.rule = Some(rule);
            }
            if detection.sub_workflow_id.is_none() {
                detection.sub_workflow_id = id;
            }
        }
    }
    detection
}

fn mentions_workflow(text: &str) -> bool {
    text.to_lowercase().contains("workflow")
}

fn resolved_is_workflow(input: &RuleInput<'_>) -> Option<Option<String>> {
    input
        .resolved
        .filter(|object| object.is_workflow())
        .map(|_| Some(input.task.id.clone()))
}

fn action_ref_mentions_workflow(input: &RuleInput<'_>) -> Option<Option<String>> {
    input
        .task
        .action_ref()
        .filter(|reference| mentions_workflow(reference))
        .map(|_| None)
}

fn name_mentions_workflow(input: &RuleInput<'_>) -> Option<Option<String>> {
    input
        .task
        .name
        .as_deref()
        .filter(|name| mentions_workflow(name))
        .map(|_| None)
}

fn input_names_workflow(input: &RuleInput<'_>) -> Option<Option<String>> {
    let raw = input.task.input.as_ref()?;
    let serialized = serde_json::to_string(raw).ok()?;
    WORKFLOW_ID_PATTERN
        .captures(&serialized)
        .and_then(|captures| captures.get(1))
        .map(|id| Some(id.as_str().to_string()))
}

fn referenced_by_other_workflow(input: &RuleInput<'_>) -> Option<Option<String>> {
    let task_id = input.task.id.as_str();
    let found = input
        .bundle
        .workflows()
        .filter_map(|workflow| workflow.object.raw_tasks())
        // The workflow that owns this task is not "another" workflow.
        .filter(|tasks| !tasks.iter().any(|t| raw_task_id(t) == Some(task_id)))
        .flatten()
        .any(|raw| raw_action_id(raw) == Some(task_id) || raw_targets(raw).any(|t| t == task_id));
    found.then(|| Some(task_id.to_string()))
}

fn raw_task_id(raw: &Value) -> Option<&str> {
    raw.get("id").and_then(Value::as_str)
}

fn raw_action_id(raw: &Value) -> Option<&str> {
    raw.get("action")
        .and_then(|action| action.get("id"))
        .and_then(Value::as_str)
}

fn raw_targets(raw: &Value) -> impl Iterator<Item = &str> {
    raw.get("next")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|transition| transition.get("do"))
        .flat_map(|targets| match targets {
            Value::String(single) => vec![single.as_str()],
            Value::Array(many) => many.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        })
}
