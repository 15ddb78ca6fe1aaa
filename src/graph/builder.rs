use super::model::{
    Edge, EdgeData, EdgeStyle, FollowType, Graph, Node, NodeData, NodeKind, Position,
    PositionSource, ResolvedAction, TaskConfig, TaskNodeData, TransitionView, TriggerNodeData,
};
use crate::bundle::{BundleObject, Task, TaskAnnotations, WorkflowRef};
use crate::introspect::{detect_jinja_templates, detect_sub_workflow, find_workflow};
use crate::layout::grid::{GridConfig, grid_position, position_triggers};
use crate::resolver::Resolver;
use ahash::AHashSet;
use tracing::{debug, warn};

/// Name shown for a trigger that carries none and whose type does not resolve.
pub const UNKNOWN_TRIGGER: &str = "Unknown Trigger";

/// Field names a trigger may use to point at its trigger type.
const TRIGGER_TYPE_FIELDS: [&str; 3] = ["triggerTypeId", "trigger_type_id", "type"];

/// Derives the visual graph of one workflow from a bundle.
///
/// ```rust,no_run
/// use kouzu::prelude::*;
///
/// let bundle = Bundle::from_file("export.json").unwrap();
/// let index = ReferenceIndex::build(&bundle);
/// let graph = GraphBuilder::new(Resolver::new(&bundle, &index)).build("workflow-id");
/// println!("{} nodes", graph.nodes.len());
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder<'a> {
    resolver: Resolver<'a>,
    grid: GridConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self {
            resolver,
            grid: GridConfig::default(),
        }
    }

    /// Sets the placeholder grid used for tasks without a stored position.
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Builds nodes and edges for `selected_id`.
    ///
    /// Returns an empty graph when the workflow cannot be found or carries no
    /// task list. Missing references and odd task shapes degrade to defaults.
    pub fn build(&self, selected_id: &str) -> Graph {
        let bundle = self.resolver.bundle();
        let Some(workflow) = find_workflow(bundle, selected_id) else {
            debug!(selected_id, "Selected workflow not found");
            return Graph::default();
        };
        if !workflow.has_tasks() {
            warn!(workflow = workflow.id(), "Workflow has no task list");
            return Graph::default();
        }

        let tasks = workflow.tasks();
        let annotations = workflow.annotations();
        let mut graph = Graph::default();

        for (ordinal, (index, task)) in tasks.iter().enumerate() {
            let position = match annotations.position(*index) {
                Some((x, y)) => (Position::new(x, y), PositionSource::Stored),
                None => (grid_position(ordinal, tasks.len(), &self.grid), PositionSource::Grid),
            };
            graph.nodes.push(self.task_node(*index, task, &annotations, position));
        }

        let mut seen = AHashSet::new();
        for (index, task) in &tasks {
            for (transition_index, transition) in task.next.iter().enumerate() {
                let follow_type = if transition.is_follow_all() {
                    FollowType::All
                } else {
                    FollowType::First
                };
                let label = annotations
                    .transition_label(*index, transition_index)
                    .map(str::to_string)
                    .or_else(|| transition.label.clone());

                for target in &transition.targets {
                    let id = format!("{}-{}-{}", task.id, target, transition_index);
                    if !seen.insert(id.clone()) {
                        continue;
                    }
                    graph.edges.push(Edge {
                        id,
                        source: task.id.clone(),
                        target: target.clone(),
                        source_handle: Some(format!("transition-{}", transition_index)),
                        data: EdgeData {
                            condition: transition.when.clone(),
                            follow_type,
                            transition_index: Some(transition_index),
                            label: label.clone(),
                        },
                        style: EdgeStyle::for_follow_type(follow_type),
                    });
                }
            }
        }

        self.add_triggers(&mut graph, workflow, tasks.first().map(|(_, task)| task));

        debug!(
            workflow = workflow.id(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            stored = graph.has_stored_positions(),
            "Built workflow graph"
        );
        graph
    }

    fn task_node(
        &self,
        index: usize,
        task: &Task,
        annotations: &TaskAnnotations,
        (position, position_source): (Position, PositionSource),
    ) -> Node {
        // The task id itself only counts as a whole location segment.
        let resolved = task
            .action_id()
            .and_then(|action_id| self.resolver.resolve(action_id))
            .or_else(|| self.resolver.resolve_exact(&task.id));

        let name = task
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| resolved.and_then(BundleObject::display_name))
            .unwrap_or(&task.id)
            .to_string();
        let description = annotations
            .description(index)
            .or(task.description.as_deref())
            .map(str::to_string);

        let action = (task.action.is_some() || resolved.is_some()).then(|| ResolvedAction {
            reference: task.action_ref().map(str::to_string),
            name: resolved.and_then(BundleObject::display_name).map(str::to_string),
            object_type: resolved.map(|object| object.kind.to_string()),
            hash: resolved.and_then(BundleObject::identity).map(str::to_string),
        });

        let next = task
            .next
            .iter()
            .enumerate()
            .map(|(transition_index, transition)| TransitionView {
                when: transition.when.clone(),
                targets: transition.targets.clone(),
                label: annotations
                    .transition_label(index, transition_index)
                    .map(str::to_string)
                    .or_else(|| transition.label.clone()),
                publish: transition.publish.clone(),
                follow_type: if transition.is_follow_all() {
                    FollowType::All
                } else {
                    FollowType::First
                },
            })
            .collect();

        let has_templates = task.input.as_ref().is_some_and(detect_jinja_templates);

        Node {
            id: task.id.clone(),
            kind: NodeKind::Task,
            position,
            position_source,
            data: NodeData::Task(Box::new(TaskNodeData {
                name,
                description,
                task_index: index,
                action,
                input: task.input.clone(),
                output: task.output.clone(),
                next,
                has_templates,
                sub_workflow: detect_sub_workflow(task, resolved, self.resolver.bundle()),
                config: TaskConfig {
                    timeout: task.timeout.clone(),
                    transition_mode: task.transition_mode.clone(),
                    retry: task.retry.clone(),
                    is_mocked: task.is_mocked,
                    run_as_org_id: task.run_as_org_id.clone(),
                    security_schema: task.security_schema.clone(),
                    human_seconds_saved: task.human_seconds_saved,
                    publish_result_as: task.publish_result_as.clone(),
                },
                metadata: annotations.metadata(index).cloned(),
            })),
        }
    }

    fn add_triggers(&self, graph: &mut Graph, workflow: WorkflowRef<'_>, first_task: Option<&Task>) {
        let bundle = self.resolver.bundle();
        let mut seen = AHashSet::new();
        for (key, trigger) in bundle.triggers() {
            let Some(target) = trigger.field_str("workflowId") else {
                continue;
            };
            if !workflow.matches_id(target) {
                continue;
            }
            let id = trigger.field_str("id").unwrap_or(key).to_string();
            if !seen.insert(id.clone()) {
                continue;
            }

            let trigger_type = TRIGGER_TYPE_FIELDS
                .iter()
                .find_map(|field| trigger.field_str(field));
            let resolved_type = self
                .resolver
                .resolve_first(TRIGGER_TYPE_FIELDS.iter().filter_map(|field| trigger.field_str(field)));
            let name = trigger
                .display_name()
                .or_else(|| resolved_type.and_then(BundleObject::display_name))
                .unwrap_or(UNKNOWN_TRIGGER)
                .to_string();

            if let Some(first) = first_task {
                graph.edges.push(Edge {
                    id: format!("{}-{}-trigger", id, first.id),
                    source: id.clone(),
                    target: first.id.clone(),
                    source_handle: None,
                    data: EdgeData {
                        condition: None,
                        follow_type: FollowType::Trigger,
                        transition_index: None,
                        label: None,
                    },
                    style: EdgeStyle::for_follow_type(FollowType::Trigger),
                });
            }

            graph.nodes.push(Node {
                id,
                kind: NodeKind::Trigger,
                position: Position::default(),
                position_source: PositionSource::Trigger,
                data: NodeData::Trigger(TriggerNodeData {
                    name,
                    description: trigger.description().map(str::to_string),
                    trigger_type: resolved_type
                        .and_then(BundleObject::display_name)
                        .or(trigger_type)
                        .map(str::to_string),
                    workflow_id: target.to_string(),
                    fields: trigger.fields.clone(),
                }),
            });
        }

        position_triggers(&mut graph.nodes, self.grid.trigger_offset, self.grid.node_width);
    }
}
