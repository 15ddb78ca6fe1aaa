use crate::introspect::SubWorkflowDetection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FOLLOW_ALL_COLOR: &str = "#22c55e";
pub const FOLLOW_FIRST_COLOR: &str = "#3b82f6";
pub const TRIGGER_COLOR: &str = "#f97316";

/// A canvas coordinate (top-left corner of a node card).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Task,
    Trigger,
}

/// Where a node's current position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionSource {
    /// Read from the bundle's task metadata.
    Stored,
    /// Placeholder grid cell.
    Grid,
    /// Computed by the layout engine.
    Layout,
    /// Spread above the workflow.
    Trigger,
    /// Moved by the user. Never written back to the bundle.
    Dragged,
}

/// A visual node. Identity is the task or trigger id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub position_source: PositionSource,
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeData {
    Task(Box<TaskNodeData>),
    Trigger(TriggerNodeData),
}

/// Denormalized presentation payload of a task node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNodeData {
    pub name: String,
    pub description: Option<String>,
    pub task_index: usize,
    pub action: Option<ResolvedAction>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub next: Vec<TransitionView>,
    pub has_templates: bool,
    #[serde(flatten)]
    pub sub_workflow: SubWorkflowDetection,
    #[serde(flatten)]
    pub config: TaskConfig,
    pub metadata: Option<Value>,
}

/// The resolved action badge of a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAction {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub name: Option<String>,
    pub object_type: Option<String>,
    pub hash: Option<String>,
}

/// Scalar task configuration carried through for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub timeout: Option<Value>,
    pub transition_mode: Option<String>,
    pub retry: Option<Value>,
    pub is_mocked: Option<bool>,
    pub run_as_org_id: Option<String>,
    pub security_schema: Option<Value>,
    pub human_seconds_saved: Option<f64>,
    pub publish_result_as: Option<String>,
}

/// A task transition with its label resolved from the side table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionView {
    pub when: Option<String>,
    #[serde(rename = "do")]
    pub targets: Vec<String>,
    pub label: Option<String>,
    pub publish: Option<Value>,
    pub follow_type: FollowType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerNodeData {
    pub name: String,
    pub description: Option<String>,
    pub trigger_type: Option<String>,
    pub workflow_id: String,
    pub fields: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowType {
    /// Multi-target transition: every branch is taken.
    All,
    /// Single-target transition.
    First,
    /// Trigger to first task.
    Trigger,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    pub data: EdgeData,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub condition: Option<String>,
    pub follow_type: FollowType,
    pub transition_index: Option<usize>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub dashed: bool,
}

impl EdgeStyle {
    pub fn for_follow_type(follow_type: FollowType) -> Self {
        match follow_type {
            FollowType::All => Self {
                stroke: FOLLOW_ALL_COLOR,
                stroke_width: 2.0,
                dashed: false,
            },
            FollowType::First => Self {
                stroke: FOLLOW_FIRST_COLOR,
                stroke_width: 2.0,
                dashed: false,
            },
            FollowType::Trigger => Self {
                stroke: TRIGGER_COLOR,
                stroke_width: 2.0,
                dashed: true,
            },
        }
    }
}

/// The derived graph for one workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Node {
    /// The display name used for labels and ordering tie-breaks.
    pub fn label(&self) -> &str {
        match &self.data {
            NodeData::Task(task) => &task.name,
            NodeData::Trigger(trigger) => &trigger.name,
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.kind == NodeKind::Trigger
    }

    pub fn task_data(&self) -> Option<&TaskNodeData> {
        match &self.data {
            NodeData::Task(task) => Some(task),
            NodeData::Trigger(_) => None,
        }
    }
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Whether any node was placed from stored bundle metadata.
    pub fn has_stored_positions(&self) -> bool {
        self.nodes
            .iter()
            .any(|node| node.position_source == PositionSource::Stored)
    }
}
