//! Graph derivation from bundles.
mod common;
use ahash::AHashSet;
use common::*;
use kouzu::graph::{
    FOLLOW_ALL_COLOR, FOLLOW_FIRST_COLOR, NodeKind, TRIGGER_COLOR, UNKNOWN_TRIGGER,
};
use kouzu::introspect::SubWorkflowRule;
use kouzu::layout::GridConfig;
use kouzu::prelude::*;
use serde_json::json;

fn task_data<'g>(graph: &'g Graph, id: &str) -> &'g kouzu::graph::TaskNodeData {
    graph
        .node(id)
        .and_then(Node::task_data)
        .unwrap_or_else(|| panic!("task node {} exists", id))
}

#[test]
fn test_simple_workflow_uses_grid_fallback() {
    let bundle = create_simple_bundle();
    let graph = build_graph(&bundle, "simple");

    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
    assert_eq!(graph.nodes[0].position, Position::new(100.0, 100.0));
    assert_eq!(graph.nodes[1].position, Position::new(450.0, 100.0));
    assert!(graph.nodes.iter().all(|n| n.position_source == PositionSource::Grid));
    assert!(!graph.has_stored_positions());

    assert_eq!(graph.edges.len(), 1);
    let edge = &graph.edges[0];
    assert_eq!(edge.id, "t1-t2-0");
    assert_eq!(edge.source, "t1");
    assert_eq!(edge.target, "t2");
    assert_eq!(edge.data.follow_type, FollowType::First);
    assert_eq!(edge.data.condition.as_deref(), Some("{{SUCCEEDED}}"));
    assert_eq!(edge.style.stroke, FOLLOW_FIRST_COLOR);
}

#[test]
fn test_unknown_workflow_yields_empty_graph() {
    let bundle = create_rich_bundle();
    assert!(build_graph(&bundle, "nonexistent-id").is_empty());

    let bundle = bundle_from(json!({
        "version": 2,
        "exportedAt": "x",
        "objects": { "w": { "type": "workflow", "fields": { "id": "w", "tasks": { "not": "a list" } } } }
    }));
    assert_eq!(build_graph(&bundle, "w"), Graph::default());
}

#[test]
fn test_follow_all_edges_share_handle() {
    let bundle = create_rich_bundle();
    let graph = build_graph(&bundle, "main");

    let a = graph.edge("start-notify-0").expect("first branch");
    let b = graph.edge("start-child-0").expect("second branch");
    assert_eq!(a.source_handle, b.source_handle);
    assert_eq!(a.source_handle.as_deref(), Some("transition-0"));
    assert_ne!(a.target, b.target);
    for edge in [a, b] {
        assert_eq!(edge.data.follow_type, FollowType::All);
        assert_eq!(edge.data.transition_index, Some(0));
        assert_eq!(edge.style.stroke, FOLLOW_ALL_COLOR);
    }
}

#[test]
fn test_edge_ids_are_unique_per_transition() {
    let bundle = bundle_from(json!({
        "version": 2,
        "exportedAt": "x",
        "objects": {
            "w": {
                "type": "workflow",
                "fields": {
                    "id": "w",
                    "tasks": [
                        { "id": "x", "next": [{ "do": ["y", "y"] }, { "do": ["y"] }] },
                        { "id": "y" }
                    ]
                }
            }
        }
    }));
    let graph = build_graph(&bundle, "w");
    let ids: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["x-y-0", "x-y-1"]);
    // Two targets are listed, so the transition is follow-all even though they repeat.
    assert_eq!(graph.edges[0].data.follow_type, FollowType::All);
}

#[test]
fn test_rich_workflow_edges() {
    let bundle = create_rich_bundle();
    let graph = build_graph(&bundle, "main");

    let ids: AHashSet<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), graph.edges.len());
    for expected in [
        "start-notify-0",
        "start-child-0",
        "start-cleanup-1",
        "notify-done-0",
        "child-done-0",
        "cleanup-done-0",
        "cron-start-trigger",
        "trigger:hook-start-trigger",
    ] {
        assert!(ids.contains(expected), "missing edge {}", expected);
    }
    assert_eq!(graph.edges.len(), 8);

    let failure = graph.edge("start-cleanup-1").expect("failure branch");
    assert_eq!(failure.data.label.as_deref(), Some("On failure"));
    assert_eq!(failure.data.condition.as_deref(), Some("{{ FAILED }}"));
    let inline = graph.edge("cleanup-done-0").expect("cleanup branch");
    assert_eq!(inline.data.label.as_deref(), Some("inline"));
    assert_eq!(inline.data.condition, None);
}

#[test]
fn test_task_nodes_carry_resolved_data() {
    let bundle = create_rich_bundle();
    let graph = build_graph(&bundle, "main");

    let start = task_data(&graph, "start");
    assert_eq!(start.name, "Start");
    assert_eq!(start.description.as_deref(), Some("Kick off"));
    assert_eq!(start.task_index, 0);
    assert!(start.has_templates);
    assert_eq!(start.config.timeout, Some(json!(30)));
    let action = start.action.as_ref().expect("start has an action");
    assert_eq!(action.reference.as_deref(), Some("core.http"));
    assert_eq!(action.name.as_deref(), Some("HTTP Request"));
    assert_eq!(action.object_type.as_deref(), Some("action"));
    assert_eq!(start.next.len(), 2);
    assert_eq!(start.next[0].follow_type, FollowType::All);
    assert_eq!(start.next[1].label.as_deref(), Some("On failure"));

    // No task name: the resolved action names the node.
    let notify = task_data(&graph, "notify");
    assert_eq!(notify.name, "Slack Message");
    assert!(!notify.has_templates);

    // Nothing resolves: the id names the node.
    let done = task_data(&graph, "done");
    assert_eq!(done.name, "done");
    assert!(done.action.is_none());
}

#[test]
fn test_task_id_resolves_only_as_whole_segment() {
    let bundle = bundle_from(json!({
        "version": 2,
        "exportedAt": "2024-01-01T00:00:00Z",
        "objects": {
            "workflow:main": {
                "type": "workflow",
                "fields": { "id": "main", "tasks": [{ "id": "http" }, { "id": "report" }] }
            },
            "action:http": { "type": "action", "hash": "h-http", "fields": { "name": "HTTP Request" } },
            "action:report": { "type": "action", "hash": "h-report", "fields": { "name": "Report Builder" } }
        },
        "references": {
            "r1": { "src_key_hash": "h-http", "locations": ["main.tasks[0].action:act-http"] },
            "r2": { "src_key_hash": "h-report", "locations": ["main.tasks[1]:report"] }
        }
    }));
    let graph = build_graph(&bundle, "main");

    // `act-http` only contains the id, so nothing is attached.
    let http = task_data(&graph, "http");
    assert_eq!(http.name, "http");
    assert!(http.action.is_none());
    assert!(!http.sub_workflow.is_sub_workflow_task);

    let report = task_data(&graph, "report");
    assert_eq!(report.name, "Report Builder");
    assert_eq!(
        report.action.as_ref().and_then(|a| a.object_type.as_deref()),
        Some("action")
    );
}

#[test]
fn test_sub_workflow_task_detected() {
    let bundle = create_rich_bundle();
    let graph = build_graph(&bundle, "main");

    let child = task_data(&graph, "child");
    assert!(child.sub_workflow.is_sub_workflow_task);
    assert_eq!(child.sub_workflow.rule, Some(SubWorkflowRule::ResolvedWorkflow));
    assert_eq!(child.sub_workflow.sub_workflow_id.as_deref(), Some("child"));
    assert_eq!(
        child.action.as_ref().and_then(|a| a.object_type.as_deref()),
        Some("workflow")
    );

    assert!(!task_data(&graph, "cleanup").sub_workflow.is_sub_workflow_task);
}

#[test]
fn test_stored_positions_reconciled_with_grid() {
    let bundle = create_rich_bundle();
    let graph = build_graph(&bundle, "main");
    assert!(graph.has_stored_positions());

    let start = graph.node("start").expect("start node");
    assert_eq!(start.position, Position::new(10.0, 20.0));
    assert_eq!(start.position_source, PositionSource::Stored);

    // Five tasks lay out on a three-column grid.
    let done = graph.node("done").expect("done node");
    assert_eq!(done.position, Position::new(450.0, 300.0));
    assert_eq!(done.position_source, PositionSource::Grid);
}

#[test]
fn test_custom_grid() {
    let bundle = create_simple_bundle();
    let index = ReferenceIndex::build(&bundle);
    let grid = GridConfig {
        offset_x: 0.0,
        offset_y: 0.0,
        cell_width: 10.0,
        ..GridConfig::default()
    };
    let graph = GraphBuilder::new(Resolver::new(&bundle, &index))
        .with_grid(grid)
        .build("simple");
    assert_eq!(graph.nodes[1].position, Position::new(10.0, 0.0));
}

#[test]
fn test_triggers_attach_to_first_task() {
    let bundle = create_rich_bundle();
    let graph = build_graph(&bundle, "main");

    let triggers: Vec<&Node> = graph.nodes.iter().filter(|n| n.is_trigger()).collect();
    assert_eq!(triggers.len(), 2, "only triggers of this workflow");
    assert!(triggers.iter().all(|n| n.kind == NodeKind::Trigger));
    assert_eq!(triggers[0].label(), "Nightly");
    // Nameless trigger falls back to its resolved trigger type.
    assert_eq!(triggers[1].label(), "Webhook");

    let edge = graph.edge("cron-start-trigger").expect("trigger edge");
    assert_eq!(edge.source, "cron");
    assert_eq!(edge.target, "start");
    assert_eq!(edge.data.follow_type, FollowType::Trigger);
    assert_eq!(edge.style.stroke, TRIGGER_COLOR);
    assert!(edge.style.dashed);
    assert!(edge.source_handle.is_none());
}

#[test]
fn test_triggers_spread_above_workflow() {
    let bundle = create_rich_bundle();
    let graph = build_graph(&bundle, "main");

    let triggers: Vec<&Node> = graph.nodes.iter().filter(|n| n.is_trigger()).collect();
    let min_task_y = graph
        .nodes
        .iter()
        .filter(|n| !n.is_trigger())
        .map(|n| n.position.y)
        .fold(f64::INFINITY, f64::min);
    for trigger in &triggers {
        assert_eq!(trigger.position.y, min_task_y - 150.0);
        assert_eq!(trigger.position_source, PositionSource::Trigger);
    }
    assert!(triggers[1].position.x - triggers[0].position.x >= 300.0);
}

#[test]
fn test_unknown_trigger_name() {
    let bundle = bundle_from(json!({
        "version": 2,
        "exportedAt": "x",
        "objects": {
            "w": { "type": "workflow", "fields": { "id": "w", "tasks": [{ "id": "only" }] } },
            "tr": { "type": "trigger", "fields": { "workflowId": "w" } }
        }
    }));
    let graph = build_graph(&bundle, "w");
    let trigger = graph.node("tr").expect("trigger keyed by object key");
    assert_eq!(trigger.label(), UNKNOWN_TRIGGER);
    assert!(graph.edge("tr-only-trigger").is_some());
}

#[test]
fn test_graph_serializes_wire_names() {
    let bundle = create_simple_bundle();
    let graph = build_graph(&bundle, "simple");
    let value = serde_json::to_value(&graph).expect("graph serializes");

    let node = &value["nodes"][0];
    assert_eq!(node["type"], "task");
    assert_eq!(node["position"], json!({ "x": 100.0, "y": 100.0 }));
    assert_eq!(node["data"]["name"], "t1");
    assert_eq!(node["data"]["isSubWorkflowTask"], false);

    let edge = &value["edges"][0];
    assert_eq!(edge["sourceHandle"], "transition-0");
    assert_eq!(edge["data"]["followType"], "first");
    assert_eq!(edge["data"]["condition"], "{{SUCCEEDED}}");
}

#[test]
fn test_builds_are_deterministic() {
    let bundle = create_rich_bundle();
    let first = build_graph(&bundle, "main");
    for _ in 0..5 {
        assert_eq!(build_graph(&bundle, "main"), first);
    }
}

#[test]
fn test_visualize_graph_summary() {
    let bundle = create_rich_bundle();
    let graph = build_graph(&bundle, "main");
    let summary = visualize_graph(&graph, "main");

    assert!(summary.contains("WORKFLOW GRAPH: main"));
    assert!(summary.contains("NODES (7)"));
    assert!(summary.contains("EDGES (8)"));
    assert!(summary.contains("start-cleanup-1"));
    assert!(summary.contains("sub-workflow=child"));
}
