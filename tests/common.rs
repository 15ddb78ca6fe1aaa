//! Common test fixtures: small bundles built with `json!`.
use kouzu::prelude::*;
use serde_json::{Value, json};

/// Parses a fixture value into a `Bundle`.
#[allow(dead_code)]
pub fn bundle_from(value: Value) -> Bundle {
    serde_json::from_value(value).expect("fixture is a valid bundle")
}

/// One workflow `simple` with `t1 -> t2` and no side table.
#[allow(dead_code)]
pub fn create_simple_bundle() -> Bundle {
    bundle_from(json!({
        "version": 2,
        "exportedAt": "2024-05-01T12:00:00Z",
        "objects": {
            "workflow:simple": {
                "type": "workflow",
                "hash": "h-simple",
                "fields": {
                    "id": "simple",
                    "name": "Simple",
                    "tasks": [
                        { "id": "t1", "next": [{ "when": "{{SUCCEEDED}}", "do": ["t2"] }] },
                        { "id": "t2" }
                    ]
                }
            }
        }
    }))
}

/// A version 1 bundle exercising references, the side table, triggers and a
/// sub-workflow.
///
/// `main`: start -> {notify, child} on success, start -> cleanup on failure,
/// and notify, child, cleanup -> done. Task 0 has a stored position.
#[allow(dead_code)]
pub fn create_rich_bundle() -> Bundle {
    bundle_from(json!({
        "version": 1,
        "exportedAt": "2024-05-01T12:00:00Z",
        "objects": {
            "workflow:main": {
                "type": "workflow",
                "hash": "h-main",
                "fields": {
                    "id": "main",
                    "name": "Main Flow",
                    "tasks": [
                        {
                            "id": "start",
                            "name": "Start",
                            "action": { "id": "act-http", "ref": "core.http" },
                            "input": { "url": "{{ ctx().url }}" },
                            "timeout": 30,
                            "next": [
                                { "when": "{{ SUCCEEDED }}", "do": ["notify", "child"] },
                                { "when": "{{ FAILED }}", "do": "cleanup" }
                            ]
                        },
                        {
                            "id": "notify",
                            "action": { "id": "act-slack", "ref": "slack.post" },
                            "input": { "text": "plain" },
                            "next": [{ "do": ["done"] }]
                        },
                        {
                            "id": "child",
                            "name": "Run child",
                            "action": { "id": "child-flow", "ref": "sub.run" },
                            "input": { "workflowId": "child-flow" },
                            "next": [{ "do": ["done"] }]
                        },
                        { "id": "cleanup", "next": [{ "do": ["done"], "label": "inline" }] },
                        { "id": "done" }
                    ]
                },
                "nonfunctional_fields": {
                    "tasks[0].metadata": { "x": 10.0, "y": 20.0 },
                    "tasks[0].description": "Kick off",
                    "tasks[0].next[1].label": "On failure"
                }
            },
            "workflow:child": {
                "type": "workflow",
                "hash": "h-child",
                "fields": { "id": "child-flow", "name": "Child Flow", "tasks": [{ "id": "c1" }] }
            },
            "action:http": {
                "type": "action",
                "hash": "h-http",
                "fields": { "name": "HTTP Request" }
            },
            "action:slack": {
                "type": "action",
                "hash": "h-slack",
                "fields": {},
                "nonfunctional_fields": { "name": "Slack Message" }
            },
            "trigger:cron": {
                "type": "trigger",
                "hash": "h-cron",
                "fields": { "id": "cron", "name": "Nightly", "workflowId": "main" }
            },
            "trigger:hook": {
                "type": "trigger",
                "hash": "h-hook",
                "fields": { "workflowId": "main", "triggerTypeId": "webhook-type" }
            },
            "trigger:other": {
                "type": "trigger",
                "hash": "h-other",
                "fields": { "id": "other", "workflowId": "child-flow" }
            },
            "trigger_type:webhook": {
                "type": "trigger_type",
                "hash": "h-webhook",
                "fields": { "name": "Webhook" }
            }
        },
        "references": {
            "r1": { "src_key_hash": "h-http", "locations": ["main.tasks[0].action:act-http"] },
            "r2": { "src_key_hash": "h-slack", "locations": ["main.tasks[1].action:act-slack"] },
            "r3": { "src_key_hash": "h-child", "locations": ["main.tasks[2].action:child-flow"] },
            "r4": { "src_key_hash": "h-webhook", "locations": ["triggers/webhook-type"] }
        }
    }))
}

/// Workflows linked through transition targets:
/// `root -> mid -> leaf`, `root -> side`, and an unrelated `lonely`.
#[allow(dead_code)]
pub fn create_nested_bundle() -> Bundle {
    let workflow = |id: &str, name: &str, targets: &[&str]| {
        json!({
            "type": "workflow",
            "fields": {
                "id": id,
                "name": name,
                "tasks": [{ "id": format!("{}-task", id), "next": [{ "do": targets }] }]
            }
        })
    };
    bundle_from(json!({
        "version": 2,
        "exportedAt": "2024-05-01T12:00:00Z",
        "objects": {
            "wf:root": workflow("root", "Root", &["mid", "side"]),
            "wf:mid": workflow("mid", "Middle", &["leaf"]),
            "wf:leaf": workflow("leaf", "Leaf", &[]),
            "wf:side": workflow("side", "Side", &[]),
            "wf:lonely": workflow("lonely", "Lonely", &[])
        }
    }))
}

/// Layout input: a workflow graph with a fan-out, a diamond and a cycle.
///
/// a -> {b, c, d}, b -> e, c -> e, d -> f, e -> f, f -> b (cycle back).
#[allow(dead_code)]
pub fn create_layout_bundle() -> Bundle {
    bundle_from(json!({
        "version": 2,
        "exportedAt": "2024-05-01T12:00:00Z",
        "objects": {
            "workflow:shape": {
                "type": "workflow",
                "fields": {
                    "id": "shape",
                    "tasks": [
                        { "id": "a", "name": "Authorize", "next": [{ "do": ["b", "c", "d"] }] },
                        { "id": "b", "name": "Authorized", "next": [{ "when": "{{ SUCCEEDED }}", "do": ["e"] }] },
                        { "id": "c", "name": "Unauthorized", "next": [{ "do": ["e"] }] },
                        { "id": "d", "name": "Audit", "next": [{ "do": ["f"] }] },
                        { "id": "e", "name": "Merge", "next": [{ "do": ["f"] }] },
                        { "id": "f", "name": "Finish", "next": [{ "when": "{{ FAILED }}", "do": ["b"] }] }
                    ]
                }
            },
            "trigger:t": {
                "type": "trigger",
                "fields": { "id": "t", "name": "Manual", "workflowId": "shape" }
            }
        }
    }))
}
