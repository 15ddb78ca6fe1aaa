//! Bundle loading, validation and reference resolution.
mod common;
use common::*;
use kouzu::bundle::{ObjectKind, Task};
use kouzu::prelude::*;
use serde_json::json;

#[test]
fn test_bundle_validation_accepts_fixtures() {
    assert_eq!(create_simple_bundle().validate(), Ok(()));
    assert_eq!(create_rich_bundle().validate(), Ok(()));
}

#[test]
fn test_bundle_validation_errors() {
    let mut bundle = create_simple_bundle();
    bundle.version = 3;
    assert_eq!(bundle.validate(), Err(BundleError::UnsupportedVersion(3)));

    let mut bundle = create_simple_bundle();
    bundle.exported_at = None;
    assert_eq!(bundle.validate(), Err(BundleError::MissingExportedAt));

    let mut bundle = create_simple_bundle();
    bundle.version = 1;
    assert_eq!(bundle.validate(), Err(BundleError::MissingReferences));

    let bundle = bundle_from(json!({ "version": 2, "exportedAt": "x", "objects": {} }));
    assert_eq!(bundle.validate(), Err(BundleError::NoObjects));

    let bundle = bundle_from(json!({
        "version": 2,
        "exportedAt": "x",
        "objects": { "w": { "type": "workflow", "fields": { "tasks": "nope" } } }
    }));
    assert_eq!(bundle.validate(), Err(BundleError::NoWorkflow));
}

#[test]
fn test_bundle_parse_error_is_reported() {
    let result = Bundle::from_json("{ not json");
    assert!(matches!(result, Err(BundleError::JsonParseError(_))));

    let result = Bundle::from_file("does/not/exist.json");
    assert!(matches!(result, Err(BundleError::Io { .. })));
}

#[test]
fn test_objects_keep_document_order() {
    let bundle = create_rich_bundle();
    let keys: Vec<&str> = bundle.objects.keys().map(String::as_str).collect();
    assert_eq!(keys[0], "workflow:main");
    assert_eq!(keys[1], "workflow:child");
    assert_eq!(keys[2], "action:http");
    assert_eq!(
        bundle.objects["trigger_type:webhook"].kind,
        ObjectKind::Other("trigger_type".to_string())
    );
}

#[test]
fn test_resolve_reference_by_substring() {
    let bundle = create_rich_bundle();
    let object = resolve_reference("act-http", &bundle).expect("action resolves");
    assert_eq!(object.hash.as_deref(), Some("h-http"));
    assert_eq!(object.display_name(), Some("HTTP Request"));

    let object = resolve_reference("act-slack", &bundle).expect("action resolves");
    assert_eq!(object.display_name(), Some("Slack Message"));
}

#[test]
fn test_resolve_reference_miss_returns_none() {
    let bundle = create_rich_bundle();
    assert!(resolve_reference("no-such-id", &bundle).is_none());
    assert!(resolve_reference("", &bundle).is_none());

    // No references map at all.
    let bundle = create_simple_bundle();
    assert!(resolve_reference("t1", &bundle).is_none());
}

#[test]
fn test_reference_to_missing_object_returns_none() {
    let bundle = bundle_from(json!({
        "version": 1,
        "exportedAt": "x",
        "objects": { "w": { "type": "workflow", "fields": { "tasks": [] } } },
        "references": { "r": { "src_key_hash": "gone", "locations": ["tasks[0].action:a1"] } }
    }));
    let index = ReferenceIndex::build(&bundle);
    assert!(resolve_reference("a1", &bundle).is_none());
    assert!(Resolver::new(&bundle, &index).resolve("a1").is_none());
}

#[test]
fn test_indexed_resolver_prefers_exact_segment() {
    // "act" is a substring of the first location, but an exact segment of the second.
    let bundle = bundle_from(json!({
        "version": 1,
        "exportedAt": "x",
        "objects": {
            "w": { "type": "workflow", "fields": { "tasks": [] } },
            "a1": { "type": "action", "hash": "h-long", "fields": { "name": "Long" } },
            "a2": { "type": "action", "hash": "h-short", "fields": { "name": "Short" } }
        },
        "references": {
            "r1": { "src_key_hash": "h-long", "locations": ["tasks[0].action:act-long"] },
            "r2": { "src_key_hash": "h-short", "locations": ["tasks[1].action:act"] }
        }
    }));
    let index = ReferenceIndex::build(&bundle);
    let resolver = Resolver::new(&bundle, &index);

    assert_eq!(resolve_reference("act", &bundle).and_then(|o| o.display_name()), Some("Long"));
    assert_eq!(resolver.resolve("act").and_then(|o| o.display_name()), Some("Short"));
    assert_eq!(resolver.resolve("act-long").and_then(|o| o.display_name()), Some("Long"));
}

#[test]
fn test_indexed_resolver_falls_back_to_substring() {
    let bundle = bundle_from(json!({
        "version": 1,
        "exportedAt": "x",
        "objects": {
            "w": { "type": "workflow", "fields": { "tasks": [] } },
            "a": { "type": "action", "content_hash": "h-a", "fields": { "name": "Embedded" } }
        },
        "references": {
            "r": { "src_key_hash": "h-a", "locations": ["tasks[0].action=prefix-a9-suffix"] }
        }
    }));
    let index = ReferenceIndex::build(&bundle);
    let resolver = Resolver::new(&bundle, &index);
    let object = resolver.resolve("a9").expect("substring fallback");
    assert_eq!(object.identity(), Some("h-a"));
}

#[test]
fn test_resolve_exact_skips_substring_matches() {
    let bundle = create_rich_bundle();
    let index = ReferenceIndex::build(&bundle);
    let resolver = Resolver::new(&bundle, &index);

    assert!(resolver.resolve("http").is_some());
    assert!(resolver.resolve_exact("http").is_none());
    let object = resolver.resolve_exact("act-http").expect("whole segment");
    assert_eq!(object.hash.as_deref(), Some("h-http"));
    assert!(resolver.resolve_exact("").is_none());
}

#[test]
fn test_resolve_first_tries_ids_in_order() {
    let bundle = create_rich_bundle();
    let index = ReferenceIndex::build(&bundle);
    let resolver = Resolver::new(&bundle, &index);

    let object = resolver.resolve_first(["missing", "act-slack", "act-http"]).expect("resolves");
    assert_eq!(object.hash.as_deref(), Some("h-slack"));
    assert!(resolver.resolve_first(["missing", "also-missing"]).is_none());
}

#[test]
fn test_resolution_is_idempotent() {
    let bundle = create_rich_bundle();
    let index = ReferenceIndex::build(&bundle);
    let resolver = Resolver::new(&bundle, &index);
    for id in ["act-http", "child-flow", "webhook-type", "nothing"] {
        assert_eq!(resolver.resolve(id), resolver.resolve(id));
        assert_eq!(resolve_reference(id, &bundle), resolve_reference(id, &bundle));
    }
}

#[test]
fn test_task_decoding_is_lenient() {
    let task = Task::from_value(
        0,
        &json!({ "id": "x", "action": "core.echo", "next": [{ "when": true, "do": "y" }] }),
    )
    .expect("task decodes");
    assert_eq!(task.action_ref(), Some("core.echo"));
    assert_eq!(task.action_id(), None);
    assert_eq!(task.next[0].when.as_deref(), Some("true"));
    assert_eq!(task.next[0].targets, vec!["y".to_string()]);

    // Wrong type for `next` keeps the task with its id and name.
    let task = Task::from_value(1, &json!({ "id": "z", "name": "Zed", "next": 5 })).expect("degraded task");
    assert_eq!(task.id, "z");
    assert_eq!(task.display_name(), "Zed");
    assert!(task.next.is_empty());

    assert!(Task::from_value(2, &json!({ "name": "no id" })).is_none());
}

#[test]
fn test_bundle_tolerates_null_and_missing_members() {
    let bundle = Bundle::from_json(
        r#"{
            "version": 1,
            "exportedAt": "2024-01-01T00:00:00Z",
            "objects": {
                "meta": { "fields": { "note": "no type" } },
                "workflow:main": {
                    "type": "workflow",
                    "hash": "h-main",
                    "nonfunctional_fields": null,
                    "fields": { "id": "main", "tasks": [{ "id": "only" }] }
                },
                "action:http": { "type": null, "hash": "h-http", "nonfunctional_fields": null }
            },
            "references": {
                "empty": { "src_key_hash": null, "locations": null },
                "r1": { "src_key_hash": "h-http", "locations": ["main.tasks[0].action:act-http"] }
            }
        }"#,
    )
    .expect("bundle loads");

    assert_eq!(bundle.validate(), Ok(()));
    assert_eq!(bundle.objects["meta"].kind, ObjectKind::Other(String::new()));
    assert_eq!(bundle.objects["action:http"].kind, ObjectKind::default());
    assert!(bundle.objects["workflow:main"].nonfunctional_fields.is_empty());
    assert_eq!(bundle.workflows().count(), 1);

    let references = bundle.references.as_ref().expect("references present");
    assert_eq!(references["empty"].src_key_hash, "");
    assert!(references["empty"].locations.is_empty());

    let index = ReferenceIndex::build(&bundle);
    let resolver = Resolver::new(&bundle, &index);
    assert_eq!(resolver.resolve("act-http").and_then(|o| o.identity()), Some("h-http"));
}
