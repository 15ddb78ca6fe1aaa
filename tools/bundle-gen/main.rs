use clap::Parser;
use indexmap::IndexMap;
use kouzu::bundle::{Bundle, BundleObject, ObjectKind, Reference};
use rand::Rng;
use rand::rngs::ThreadRng;
use serde_json::{Value, json};
use std::fs;

/// A CLI tool to generate synthetic workflow bundles for the kouzu layout engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_bundle.json")]
    output: String,

    /// Number of workflows to generate
    #[arg(short, long, default_value_t = 3)]
    workflows: usize,

    /// The minimum number of tasks per workflow
    #[arg(long, default_value_t = 5)]
    min: usize,

    /// The maximum number of tasks per workflow
    #[arg(long, default_value_t = 40)]
    max: usize,

    /// Chance that a transition fans out to several targets
    #[arg(long, default_value_t = 0.2)]
    fan_out: f64,

    /// Number of triggers attached to each workflow
    #[arg(long, default_value_t = 1)]
    triggers: usize,

    /// Store grid positions in the task metadata side table
    #[arg(long)]
    positions: bool,
}

const ACTIONS: [&str; 5] = ["core.http", "core.echo", "core.noop", "slack.post", "jira.create"];
const CONDITIONS: [&str; 3] = ["{{ SUCCEEDED }}", "{{ FAILED }}", "{{ COMPLETED }}"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.min == 0 || cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) must be at least 1 and not greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }
    if !(0.0..=1.0).contains(&cli.fan_out) {
        eprintln!("Error: --fan-out must be between 0 and 1");
        std::process::exit(1);
    }

    println!(
        "Generating {} workflows with {} to {} tasks each...",
        cli.workflows, cli.min, cli.max
    );

    let mut objects = IndexMap::new();
    let mut references = IndexMap::new();

    for (i, name) in ACTIONS.iter().enumerate() {
        let hash = format!("action-hash-{}", i);
        objects.insert(format!("action:{}", name), object(ObjectKind::Action, &hash, json!({ "name": name })));
        references.insert(
            format!("ref-{}", i),
            Reference {
                src_key_hash: hash,
                locations: Vec::new(),
            },
        );
    }

    for w in 0..cli.workflows {
        let workflow_id = format!("wf-{}", w);
        let task_count = rng.random_range(cli.min..=cli.max);
        let (tasks, side_table) = generate_tasks(&mut rng, &workflow_id, task_count, &cli, &mut references);

        let mut workflow = object(
            ObjectKind::Workflow,
            &format!("workflow-hash-{}", w),
            json!({ "id": workflow_id, "name": format!("Workflow {}", w), "tasks": tasks }),
        );
        workflow.nonfunctional_fields = side_table;
        objects.insert(format!("workflow:{}", workflow_id), workflow);

        for t in 0..cli.triggers {
            let trigger_id = format!("{}-trigger-{}", workflow_id, t);
            objects.insert(
                format!("trigger:{}", trigger_id),
                object(
                    ObjectKind::Trigger,
                    &format!("trigger-hash-{}-{}", w, t),
                    json!({ "id": trigger_id, "name": format!("Trigger {}", t), "workflowId": workflow_id }),
                ),
            );
        }
        println!("-> Generated '{}' with {} tasks.", workflow_id, task_count);
    }

    let bundle = Bundle {
        version: 2,
        exported_at: Some("2026-01-01T00:00:00Z".to_string()),
        objects,
        references: Some(references),
    };

    let json_output = serde_json::to_string_pretty(&bundle)?;
    fs::write(&cli.output, json_output)?;

    println!("Successfully generated and saved bundle to '{}'", cli.output);
    Ok(())
}

fn object(kind: ObjectKind, hash: &str, fields: Value) -> BundleObject {
    BundleObject {
        kind,
        hash: Some(hash.to_string()),
        content_hash: None,
        fields,
        nonfunctional_fields: IndexMap::new(),
    }
}

/// Generates a task list whose transitions only point forward, plus the side
/// table entries for it. Action locations are appended to `references`.
fn generate_tasks(
    rng: &mut ThreadRng,
    workflow_id: &str,
    count: usize,
    cli: &Cli,
    references: &mut IndexMap<String, Reference>,
) -> (Vec<Value>, IndexMap<String, Value>) {
    let columns = (count as f64).sqrt().ceil() as usize;
    let mut tasks = Vec::with_capacity(count);
    let mut side_table = IndexMap::new();

    for i in 0..count {
        let task_id = format!("{}-task-{}", workflow_id, i);
        let action_index = rng.random_range(0..ACTIONS.len());
        if let Some((_, reference)) = references.get_index_mut(action_index) {
            reference.locations.push(format!("action/{}", task_id));
        }

        let mut next = Vec::new();
        if i + 1 < count {
            let transitions = rng.random_range(1..=2);
            for j in 0..transitions {
                let targets: Vec<String> = if rng.random_bool(cli.fan_out) {
                    let fan = rng.random_range(2..=3);
                    (0..fan)
                        .map(|_| format!("{}-task-{}", workflow_id, rng.random_range(i + 1..count)))
                        .collect()
                } else {
                    vec![format!("{}-task-{}", workflow_id, rng.random_range(i + 1..count))]
                };
                next.push(json!({ "when": CONDITIONS[j % CONDITIONS.len()], "do": targets }));
                if rng.random_bool(0.3) {
                    side_table.insert(format!("tasks[{}].next[{}].label", i, j), json!(format!("Branch {}", j)));
                }
            }
        }

        if cli.positions {
            side_table.insert(
                format!("tasks[{}].metadata", i),
                json!({ "x": 100.0 + (i % columns) as f64 * 350.0, "y": 100.0 + (i / columns) as f64 * 200.0 }),
            );
        }

        tasks.push(json!({
            "id": task_id,
            "name": format!("Task {}", i),
            "action": { "id": task_id, "ref": ACTIONS[action_index] },
            "input": { "message": format!("{{{{ ctx().step_{} }}}}", i) },
            "next": next,
        }));
    }
    (tasks, side_table)
}
