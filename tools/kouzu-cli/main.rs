use clap::{Parser, ValueEnum};
use kouzu::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeCli {
    Preserve,
    Auto,
    WhenUnpositioned,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionCli {
    Tb,
    Lr,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlignCli {
    Left,
    Center,
    Right,
}

/// Derives and lays out the graph of a workflow bundle export
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the bundle JSON file
    bundle_path: String,

    /// Workflow to build. Defaults to the workflow with the most tasks
    #[arg(short, long)]
    workflow: Option<String>,

    /// List the workflows in the bundle and exit
    #[arg(short, long)]
    list: bool,

    /// When to run the layout engine
    #[arg(long, value_enum, default_value = "when-unpositioned")]
    layout: ModeCli,

    /// Path to a layout config JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Rank direction, overrides the config file
    #[arg(long, value_enum)]
    direction: Option<DirectionCli>,

    /// Rank alignment, overrides the config file
    #[arg(long, value_enum)]
    align: Option<AlignCli>,

    /// Compact the layout
    #[arg(long)]
    compact: bool,

    /// Wrap ranks wider than this many units
    #[arg(long)]
    max_width: Option<f64>,

    /// Skip bundle validation
    #[arg(long)]
    no_validate: bool,

    /// Write the graph JSON here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Print a text summary instead of JSON
    #[arg(short, long)]
    summary: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. Loading ---
    let load_start = Instant::now();
    let bundle = Bundle::from_file(&cli.bundle_path).unwrap_or_else(|e| exit_with_error(&e.to_string()));
    if !cli.no_validate {
        bundle
            .validate()
            .unwrap_or_else(|e| exit_with_error(&format!("Invalid bundle: {}", e)));
    }
    let load_duration = load_start.elapsed();

    if cli.list {
        for workflow in get_workflows(&bundle) {
            println!("{:>5}  {:<40} {}", workflow.task_count, workflow.id, workflow.name);
        }
        return;
    }

    let config = build_config(&cli);
    let mode = match cli.layout {
        ModeCli::Preserve => LayoutMode::Preserve,
        ModeCli::Auto => LayoutMode::Auto,
        ModeCli::WhenUnpositioned => LayoutMode::WhenUnpositioned,
    };

    // --- 2. Graph derivation and layout ---
    let build_start = Instant::now();
    let mut session = WorkflowSession::new(bundle, config).with_mode(mode);
    if let Some(id) = &cli.workflow {
        session.select_workflow(id);
    }
    let build_duration = build_start.elapsed();

    let Some(selected) = session.selected_id().map(str::to_string) else {
        exit_with_error("Bundle does not contain any workflow.");
    };
    if session.graph().is_empty() {
        eprintln!("Workflow '{}' produced an empty graph.", selected);
    }

    // --- 3. Output ---
    let rendered = if cli.summary {
        visualize_graph(session.graph(), &selected)
    } else {
        serde_json::to_string_pretty(session.graph())
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize graph: {}", e)))
    };
    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e))),
        None => println!("{}", rendered),
    }

    let total_duration = total_start.elapsed();
    eprintln!("\n--- Performance Summary ---");
    eprintln!("Nodes / Edges:        {} / {}", session.graph().nodes.len(), session.graph().edges.len());
    eprintln!("Bundle Loading:       {:?}", load_duration);
    eprintln!("Graph and Layout:     {:?}", build_duration);
    eprintln!("-----------------------------");
    eprintln!("Total Execution:      {:?}", total_duration);
}

/// Loads the config file, if any, then applies command line overrides.
fn build_config(cli: &Cli) -> LayoutConfig {
    let mut config = match &cli.config {
        Some(path) => LayoutConfig::from_file(path).unwrap_or_else(|e| exit_with_error(&e.to_string())),
        None => LayoutConfig::default(),
    };
    if let Some(direction) = cli.direction {
        config = config.with_direction(match direction {
            DirectionCli::Tb => Direction::TopBottom,
            DirectionCli::Lr => Direction::LeftRight,
        });
    }
    if let Some(align) = cli.align {
        config = config.with_alignment(match align {
            AlignCli::Left => RankAlignment::Left,
            AlignCli::Center => RankAlignment::Center,
            AlignCli::Right => RankAlignment::Right,
        });
    }
    if cli.compact {
        config = config.with_compact(true);
    }
    if let Some(max_width) = cli.max_width {
        config = config.with_max_width(max_width);
    }
    config
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
