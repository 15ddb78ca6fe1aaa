use super::model::{Graph, Node, NodeData};
use std::fmt::Write;

/// Formats a graph into a human-readable summary for debugging.
pub fn visualize_graph(graph: &Graph, name: &str) -> String {
    let mut output = String::new();
    writeln!(&mut output, "======== WORKFLOW GRAPH: {} ========", name).unwrap();

    writeln!(&mut output, "\n--- NODES ({}) ---", graph.nodes.len()).unwrap();
    for node in &graph.nodes {
        format_node(&mut output, node);
    }

    writeln!(&mut output, "\n--- EDGES ({}) ---", graph.edges.len()).unwrap();
    for edge in &graph.edges {
        let follow = format!("{:?}", edge.data.follow_type).to_lowercase();
        write!(
            &mut output,
            "{:<40} {} -> {} [{}]",
            edge.id, edge.source, edge.target, follow
        )
        .unwrap();
        if let Some(condition) = &edge.data.condition {
            write!(&mut output, " when {}", condition).unwrap();
        }
        if let Some(label) = &edge.data.label {
            write!(&mut output, " \"{}\"", label).unwrap();
        }
        writeln!(&mut output).unwrap();
    }

    writeln!(&mut output, "\n================ END OF GRAPH ================").unwrap();
    output
}

fn format_node(output: &mut String, node: &Node) {
    let position = format!("({:.0}, {:.0})", node.position.x, node.position.y);
    write!(
        output,
        "{:<24} {:<30} {:>16} {:?}",
        node.id,
        node.label(),
        position,
        node.position_source
    )
    .unwrap();
    match &node.data {
        NodeData::Task(task) => {
            if task.sub_workflow.is_sub_workflow_task {
                let target = task.sub_workflow.sub_workflow_id.as_deref().unwrap_or("?");
                write!(output, " sub-workflow={}", target).unwrap();
            }
            if task.has_templates {
                write!(output, " templated").unwrap();
            }
        }
        NodeData::Trigger(trigger) => {
            write!(output, " trigger").unwrap();
            if let Some(kind) = &trigger.trigger_type {
                write!(output, "={}", kind).unwrap();
            }
        }
    }
    writeln!(output).unwrap();
}
