//! # Kouzu - Workflow Bundle Graph and Layout Engine
//!
//! **Kouzu** turns a workflow automation bundle export into a directed graph of
//! visual nodes and edges and computes readable 2-D coordinates for it. Bundles
//! express their relationships through content-hash references rather than
//! direct pointers, so most of the work is resolving those references before
//! anything can be drawn.
//!
//! ## Core Workflow
//!
//! 1.  **Load**: Parse the export with [`Bundle::from_file`](bundle::Bundle::from_file)
//!     and optionally check it with [`Bundle::validate`](bundle::Bundle::validate).
//! 2.  **Index**: Build a [`ReferenceIndex`](resolver::ReferenceIndex) once per bundle.
//! 3.  **Build**: Use a [`GraphBuilder`](graph::GraphBuilder) to derive the nodes and
//!     edges of one workflow. Tasks without stored positions land on a grid.
//! 4.  **Lay out**: Run [`apply_layout`](layout::apply_layout) to rank, order and
//!     place the nodes.
//!
//! [`WorkflowSession`](session::WorkflowSession) bundles these steps with
//! sub-workflow navigation for interactive viewers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kouzu::prelude::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let bundle = Bundle::from_file("export.json")?;
//!     bundle.validate()?;
//!
//!     // Largest workflow first.
//!     let workflows = get_workflows(&bundle);
//!     let Some(selected) = workflows.first() else {
//!         return Ok(());
//!     };
//!
//!     let index = ReferenceIndex::build(&bundle);
//!     let graph = GraphBuilder::new(Resolver::new(&bundle, &index)).build(&selected.id);
//!
//!     let config = LayoutConfig::default()
//!         .with_direction(Direction::LeftRight)
//!         .with_compact(true);
//!     let nodes = apply_layout(&graph.nodes, &graph.edges, &config);
//!
//!     for node in &nodes {
//!         println!("{} at ({}, {})", node.label(), node.position.x, node.position.y);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod error;
pub mod graph;
pub mod introspect;
pub mod layout;
pub mod navigation;
pub mod prelude;
pub mod resolver;
pub mod session;
