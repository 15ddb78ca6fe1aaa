//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the kouzu crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kouzu::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let bundle = Bundle::from_file("path/to/export.json")?;
//! let mut session = WorkflowSession::new(bundle, LayoutConfig::default());
//! session.auto_layout();
//! println!("{}", visualize_graph(session.graph(), "current"));
//! # Ok(())
//! # }
//! ```

// Bundle model
pub use crate::bundle::{Bundle, BundleObject, ObjectKind, Reference, Task, Transition, WorkflowRef};

// Resolution and introspection
pub use crate::introspect::{
    SubWorkflowDetection, WorkflowSummary, detect_jinja_templates, detect_sub_workflow,
    find_workflow, get_workflows,
};
pub use crate::resolver::{ReferenceIndex, Resolver, resolve_reference};

// Graph derivation
pub use crate::graph::{
    Edge, FollowType, Graph, GraphBuilder, Node, NodeData, Position, PositionSource, build_graph,
    visualize_graph,
};

// Layout
pub use crate::layout::{
    Direction, GridConfig, LayoutConfig, LayoutMode, RankAlignment, apply_layout,
};

// Navigation and sessions
pub use crate::navigation::{HierarchyEntry, NavigationTracker, WorkflowRelationships};
pub use crate::session::WorkflowSession;

// Error types
pub use crate::error::{BundleError, ConfigError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
