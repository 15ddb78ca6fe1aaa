//! A viewer session over one bundle.
//!
//! The session owns everything derived from the bundle and fully replaces the
//! current graph on every recompute. Mutating operations take `&mut self`, so
//! a recompute can never start while another one is running.

use crate::bundle::Bundle;
use crate::graph::{Graph, GraphBuilder, Position, PositionSource};
use crate::introspect::{find_workflow, get_workflows};
use crate::layout::{GridConfig, LayoutConfig, LayoutMode, apply_layout};
use crate::navigation::{HierarchyEntry, NavigationTracker, WorkflowRelationships};
use crate::resolver::{ReferenceIndex, Resolver};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct WorkflowSession {
    bundle: Bundle,
    index: ReferenceIndex,
    navigation: NavigationTracker,
    config: LayoutConfig,
    grid: GridConfig,
    mode: LayoutMode,
    graph: Graph,
}

impl WorkflowSession {
    /// Opens a session showing the workflow with the most tasks.
    pub fn new(bundle: Bundle, config: LayoutConfig) -> Self {
        let index = ReferenceIndex::build(&bundle);
        let navigation = NavigationTracker::new(WorkflowRelationships::build(&bundle));
        let mut session = Self {
            bundle,
            index,
            navigation,
            config,
            grid: GridConfig::default(),
            mode: LayoutMode::default(),
            graph: Graph::default(),
        };
        if let Some(first) = get_workflows(&session.bundle).into_iter().next() {
            info!(workflow = %first.id, tasks = first.task_count, "Opening largest workflow");
            session.navigation.reset_to(&first.id);
        }
        session.recompute();
        session
    }

    pub fn with_mode(mut self, mode: LayoutMode) -> Self {
        self.mode = mode;
        self.recompute();
        self
    }

    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self.recompute();
        self
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn hierarchy(&self) -> &[HierarchyEntry] {
        self.navigation.hierarchy()
    }

    pub fn relationships(&self) -> &WorkflowRelationships {
        self.navigation.relationships()
    }

    /// The id of the workflow currently shown.
    pub fn selected_id(&self) -> Option<&str> {
        self.navigation.current().map(|entry| entry.id.as_str())
    }

    /// Shows `id` as the root of a new navigation path.
    pub fn select_workflow(&mut self, id: &str) {
        let canonical = find_workflow(&self.bundle, id).map_or(id, |w| w.id()).to_string();
        self.navigation.reset_to(&canonical);
        self.recompute();
    }

    /// Drills into a sub-workflow, keeping the breadcrumb path when related.
    pub fn open_sub_workflow(&mut self, id: &str) {
        let canonical = find_workflow(&self.bundle, id).map_or(id, |w| w.id()).to_string();
        self.navigation.handle_sub_workflow_click(&canonical);
        self.recompute();
    }

    pub fn navigate_breadcrumb(&mut self, id: &str, index: usize) {
        self.navigation.handle_breadcrumb_navigate(id, index);
        self.recompute();
    }

    /// Runs the layout engine over the current graph regardless of mode.
    pub fn auto_layout(&mut self) {
        self.graph.nodes = apply_layout(&self.graph.nodes, &self.graph.edges, &self.config);
    }

    /// Rebuilds the current workflow from the bundle and lays it out,
    /// discarding any dragged positions.
    pub fn reset(&mut self) {
        self.graph = self.build();
        self.auto_layout();
    }

    /// Moves a node for the lifetime of the current graph only.
    ///
    /// Returns `false` if no node has that id.
    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        match self.graph.nodes.iter_mut().find(|node| node.id == id) {
            Some(node) => {
                node.position = position;
                node.position_source = PositionSource::Dragged;
                true
            }
            None => false,
        }
    }

    fn build(&self) -> Graph {
        let Some(selected) = self.selected_id() else {
            return Graph::default();
        };
        GraphBuilder::new(Resolver::new(&self.bundle, &self.index))
            .with_grid(self.grid.clone())
            .build(selected)
    }

    fn recompute(&mut self) {
        self.graph = self.build();
        let run_layout = match self.mode {
            LayoutMode::Preserve => false,
            LayoutMode::Auto => true,
            LayoutMode::WhenUnpositioned => !self.graph.has_stored_positions(),
        };
        debug!(mode = ?self.mode, run_layout, nodes = self.graph.nodes.len(), "Recomputed graph");
        if run_layout {
            self.auto_layout();
        }
    }
}
