//! The node/edge graph derived from one workflow.

pub mod builder;
pub mod model;
pub mod visualizer;

pub use builder::{GraphBuilder, UNKNOWN_TRIGGER};
pub use model::*;
pub use visualizer::visualize_graph;

use crate::bundle::Bundle;
use crate::resolver::{ReferenceIndex, Resolver};

/// Builds the graph of `selected_id` with default grid settings.
///
/// Builds a fresh [`ReferenceIndex`] on every call. Callers building several
/// graphs from one bundle should keep an index and use [`GraphBuilder`].
pub fn build_graph(bundle: &Bundle, selected_id: &str) -> Graph {
    let index = ReferenceIndex::build(bundle);
    GraphBuilder::new(Resolver::new(bundle, &index)).build(selected_id)
}
