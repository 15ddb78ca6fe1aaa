pub mod annotations;
pub mod model;
pub mod task;
pub mod workflow;

pub use annotations::*;
pub use model::*;
pub use task::*;
pub use workflow::*;
