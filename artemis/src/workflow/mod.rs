mod event;
mod persist_workflow;

pub use event::*;
pub use persist_workflow::*;
