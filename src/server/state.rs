//! Server application state shared across handlers

use std::sync::Arc;

use crate::pipeline::InstructionPipeline;

/// Shared state for the server. The pipeline owns every downstream
/// component (workspace store, registry, agent), so handlers only ever
/// talk to it.
#[derive(Clone)]
pub struct ServerAppState {
    pub pipeline: Arc<InstructionPipeline>,
}

impl ServerAppState {
    pub fn new(pipeline: Arc<InstructionPipeline>) -> Self {
        Self { pipeline }
    }
}
