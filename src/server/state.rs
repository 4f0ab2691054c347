use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::chat::StreamingOrchestrator;

pub type SharedOrchestrator = Arc<StreamingOrchestrator>;

#[derive(Clone)]
pub struct ServerState {
    pub orchestrator: SharedOrchestrator,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(orchestrator: StreamingOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
        }
    }
}

impl FromRef<ServerState> for SharedOrchestrator {
    fn from_ref(input: &ServerState) -> Self {
        input.orchestrator.clone()
    }
}
