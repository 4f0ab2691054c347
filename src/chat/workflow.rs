use std::collections::HashSet;

use tracing::debug;

use super::conversation_state::{ConversationState, StateUpdate};
use super::stages;
use crate::collaborators::Collaborators;
use crate::error::{PipelineError, WorkflowError};

/// A pipeline step, bound to exactly one collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    QueryProcessing,
    ContextRetrieval,
    ResponseGeneration,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::QueryProcessing => "query_processing",
            Stage::ContextRetrieval => "context_retrieval",
            Stage::ResponseGeneration => "response_generation",
        }
    }

    pub async fn run(
        &self,
        state: &ConversationState,
        collaborators: &Collaborators,
    ) -> Result<StateUpdate, PipelineError> {
        match self {
            Stage::QueryProcessing => stages::query_processing(state, collaborators).await,
            Stage::ContextRetrieval => stages::context_retrieval(state, collaborators).await,
            Stage::ResponseGeneration => stages::response_generation(state, collaborators).await,
        }
    }
}

/// Linear sequence of stages, built up before compilation.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    stages: Vec<Stage>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search, then retrieval, then generation.
    pub fn standard() -> Self {
        Self::new()
            .then(Stage::QueryProcessing)
            .then(Stage::ContextRetrieval)
            .then(Stage::ResponseGeneration)
    }

    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Checks the topology and binds the stages to their collaborators.
    pub fn compile(self, collaborators: Collaborators) -> Result<CompiledWorkflow, WorkflowError> {
        if self.stages.is_empty() {
            return Err(WorkflowError::Empty);
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(*stage) {
                return Err(WorkflowError::DuplicateStage(*stage));
            }
        }

        Ok(CompiledWorkflow {
            stages: self.stages,
            collaborators,
        })
    }
}

/// Runnable form of a [`Workflow`].
pub struct CompiledWorkflow {
    stages: Vec<Stage>,
    collaborators: Collaborators,
}

impl CompiledWorkflow {
    /// Runs every stage once, in order. The first failing stage aborts the run.
    pub async fn invoke(
        &self,
        initial: ConversationState,
    ) -> Result<ConversationState, PipelineError> {
        let mut state = initial;
        for stage in &self.stages {
            debug!("Running stage {}", stage.name());
            let update = stage.run(&state, &self.collaborators).await?;
            state = state.apply(update);
        }
        Ok(state)
    }
}
