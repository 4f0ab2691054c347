pub mod context;
pub mod conversation_state;
pub mod stages;
#[cfg(test)]
pub(crate) mod test_support;
pub mod workflow;

use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::collaborators::{Collaborators, VectorStore};
use crate::error::{ChatError, WorkflowError};
use conversation_state::ConversationState;
use workflow::{CompiledWorkflow, Workflow};

pub const STATUS_SEARCHING: &str = "searching";
pub const STATUS_GENERATING: &str = "generating";
pub const STATUS_DONE: &str = "done";

/// Content of the `error` event; the underlying cause is only logged.
pub const ERROR_GENERATION_FAILED: &str = "failed to generate a response";

/// One unit of a streamed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Event {
    Status(String),
    Response(String),
    /// Terminal: the turn failed and nothing more follows.
    Error(String),
}

pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

/// Runs the pipeline once per query and turns the result into an event stream.
pub struct StreamingOrchestrator {
    workflow: Arc<CompiledWorkflow>,
    history: Arc<dyn VectorStore>,
}

impl StreamingOrchestrator {
    /// Compiles the standard workflow; the collaborators' store doubles as the history store.
    pub fn new(collaborators: Collaborators) -> Result<Self, WorkflowError> {
        let history = collaborators.store.clone();
        let workflow = Workflow::standard().compile(collaborators)?;
        Ok(Self::with_workflow(workflow, history))
    }

    pub fn with_workflow(workflow: CompiledWorkflow, history: Arc<dyn VectorStore>) -> Self {
        Self {
            workflow: Arc::new(workflow),
            history,
        }
    }

    /// Validates the query, then returns a lazy stream: nothing runs until it is polled.
    ///
    /// The stream emits `searching`, runs the workflow, stores the turn, emits
    /// `generating`, every prefix of the answer, and finally `done`. A failed run
    /// emits a single `error` event after `searching` instead.
    /// Whitespace only counts for the emptiness check; the text itself is kept as given.
    pub fn respond(&self, query: &str) -> Result<EventStream, ChatError> {
        if query.trim().is_empty() {
            return Err(ChatError::EmptyQuery);
        }

        let query = query.to_string();
        let workflow = Arc::clone(&self.workflow);
        let history = Arc::clone(&self.history);

        Ok(Box::pin(stream! {
            yield Event::Status(STATUS_SEARCHING.to_string());

            match workflow.invoke(ConversationState::for_query(&query)).await {
                Ok(state) => {
                    if let Some(record) = state.conversation_history().last() {
                        if let Err(e) = history.add_documents(&[record.to_document()]).await {
                            error!("Failed to store conversation turn: {}", e);
                        }
                    }

                    yield Event::Status(STATUS_GENERATING.to_string());

                    let answer = state.final_answer().unwrap_or_default();
                    for prefix in prefixes(answer) {
                        yield Event::Response(prefix.to_string());
                    }

                    info!("Answered query with {} characters", answer.chars().count());
                    yield Event::Status(STATUS_DONE.to_string());
                }
                Err(e) => {
                    error!("Pipeline run failed: {}", e);
                    yield Event::Error(ERROR_GENERATION_FAILED.to_string());
                }
            }
        }))
    }
}

/// Every non-empty prefix of `text`, cut on character boundaries, shortest first.
pub fn prefixes(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .map(|(start, c)| start + c.len_utf8())
        .map(move |end| &text[..end])
}
