use thiserror::Error;

use crate::chat::workflow::Stage;

/// Failure reported by one of the external collaborators (model, search, vector store).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned no usable content")]
    EmptyResponse(&'static str),

    #[error("history store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history store entry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CollaboratorError {
    /// Wraps a transport error with its request URL stripped; URLs may carry credentials.
    pub fn http(service: &'static str, source: reqwest::Error) -> Self {
        CollaboratorError::Http {
            service,
            source: source.without_url(),
        }
    }
}

/// Failure that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no user message to answer")]
    MissingUserMessage,

    #[error("response generation failed: {0}")]
    Generation(#[source] CollaboratorError),
}

/// Rejected workflow topology.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("workflow has no stages")]
    Empty,

    #[error("stage {0:?} appears more than once")]
    DuplicateStage(Stage),
}

/// Errors surfaced to callers of the orchestrator before any stream is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("query must not be empty")]
    EmptyQuery,
}
