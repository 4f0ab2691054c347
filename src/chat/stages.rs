use tracing::{debug, warn};

use super::context::{build_user_content, SYSTEM_INSTRUCTION};
use super::conversation_state::{ConversationState, HistoryRecord, Message, StateUpdate};
use crate::collaborators::Collaborators;
use crate::error::PipelineError;

pub const SEARCH_TOP_K: usize = 3;
pub const RETRIEVAL_TOP_K: usize = 3;

fn latest_query(state: &ConversationState) -> Result<&str, PipelineError> {
    state
        .latest_user_message()
        .map(|m| m.content.as_str())
        .ok_or(PipelineError::MissingUserMessage)
}

/// Runs the web search for the latest user message. A failed search degrades to no results.
pub async fn query_processing(
    state: &ConversationState,
    collaborators: &Collaborators,
) -> Result<StateUpdate, PipelineError> {
    let query = latest_query(state)?;

    let web_search_results = match collaborators.search.search(query, SEARCH_TOP_K).await {
        Ok(results) => results,
        Err(e) => {
            warn!("Web search failed, continuing without results: {}", e);
            Vec::new()
        }
    };
    debug!("Query processing produced {} search results", web_search_results.len());

    Ok(StateUpdate {
        web_search_results,
        ..StateUpdate::default()
    })
}

/// Recalls related earlier turns from the history store. A failed lookup degrades to no context.
pub async fn context_retrieval(
    state: &ConversationState,
    collaborators: &Collaborators,
) -> Result<StateUpdate, PipelineError> {
    let query = latest_query(state)?;

    let retrieved_context = match collaborators
        .store
        .similarity_search(query, RETRIEVAL_TOP_K)
        .await
    {
        Ok(snippets) => snippets,
        Err(e) => {
            warn!("History retrieval failed, continuing without context: {}", e);
            Vec::new()
        }
    };
    debug!("Context retrieval produced {} snippets", retrieved_context.len());

    Ok(StateUpdate {
        retrieved_context,
        ..StateUpdate::default()
    })
}

/// Asks the model for the answer. The only stage that appends to `messages`.
pub async fn response_generation(
    state: &ConversationState,
    collaborators: &Collaborators,
) -> Result<StateUpdate, PipelineError> {
    let query = latest_query(state)?;
    let user_content = build_user_content(
        state.web_search_results(),
        state.retrieved_context(),
        query,
    );

    let response = collaborators
        .generator
        .generate(SYSTEM_INSTRUCTION, &user_content)
        .await
        .map_err(PipelineError::Generation)?;

    Ok(StateUpdate {
        messages: vec![Message::assistant(response.clone())],
        conversation_history: vec![HistoryRecord {
            query: query.to_string(),
            response,
        }],
        ..StateUpdate::default()
    })
}
