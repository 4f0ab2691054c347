use serde::{Deserialize, Serialize};

use crate::collaborators::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One completed turn, as persisted to the history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub query: String,
    pub response: String,
}

impl HistoryRecord {
    /// Text form handed to the vector store.
    pub fn to_document(&self) -> String {
        format!("Q: {}\nA: {}", self.query, self.response)
    }
}

/// Record threaded through the pipeline stages of a single turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    messages: Vec<Message>,
    web_search_results: Vec<SearchResult>,
    retrieved_context: Vec<String>,
    conversation_history: Vec<HistoryRecord>,
}

/// Partial output of a stage. Every field is appended to the matching state field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub web_search_results: Vec<SearchResult>,
    pub retrieved_context: Vec<String>,
    pub conversation_history: Vec<HistoryRecord>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a new turn, seeded with the user's query.
    pub fn for_query(query: &str) -> Self {
        Self {
            messages: vec![Message::user(query)],
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn web_search_results(&self) -> &[SearchResult] {
        &self.web_search_results
    }

    pub fn retrieved_context(&self) -> &[String] {
        &self.retrieved_context
    }

    pub fn conversation_history(&self) -> &[HistoryRecord] {
        &self.conversation_history
    }

    pub fn latest_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Content of the most recent assistant message, if generation has run.
    pub fn final_answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Merges a stage's output field-wise; nothing already present is removed or reordered.
    pub fn apply(mut self, update: StateUpdate) -> Self {
        self.messages.extend(update.messages);
        self.web_search_results.extend(update.web_search_results);
        self.retrieved_context.extend(update.retrieved_context);
        self.conversation_history.extend(update.conversation_history);
        self
    }
}
