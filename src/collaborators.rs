use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

/// One web search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Generative model that answers a single system + user exchange.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        system_instruction: &str,
        user_content: &str,
    ) -> Result<String, CollaboratorError>;
}

/// Live web search returning at most `top_k` hits, best first.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, top_k: usize)
        -> Result<Vec<SearchResult>, CollaboratorError>;
}

/// Text store queried by similarity; also receives each finished turn.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn similarity_search(&self, query: &str, k: usize)
        -> Result<Vec<String>, CollaboratorError>;

    async fn add_documents(&self, documents: &[String]) -> Result<(), CollaboratorError>;
}

/// Process-wide collaborator handles, built once at start-up and shared by every request.
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn Generator>,
    pub search: Arc<dyn WebSearch>,
    pub store: Arc<dyn VectorStore>,
}

impl Collaborators {
    pub fn new(
        generator: Arc<dyn Generator>,
        search: Arc<dyn WebSearch>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            generator,
            search,
            store,
        }
    }
}
