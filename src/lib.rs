pub mod chat;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod gemini_client;
pub mod search_client;
pub mod server;
pub mod vector_store;

use std::sync::Arc;

use eyre::{Result, WrapErr};
use tracing::{info, warn};

use crate::collaborators::{Collaborators, VectorStore};
use crate::config::AppConfig;
use crate::gemini_client::GeminiClient;
use crate::search_client::SearchClient;
use crate::vector_store::InMemoryVectorStore;

/// Builds the process-wide collaborators described by `config`.
pub fn build_collaborators(config: &AppConfig) -> Result<Collaborators> {
    let generator = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
    );

    let search = SearchClient::new(config.tavily_api_key.clone(), config.tavily_base_url.clone());
    if !search.is_enabled() {
        warn!("TAVILY_API_KEY not set, answers will not include web search results");
    }

    let store: Arc<dyn VectorStore> = match &config.history_path {
        Some(path) => Arc::new(
            InMemoryVectorStore::open(path)
                .wrap_err_with(|| format!("Failed to open history file {}", path.display()))?,
        ),
        None => {
            info!("Keeping conversation history in memory only");
            Arc::new(InMemoryVectorStore::new())
        }
    };

    Ok(Collaborators::new(Arc::new(generator), Arc::new(search), store))
}
