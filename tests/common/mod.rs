//! Shared fixtures for the HTTP endpoint tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gemini_chat_server::chat::StreamingOrchestrator;
use gemini_chat_server::collaborators::{
    Collaborators, Generator, SearchResult, WebSearch,
};
use gemini_chat_server::error::CollaboratorError;
use gemini_chat_server::vector_store::InMemoryVectorStore;

/// Generator returning a fixed answer, counting calls.
pub struct FixedGenerator {
    pub answer: Option<&'static str>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Generator for FixedGenerator {
    async fn generate(
        &self,
        _system_instruction: &str,
        _user_content: &str,
    ) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .map(str::to_string)
            .ok_or(CollaboratorError::EmptyResponse("fixed generator"))
    }
}

/// Search stub returning one canned hit, counting calls.
#[derive(Default)]
pub struct CannedSearch {
    pub calls: AtomicUsize,
}

#[async_trait]
impl WebSearch for CannedSearch {
    async fn search(
        &self,
        _query: &str,
        _top_k: usize,
    ) -> Result<Vec<SearchResult>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SearchResult {
            title: "Example".to_string(),
            snippet: "example snippet".to_string(),
            url: "https://example.com".to_string(),
        }])
    }
}

pub struct Fixture {
    pub generator: Arc<FixedGenerator>,
    pub search: Arc<CannedSearch>,
    pub store: Arc<InMemoryVectorStore>,
    pub orchestrator: StreamingOrchestrator,
}

pub fn fixture(answer: Option<&'static str>) -> Fixture {
    let generator = Arc::new(FixedGenerator {
        answer,
        calls: AtomicUsize::new(0),
    });
    let search = Arc::new(CannedSearch::default());
    let store = Arc::new(InMemoryVectorStore::new());

    let orchestrator = StreamingOrchestrator::new(Collaborators::new(
        generator.clone(),
        search.clone(),
        store.clone(),
    ))
    .expect("standard workflow compiles");

    Fixture {
        generator,
        search,
        store,
        orchestrator,
    }
}
