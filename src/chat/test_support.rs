//! Stub collaborators with call recording, shared by the pipeline tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::collaborators::{Generator, SearchResult, VectorStore, WebSearch};
use crate::error::CollaboratorError;

fn unavailable() -> CollaboratorError {
    CollaboratorError::Status {
        service: "stub",
        status: 503,
        body: "unavailable".to_string(),
    }
}

pub struct StubGenerator {
    answer: Option<String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl StubGenerator {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(
        &self,
        system_instruction: &str,
        user_content: &str,
    ) -> Result<String, CollaboratorError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), user_content.to_string()));
        self.answer.clone().ok_or_else(unavailable)
    }
}

pub struct StubSearch {
    results: Option<Vec<SearchResult>>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StubSearch {
    pub fn returning(results: Vec<SearchResult>) -> Arc<Self> {
        Arc::new(Self {
            results: Some(results),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            results: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, CollaboratorError> {
        self.queries.lock().unwrap().push((query.to_string(), top_k));
        self.results.clone().ok_or_else(unavailable)
    }
}

/// Keeps documents in order; retrieval returns the most recent `k` documents.
pub struct StubStore {
    fail_search: bool,
    fail_add: bool,
    documents: Mutex<Vec<String>>,
    searches: Mutex<Vec<(String, usize)>>,
}

impl StubStore {
    fn build(fail_search: bool, fail_add: bool) -> Arc<Self> {
        Arc::new(Self {
            fail_search,
            fail_add,
            documents: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
        })
    }

    pub fn new() -> Arc<Self> {
        Self::build(false, false)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(true, true)
    }

    pub fn failing_writes() -> Arc<Self> {
        Self::build(false, true)
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for StubStore {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, CollaboratorError> {
        self.searches.lock().unwrap().push((query.to_string(), k));
        if self.fail_search {
            return Err(unavailable());
        }
        let documents = self.documents.lock().unwrap();
        Ok(documents.iter().rev().take(k).cloned().collect())
    }

    async fn add_documents(&self, documents: &[String]) -> Result<(), CollaboratorError> {
        if self.fail_add {
            return Err(unavailable());
        }
        self.documents.lock().unwrap().extend_from_slice(documents);
        Ok(())
    }
}
