use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collaborators::VectorStore;
use crate::error::CollaboratorError;

/// One stored document, as written to the history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub content: String,
    pub added_at: DateTime<Utc>,
}

/// Similarity store over term-frequency vectors.
///
/// Appends are serialized by `write_lock`, held across both the file write and the
/// in-memory push, so file order and memory order agree and a writer's entries land
/// in the order it issued them. The file write itself runs on the blocking pool.
pub struct InMemoryVectorStore {
    documents: Mutex<Vec<IndexedDocument>>,
    write_lock: tokio::sync::Mutex<()>,
    path: Option<PathBuf>,
    word_re: Regex,
}

struct IndexedDocument {
    stored: StoredDocument,
    terms: HashMap<String, f32>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            write_lock: tokio::sync::Mutex::new(()),
            path: None,
            word_re: word_regex(),
        }
    }

    /// Opens a store backed by a JSON-lines file, loading whatever it already holds.
    ///
    /// Missing files and parent directories are created on the first write. Lines that
    /// do not parse, such as a truncated final line, are skipped with a warning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CollaboratorError> {
        let path = path.as_ref().to_path_buf();
        let word_re = word_regex();
        let mut documents = Vec::new();

        if path.exists() {
            let reader = BufReader::new(fs::File::open(&path)?);
            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let stored: StoredDocument = match serde_json::from_str(&line) {
                    Ok(stored) => stored,
                    Err(e) => {
                        warn!(
                            "Skipping unreadable history line {} in {}: {}",
                            index + 1,
                            path.display(),
                            e
                        );
                        continue;
                    }
                };
                let terms = term_frequencies(&word_re, &stored.content);
                documents.push(IndexedDocument { stored, terms });
            }
        }

        info!(
            "Loaded {} history entries from {}",
            documents.len(),
            path.display()
        );

        Ok(Self {
            documents: Mutex::new(documents),
            write_lock: tokio::sync::Mutex::new(()),
            path: Some(path),
            word_re,
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Contents of every stored document, oldest first.
    pub fn documents(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|doc| doc.stored.content.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<IndexedDocument>> {
        // Poisoning is ignored: a push either completed or never happened.
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn append_to_file(path: &Path, stored: &[StoredDocument]) -> Result<(), CollaboratorError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for doc in stored {
            let line = serde_json::to_string(doc)?;
            writeln!(file, "{}", line)?;
        }
        file.flush()?;
        Ok(())
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, CollaboratorError> {
        let query_terms = term_frequencies(&self.word_re, query);
        if query_terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let documents = self.lock();
        let mut scored: Vec<(f32, usize)> = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| (cosine_similarity(&query_terms, &doc.terms), index))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let matches: Vec<String> = scored
            .into_iter()
            .take(k)
            .map(|(_, index)| documents[index].stored.content.clone())
            .collect();

        debug!("Similarity search matched {} documents", matches.len());
        Ok(matches)
    }

    async fn add_documents(&self, documents: &[String]) -> Result<(), CollaboratorError> {
        let now = Utc::now();
        let stored: Vec<StoredDocument> = documents
            .iter()
            .map(|content| StoredDocument {
                content: content.clone(),
                added_at: now,
            })
            .collect();

        let _write = self.write_lock.lock().await;
        if let Some(path) = &self.path {
            let path = path.clone();
            let lines = stored.clone();
            tokio::task::spawn_blocking(move || Self::append_to_file(&path, &lines))
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;
        }

        let mut guard = self.lock();
        for doc in stored {
            let terms = term_frequencies(&self.word_re, &doc.content);
            guard.push(IndexedDocument { stored: doc, terms });
        }
        Ok(())
    }
}

fn word_regex() -> Regex {
    Regex::new(r"\w+").expect("static word pattern is valid")
}

fn term_frequencies(word_re: &Regex, text: &str) -> HashMap<String, f32> {
    let mut terms = HashMap::new();
    for word in word_re.find_iter(text) {
        *terms.entry(word.as_str().to_lowercase()).or_insert(0.0) += 1.0;
    }
    terms
}

fn cosine_similarity(a: &HashMap<String, f32>, b: &HashMap<String, f32>) -> f32 {
    let dot: f32 = a
        .iter()
        .filter_map(|(term, weight)| b.get(term).map(|other| weight * other))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }
    let norm = |v: &HashMap<String, f32>| v.values().map(|w| w * w).sum::<f32>().sqrt();
    dot / (norm(a) * norm(b))
}
