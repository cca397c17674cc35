use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::similarity::cosine_similarity;
use super::SearchError;
use crate::chunker::ChunkId;
use crate::questions::ChunkQuestions;

/// Default number of hits returned by a search
pub const DEFAULT_TOP_K: usize = 4;

/// One (chunk, question) pair scored against a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_id: ChunkId,
    pub chunk_content: String,
    pub question: String,
    pub similarity: f32,
}

/// Chunks with their embedded questions, searchable by query vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionIndex {
    items: Vec<ChunkQuestions>,
}

impl QuestionIndex {
    pub fn new(items: Vec<ChunkQuestions>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ChunkQuestions] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [ChunkQuestions] {
        &mut self.items
    }

    /// Number of questions across all chunks
    pub fn question_count(&self) -> usize {
        self.items.iter().map(|item| item.questions.len()).sum()
    }

    pub fn push(&mut self, item: ChunkQuestions) {
        self.items.push(item);
    }

    /// Number of questions carrying an embedding
    pub fn embedded_count(&self) -> usize {
        self.items
            .iter()
            .flat_map(|item| &item.questions)
            .filter(|q| q.embedding.is_some())
            .count()
    }

    pub fn from_json_str(json: &str) -> Result<Self, SearchError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, SearchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SearchError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Top `k` (chunk, question) pairs by cosine similarity to `query`.
    ///
    /// Sorted by descending similarity; equal scores keep index order.
    /// Questions without an embedding are skipped.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .items
            .iter()
            .flat_map(|item| {
                item.questions.iter().filter_map(move |q| {
                    let embedding = q.embedding.as_deref()?;
                    Some(SearchHit {
                        chunk_id: item.chunk_id,
                        chunk_content: item.chunk_content.clone(),
                        question: q.question.clone(),
                        similarity: cosine_similarity(query, embedding),
                    })
                })
            })
            .collect();

        debug!(candidates = hits.len(), k, "ranking questions");

        // sort_by is stable
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(k);
        hits
    }
}

impl From<Vec<ChunkQuestions>> for QuestionIndex {
    fn from(items: Vec<ChunkQuestions>) -> Self {
        Self::new(items)
    }
}
