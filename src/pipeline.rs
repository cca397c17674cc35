//! Glue between the chunker and the external question/embedding services.
//!
//! Chunks are numbered by their position in the chunker output; that index is
//! the chunk id handed to the question generator.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::chunker::{Chunk, ChunkId};
use crate::embedder::TextEmbedder;
use crate::questions::{ChunkQuestions, QuestionGenerator};
use crate::search::{QuestionIndex, SearchHit};

/// Ask the generator for questions about every chunk, in order
pub async fn generate_questions<G>(chunks: &[Chunk], generator: &G) -> Result<Vec<ChunkQuestions>>
where
    G: QuestionGenerator + ?Sized,
{
    let mut results = Vec::with_capacity(chunks.len());

    for (i, chunk) in chunks.iter().enumerate() {
        let chunk_id = i as ChunkId;
        let result = generator
            .generate(chunk_id, &chunk.content)
            .await
            .with_context(|| format!("Failed to generate questions for chunk {}", chunk_id))?;

        if let Some(error) = &result.error {
            warn!(chunk_id, error = %error, "chunk has no usable questions");
        }
        results.push(result);
    }

    info!(chunks = results.len(), "generated questions");
    Ok(results)
}

/// Attach an embedding to every question that lacks one
pub async fn embed_questions<E>(items: &mut [ChunkQuestions], embedder: &E) -> Result<()>
where
    E: TextEmbedder + ?Sized,
{
    let texts: Vec<String> = items
        .iter()
        .flat_map(|item| &item.questions)
        .filter(|q| q.embedding.is_none())
        .map(|q| q.question.clone())
        .collect();

    if texts.is_empty() {
        return Ok(());
    }

    let embeddings = embedder
        .embed_texts(&texts)
        .await
        .context("Failed to embed questions")?;
    if embeddings.len() != texts.len() {
        bail!(
            "Embedder returned {} vectors for {} questions",
            embeddings.len(),
            texts.len()
        );
    }

    let targets = items
        .iter_mut()
        .flat_map(|item| item.questions.iter_mut())
        .filter(|q| q.embedding.is_none());
    for (question, embedding) in targets.zip(embeddings) {
        question.embedding = Some(embedding);
    }

    info!(questions = texts.len(), "embedded questions");
    Ok(())
}

/// Run question synthesis and embedding over a chunked document
pub async fn build_question_index<G, E>(
    chunks: &[Chunk],
    generator: &G,
    embedder: &E,
) -> Result<QuestionIndex>
where
    G: QuestionGenerator + ?Sized,
    E: TextEmbedder + ?Sized,
{
    let mut items = generate_questions(chunks, generator).await?;
    embed_questions(&mut items, embedder).await?;
    Ok(QuestionIndex::new(items))
}

/// Embed a free-text query and return the `k` closest questions
pub async fn search_query<E>(
    index: &QuestionIndex,
    embedder: &E,
    query: &str,
    k: usize,
) -> Result<Vec<SearchHit>>
where
    E: TextEmbedder + ?Sized,
{
    let mut vectors = embedder
        .embed_texts(&[query.to_string()])
        .await
        .context("Failed to embed query")?;
    let Some(vector) = vectors.pop() else {
        bail!("Embedder returned no vector for the query");
    };

    Ok(index.search(&vector, k))
}
