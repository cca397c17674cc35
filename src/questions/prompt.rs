use crate::chunker::ChunkId;

/// Prompt asking the model for the questions a chunk can answer
pub fn build_prompt(chunk_id: ChunkId, chunk_content: &str) -> String {
    format!(
        r#"You are an expert at writing questions.
Read the text chunk below and write exactly 3 or 4 questions that this chunk answers.

The questions must be:
- Specific and grounded in the content of the chunk
- Clearly worded, without ambiguity

Answer with JSON only, in this format:
{{
  "chunk_id": {chunk_id},
  "questions": [
    {{ "question": "..." }}
  ]
}}

CHUNK:
{chunk_content}"#
    )
}
