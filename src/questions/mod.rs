mod client;
mod parse;
mod prompt;
mod types;


pub use client::{questions_from_answer, QuestionClient, QuestionError, QuestionGenerator};
pub use parse::{parse_questions, NO_JSON_FOUND, PARSING_FAILED};
pub use prompt::build_prompt;
pub use types::{ChatMessage, ChatRequest, ChatResponse, ChunkQuestions, Question};
