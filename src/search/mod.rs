mod error;
mod index;
mod similarity;


pub use error::SearchError;
pub use index::{QuestionIndex, SearchHit, DEFAULT_TOP_K};
pub use similarity::cosine_similarity;
