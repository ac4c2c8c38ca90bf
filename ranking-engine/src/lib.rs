//! Turns embeddings and sparse like/dislike labels into a display order.

pub mod fingerprint;
pub mod labels;
pub mod orchestrator;
pub mod similarity;

pub use fingerprint::Fingerprint;
pub use labels::LabelSet;
pub use orchestrator::{RankedImage, Ranking, RankingOrchestrator};
pub use similarity::{cosine_similarity, similarity_score};
