//! Vector index: similarity scoring, immutable generations and the published pointer.
//!
//! - **[`similarity`]**: cosine similarity and top-k ranking as pure functions
//! - **[`generation`]**: [`IndexGeneration`], one validated, immutable build
//! - **[`vector_index`]**: [`VectorIndex`], which builds generations and swaps them in

pub mod generation;
pub mod similarity;
pub mod vector_index;

pub use generation::{EmbeddedChunk, IndexGeneration};
pub use similarity::{QueryResult, cosine_similarity, rank_top_k};
pub use vector_index::{BuildOptions, VectorIndex, embed_with_timeout};
