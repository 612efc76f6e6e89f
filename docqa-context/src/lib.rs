pub mod error;
pub mod text;

// Re-export the main chunking entry points for external use
pub use error::{ChunkError, Result};
pub use text::{
    Chunk, Chunker, ChunkerConfig, DEFAULT_BREAK_PATTERN, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE, DEFAULT_MIN_CHUNK_CHARS, DEFAULT_SENTENCE_CUT_RATIO, split,
};
