//! This module splits the extracted text of a reference document into overlapping,
//! boundary-aware chunks that can each be embedded separately.
//!
//! The chunker walks the text with a cursor and cuts fixed-size windows. When more
//! text remains after a window, it looks for the rightmost sentence end (a period
//! or newline by default) inside the window and cuts there instead, as long as
//! doing so keeps most of the target size. Consecutive windows overlap so that a
//! passage near a boundary is fully contained in at least one chunk.
//!
//! The module defines:
//! - [`ChunkerConfig`]: chunk size, overlap, noise threshold and break pattern.
//! - [`Chunker`]: a validated configuration with its compiled break pattern.
//! - [`Chunk`]: one trimmed segment of the document with its byte offset and
//!   position in document order.
//!
//! # Sizes
//!
//! All sizes are counted in characters (Unicode scalar values), so multi-byte text
//! is never cut in the middle of a code point. [`Chunk::source_offset`] is a byte
//! offset so it can be used to slice the original text directly.
//!
//! # Usage
//!
//! ```
//! use docqa_context::text::split;
//!
//! let paragraph = "The pump must be primed before first use and the valve opened. ".repeat(30);
//! let chunks = split(&paragraph, 1000, 200).unwrap();
//!
//! assert!(chunks.len() > 1);
//! for chunk in &chunks {
//!     assert!(chunk.char_len() <= 1000);
//!     assert!(paragraph[chunk.source_offset..].starts_with(&chunk.text));
//! }
//! ```
use crate::error::{ChunkError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Target chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Characters shared by two consecutive windows.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Trimmed chunks of this many characters or fewer are dropped as noise
/// (page headers, footers, whitespace runs).
pub const DEFAULT_MIN_CHUNK_CHARS: usize = 50;

/// A sentence cut is only taken when it lies beyond this fraction of the window.
pub const DEFAULT_SENTENCE_CUT_RATIO: f64 = 0.7;

/// Sentence-ending period or newline.
pub const DEFAULT_BREAK_PATTERN: &str = r"[.\n]";

/// Configuration for splitting a document into chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum window size in characters
    pub chunk_size: usize,
    /// Characters repeated at the start of the next window
    pub overlap: usize,
    /// Chunks whose trimmed length is at most this value are discarded
    pub min_chunk_chars: usize,
    /// Fraction of `chunk_size` a sentence cut must exceed to be used
    pub sentence_cut_ratio: f64,
    /// Regular expression matching the characters a chunk may end on
    pub break_pattern: String,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
            min_chunk_chars: DEFAULT_MIN_CHUNK_CHARS,
            sentence_cut_ratio: DEFAULT_SENTENCE_CUT_RATIO,
            break_pattern: DEFAULT_BREAK_PATTERN.to_string(),
        }
    }
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            ..Self::default()
        }
    }

    pub fn with_min_chunk_chars(mut self, min_chunk_chars: usize) -> Self {
        self.min_chunk_chars = min_chunk_chars;
        self
    }

    pub fn with_sentence_cut_ratio(mut self, ratio: f64) -> Self {
        self.sentence_cut_ratio = ratio;
        self
    }

    pub fn with_break_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.break_pattern = pattern.into();
        self
    }

    /// Check that the window can always make progress.
    ///
    /// # Errors
    /// - `chunk_size` is zero
    /// - `overlap` is not smaller than `chunk_size`
    /// - `sentence_cut_ratio` is outside `[0, 1)`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkError::invalid_config("chunk_size must be greater than zero"));
        }
        if self.overlap >= self.chunk_size {
            return Err(ChunkError::invalid_config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        if !(0.0..1.0).contains(&self.sentence_cut_ratio) {
            return Err(ChunkError::invalid_config(format!(
                "sentence_cut_ratio must be in [0, 1), got {}",
                self.sentence_cut_ratio
            )));
        }
        Ok(())
    }
}

/// A trimmed, contiguous slice of the source document.
///
/// Chunks are immutable once created. `index` reflects document order among the
/// chunks that were kept; it is used for traceability and tie-breaking, never for
/// ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The trimmed chunk text.
    pub text: String,
    /// Byte offset of `text` within the source document.
    pub source_offset: usize,
    /// Zero-based position of this chunk in document order.
    pub index: usize,
}

impl Chunk {
    /// Length of the chunk text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The first `max_chars` characters, with an ellipsis when truncated.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.text.chars().take(max_chars).collect();
        if preview.len() < self.text.len() {
            preview.push_str("...");
        }
        preview
    }
}

/// A validated chunking configuration with its compiled break pattern.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
    break_regex: Regex,
}

impl Chunker {
    /// Validate `config` and compile its break pattern.
    ///
    /// # Errors
    /// Returns [`ChunkError::InvalidConfig`] for parameters that cannot make
    /// progress and [`ChunkError::InvalidPattern`] for a pattern that does not
    /// compile. Patterns that match the empty string are rejected because they
    /// would allow a zero-length cut.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;

        let break_regex =
            Regex::new(&config.break_pattern).map_err(|source| ChunkError::InvalidPattern {
                pattern: config.break_pattern.clone(),
                source,
            })?;
        if break_regex.is_match("") {
            return Err(ChunkError::invalid_config(format!(
                "break pattern `{}` matches the empty string",
                config.break_pattern
            )));
        }

        Ok(Self {
            config,
            break_regex,
        })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `text` into ordered, overlapping chunks.
    ///
    /// Empty or whitespace-only input yields no chunks. Every returned chunk has a
    /// trimmed length greater than `min_chunk_chars` and at most `chunk_size`.
    ///
    /// # Errors
    /// Returns [`ChunkError::NoProgress`] if a sentence cut would move the cursor
    /// backwards, which happens when the overlap is larger than the slack left by
    /// `sentence_cut_ratio`.
    pub fn split(&self, text: &str) -> Result<Vec<Chunk>> {
        // Byte offset of every character, plus the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let len = boundaries.len() - 1;

        let chunk_size = self.config.chunk_size;
        let overlap = self.config.overlap;
        let cut_threshold = chunk_size as f64 * self.config.sentence_cut_ratio;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < len {
            let end = (start + chunk_size).min(len);

            let (cut, next) = if end < len {
                match self.last_break(text, &boundaries, start, end) {
                    Some(break_point) if (break_point - start) as f64 > cut_threshold => {
                        (break_point + 1, (break_point + 1).saturating_sub(overlap))
                    }
                    _ => (end, end - overlap),
                }
            } else {
                (end, end)
            };

            self.push_trimmed(text, boundaries[start], boundaries[cut], &mut chunks);

            if next <= start {
                return Err(ChunkError::NoProgress {
                    start,
                    next,
                    overlap,
                    chunk_size,
                });
            }
            start = next;
        }

        Ok(chunks)
    }

    /// Character position of the last character of the rightmost break match in
    /// the window `[start, end)`.
    fn last_break(
        &self,
        text: &str,
        boundaries: &[usize],
        start: usize,
        end: usize,
    ) -> Option<usize> {
        let window = &text[boundaries[start]..boundaries[end]];
        let last = self.break_regex.find_iter(window).last()?;
        let chars_through_match = window[..last.end()].chars().count();
        Some(start + chars_through_match - 1)
    }

    fn push_trimmed(&self, text: &str, from: usize, to: usize, chunks: &mut Vec<Chunk>) {
        let raw = &text[from..to];
        let trimmed = raw.trim();
        if trimmed.chars().count() <= self.config.min_chunk_chars {
            return;
        }

        let leading = raw.len() - raw.trim_start().len();
        chunks.push(Chunk {
            text: trimmed.to_string(),
            source_offset: from + leading,
            index: chunks.len(),
        });
    }
}

/// Split `text` with the given window size and overlap and default settings for
/// everything else.
///
/// # Errors
/// Same as [`ChunkerConfig::validate`] and [`Chunker::split`].
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Chunker::new(ChunkerConfig::new(chunk_size, overlap))?.split(text)
}
