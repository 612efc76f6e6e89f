//! Immutable index generations.
//!
//! An [`IndexGeneration`] is built in full, validated, and only then handed to
//! the [`VectorIndex`](super::VectorIndex) for publication. Nothing mutates it
//! afterwards, so queries scan it without holding any lock.

use super::similarity::{QueryResult, cosine_similarity, rank_top_k};
use crate::error::{Result, RetrievalError};
use chrono::{DateTime, Utc};
use docqa_context::Chunk;

/// A chunk together with its embedding vector
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl EmbeddedChunk {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// One complete, immutable build of the index
#[derive(Debug, Clone)]
pub struct IndexGeneration {
    id: u64,
    entries: Vec<EmbeddedChunk>,
    dimension: Option<usize>,
    built_at: DateTime<Utc>,
}

impl IndexGeneration {
    /// Assemble a generation, checking that every vector has the same length.
    ///
    /// The first entry fixes the dimension. An empty entry list is allowed and
    /// yields a generation with no dimension.
    pub fn new(id: u64, entries: Vec<EmbeddedChunk>) -> Result<Self> {
        let dimension = entries.first().map(EmbeddedChunk::dimension);

        if let Some(expected) = dimension {
            if expected == 0 {
                return Err(RetrievalError::DimensionMismatch {
                    expected: 1,
                    found: 0,
                    chunk_index: entries.first().map(|e| e.chunk.index),
                });
            }
            if let Some(bad) = entries.iter().find(|e| e.dimension() != expected) {
                return Err(RetrievalError::DimensionMismatch {
                    expected,
                    found: bad.dimension(),
                    chunk_index: Some(bad.chunk.index),
                });
            }
        }

        Ok(Self {
            id,
            entries,
            dimension,
            built_at: Utc::now(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn entries(&self) -> &[EmbeddedChunk] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector length shared by every entry, `None` for an empty generation
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Linear scan returning the `k` chunks most similar to `query`.
    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let Some(expected) = self.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != expected {
            return Err(RetrievalError::DimensionMismatch {
                expected,
                found: query.len(),
                chunk_index: None,
            });
        }

        let scored = self
            .entries
            .iter()
            .map(|entry| QueryResult {
                chunk: entry.chunk.clone(),
                similarity: cosine_similarity(query, &entry.vector),
            })
            .collect();

        Ok(rank_top_k(scored, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk::new(
            Chunk {
                text: format!("passage {index}"),
                source_offset: index * 100,
                index,
            },
            vector,
        )
    }

    #[test]
    fn test_uniform_dimension_required() {
        let result = IndexGeneration::new(
            1,
            vec![entry(0, vec![1.0, 0.0]), entry(1, vec![1.0, 0.0, 0.0])],
        );
        match result {
            Err(RetrievalError::DimensionMismatch {
                expected,
                found,
                chunk_index,
            }) => {
                assert_eq!((expected, found, chunk_index), (2, 3, Some(1)));
            }
            other => panic!("expected dimension mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_generation() {
        let generation = IndexGeneration::new(7, Vec::new()).unwrap();
        assert!(generation.is_empty());
        assert_eq!(generation.dimension(), None);
        assert!(generation.top_k(&[1.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_top_k_exact_match_first() {
        let generation = IndexGeneration::new(
            1,
            vec![
                entry(0, vec![1.0, 0.0, 0.0]),
                entry(1, vec![0.0, 1.0, 0.0]),
                entry(2, vec![0.6, 0.8, 0.0]),
                entry(3, vec![0.0, 0.0, 1.0]),
            ],
        )
        .unwrap();

        let results = generation.top_k(&[0.0, 1.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.index, 1);
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
        assert_eq!(results[1].chunk.index, 2);
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let generation = IndexGeneration::new(1, vec![entry(0, vec![1.0, 0.0])]).unwrap();
        assert!(matches!(
            generation.top_k(&[1.0, 0.0, 0.0], 1),
            Err(RetrievalError::DimensionMismatch {
                expected: 2,
                found: 3,
                chunk_index: None
            })
        ));
    }
}
