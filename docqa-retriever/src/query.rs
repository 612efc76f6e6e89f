//! Query normalization and passage formatting.

use crate::config::QueryConfig;
use crate::index::QueryResult;

/// Separator placed between formatted passages
pub const PASSAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Turn a raw user query into the text that gets embedded.
///
/// With keyword extraction on, the query is lower-cased, split on whitespace,
/// tokens of `short_token_chars` characters or fewer are dropped, and the first
/// `max_keywords` survivors are joined with single spaces. If nothing survives,
/// or extraction is off, the trimmed raw query is used as is. An empty return
/// value means there is nothing to search for.
pub fn normalize_query(raw: &str, config: &QueryConfig) -> String {
    if config.keyword_extraction {
        let keywords: Vec<String> = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|token| token.chars().count() > config.short_token_chars)
            .take(config.max_keywords)
            .collect();
        if !keywords.is_empty() {
            return keywords.join(" ");
        }
    }
    raw.trim().to_string()
}

/// Render ranked results for a downstream prompt.
///
/// ```
/// use docqa_context::Chunk;
/// use docqa_retriever::index::QueryResult;
/// use docqa_retriever::query::format_passages;
///
/// let results = vec![QueryResult {
///     chunk: Chunk { text: "Hold the power button.".into(), source_offset: 0, index: 0 },
///     similarity: 0.8731,
/// }];
/// assert_eq!(
///     format_passages(&results),
///     "[Passage 1 | similarity 0.873]\nHold the power button."
/// );
/// ```
pub fn format_passages(results: &[QueryResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "[Passage {} | similarity {:.3}]\n{}",
                i + 1,
                result.similarity,
                result.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join(PASSAGE_SEPARATOR)
}
