use anyhow::Result;
use moka::sync::Cache;

use crate::config::LlmConfig;
use crate::llm::chat;

/// Expand a search query into comma-separated related terms.
///
/// Results are memoized per raw query in a bounded cache, so repeated
/// searches for the same text cost one LLM call. The caller appends the
/// expansion to the original query; it never replaces it.
pub async fn expand_query(
    client: &reqwest::Client,
    config: &LlmConfig,
    cache: &Cache<String, String>,
    query: &str,
) -> Result<String> {
    if let Some(cached) = cache.get(query) {
        tracing::debug!("Query expansion cache hit for '{query}'");
        return Ok(cached);
    }

    let prompt = format!(
        "You are a search query expander for a catalog of competitive programming \
         problems. Given a search query, list related algorithm and data-structure \
         terms that capture the same intent.\n\n\
         Query: \"{query}\"\n\n\
         Respond with ONLY a comma-separated list of terms. No explanation.\n\
         Example: dynamic programming, memoization, optimal substructure"
    );

    let response = chat::complete(client, config, &prompt, 0.0).await?;
    let expanded = clean_expansion(&response);

    cache.insert(query.to_string(), expanded.clone());
    Ok(expanded)
}

/// Normalize the LLM reply into a bare comma-separated term list.
fn clean_expansion(content: &str) -> String {
    let stripped = content
        .trim()
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    stripped
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Combine the original query with its expansion for embedding. The original
/// always comes first; expansion commas become spaces.
pub fn combine_for_embedding(query: &str, expanded_terms: &str) -> String {
    if expanded_terms.is_empty() {
        return query.to_string();
    }
    format!("{query} {}", expanded_terms.replace(',', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_expansion_plain_list() {
        let input = "graph traversal, breadth-first search, shortest path";
        assert_eq!(
            clean_expansion(input),
            "graph traversal, breadth-first search, shortest path"
        );
    }

    #[test]
    fn test_clean_expansion_strips_fences_and_blanks() {
        let input = "```\ngraphs, , trees,\n```";
        assert_eq!(clean_expansion(input), "graphs, trees");
    }

    #[test]
    fn test_combine_preserves_original_query_first() {
        let combined = combine_for_embedding("two pointers", "sliding window,arrays");
        assert!(combined.starts_with("two pointers "));
        assert!(combined.contains("sliding window"));
        assert!(!combined.contains(','));
    }

    #[test]
    fn test_combine_with_empty_expansion() {
        assert_eq!(combine_for_embedding("dp", ""), "dp");
    }

    #[test]
    fn test_cache_bounds_and_hits() {
        let cache: Cache<String, String> = Cache::new(2);
        cache.insert("a".into(), "x".into());
        assert_eq!(cache.get("a"), Some("x".to_string()));
        assert_eq!(cache.get("b"), None);
    }
}
