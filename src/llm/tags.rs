use anyhow::Result;

use crate::config::LlmConfig;
use crate::llm::chat;

/// Ask the LLM to tag a problem from its statement and solution.
/// Returns the raw comma-separated tag string; the update pipeline splits it.
pub async fn generate_tags(
    client: &reqwest::Client,
    config: &LlmConfig,
    markdown: &str,
    solution_code: &str,
) -> Result<String> {
    let prompt = format!(
        "You are a competitive programming problem tagger. Read the problem \
         statement and its reference solution, then produce the algorithm and \
         data-structure tags that describe it (e.g. dynamic programming, \
         two pointers, segment tree).\n\n\
         Problem statement:\n{markdown}\n\n\
         Solution code:\n{solution_code}\n\n\
         Respond with ONLY a comma-separated list of tags. No explanation."
    );

    chat::complete(client, config, &prompt, 0.0).await
}

/// Split a comma-separated tag string into trimmed, non-empty tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
