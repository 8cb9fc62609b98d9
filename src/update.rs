//! Catalog update pipeline: content hash → tags → embedding → upsert.
//!
//! Four typed steps run in order; the first failure stops the chain and its
//! message names the step that failed. The id step is pure, so identical
//! content always maps to the same row (idempotent upsert).

use sha2::{Digest, Sha256};

use crate::config::LlmConfig;
use crate::db::DbClient;
use crate::llm::{embeddings, tags};
use crate::models::{ProblemRecord, UpdateRequest};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UpdateError(pub String);

/// Deterministic problem identity: SHA-256 over markdown + solution text.
pub fn generate_problem_id(markdown_content: &str, solution_code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(markdown_content.as_bytes());
    hasher.update(solution_code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Steps 1-3: id, tags, embedding. Shared by the upsert endpoint and the
/// generate-only endpoint, which stops here.
pub async fn build_problem_record(
    client: &reqwest::Client,
    llm: &LlmConfig,
    req: &UpdateRequest,
) -> Result<ProblemRecord, UpdateError> {
    let problem_id = generate_problem_id(&req.markdown_content, &req.solution_code);
    tracing::info!("Generated problem id: {}...", &problem_id[..10]);

    tracing::info!("Generating tags for '{}'", req.problem_name);
    let raw_tags = tags::generate_tags(client, llm, &req.markdown_content, &req.solution_code)
        .await
        .map_err(|e| UpdateError(format!("Failed to generate tags: {e:#}")))?;
    let tag_list = tags::split_tags(&raw_tags);
    tracing::info!("Generated tags: {tag_list:?}");

    let combined_text = embedding_input(&tag_list, &req.markdown_content);
    let embedding = embeddings::embed_single(client, llm, &combined_text)
        .await
        .map_err(|e| UpdateError(format!("Failed to generate embedding: {e:#}")))?;
    tracing::info!("Generated embedding of length {}", embedding.len());

    Ok(ProblemRecord {
        problem_id,
        problem_name: req.problem_name.clone(),
        markdown_content: req.markdown_content.clone(),
        solution_code: req.solution_code.clone(),
        tags: tag_list,
        embedding,
    })
}

/// Full pipeline including step 4, the keyed upsert.
pub async fn run_update(
    client: &reqwest::Client,
    llm: &LlmConfig,
    db: &DbClient,
    req: &UpdateRequest,
) -> Result<ProblemRecord, UpdateError> {
    let record = build_problem_record(client, llm, req).await?;

    db.upsert_problem(&record)
        .await
        .map_err(|e| UpdateError(format!("Failed to upsert to database: {e:#}")))?;
    tracing::info!("Upsert successful for '{}'", record.problem_name);

    Ok(record)
}

/// The text the catalog embedding is computed over.
fn embedding_input(tag_list: &[String], markdown_content: &str) -> String {
    format!("Tags: {}\n\nProblem: {}", tag_list.join(", "), markdown_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_id_is_deterministic() {
        let a = generate_problem_id("# Problem", "int main() {}");
        let b = generate_problem_id("# Problem", "int main() {}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_problem_id_changes_with_content() {
        let a = generate_problem_id("# Problem", "int main() {}");
        let b = generate_problem_id("# Problem v2", "int main() {}");
        let c = generate_problem_id("# Problem", "int main() { return 1; }");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_embedding_input_layout() {
        let input = embedding_input(
            &["graphs".to_string(), "bfs".to_string()],
            "# Shortest Path",
        );
        assert_eq!(input, "Tags: graphs, bfs\n\nProblem: # Shortest Path");
    }
}
