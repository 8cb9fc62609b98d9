use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::DatabaseConfig;
use crate::models::ProblemRecord;

/// Client for the managed problem catalog: a PostgREST-style gateway with a
/// table of [`ProblemRecord`] rows and a server-side hybrid-search function.
/// Ranking (lexical + vector) happens entirely inside the database.
#[derive(Clone)]
pub struct DbClient {
    http: reqwest::Client,
    config: DatabaseConfig,
}

/// One ranked row from the hybrid-search RPC. The row type belongs to the
/// database function, so everything beyond the name is decoded leniently.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchRow {
    pub problem_name: String,
    #[serde(default)]
    pub problem_id: Option<String>,
}

impl DbClient {
    pub fn new(http: reqwest::Client, config: DatabaseConfig) -> Self {
        Self { http, config }
    }

    /// Insert-or-overwrite a problem row keyed by `problem_id`.
    pub async fn upsert_problem(&self, record: &ProblemRecord) -> Result<()> {
        let url = format!(
            "{}/rest/v1/{}?on_conflict=problem_id",
            self.config.base_url, self.config.table
        );

        tracing::info!("Upserting problem {}", &record.problem_id[..10.min(record.problem_id.len())]);

        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record)
            .send()
            .await
            .context("Failed to call database upsert")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Database upsert returned {status}: {body}");
        }

        Ok(())
    }

    /// Call the hybrid-search RPC with the combined query text and its
    /// embedding. An empty row set is a valid outcome, not an error.
    pub async fn hybrid_search(
        &self,
        query_text: &str,
        query_embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<SearchRow>> {
        let url = format!(
            "{}/rest/v1/rpc/{}",
            self.config.base_url, self.config.search_function
        );

        tracing::info!(
            "Hybrid search: match_count={match_count}, embedding_len={}",
            query_embedding.len()
        );

        let params = json!({
            "query_text": query_text,
            "query_embedding": query_embedding,
            "match_count": match_count,
        });

        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&params)
            .send()
            .await
            .context("Failed to call hybrid search RPC")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Hybrid search RPC returned {status}: {body}");
        }

        let rows: Vec<SearchRow> = resp
            .json()
            .await
            .context("Failed to parse hybrid search response")?;

        if rows.is_empty() {
            tracing::warn!("Hybrid search returned no rows");
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_row_decodes_name_only() {
        let row: SearchRow = serde_json::from_str(r#"{"problem_name": "Two Sum"}"#).unwrap();
        assert_eq!(row.problem_name, "Two Sum");
        assert!(row.problem_id.is_none());
    }

    #[test]
    fn test_search_row_ignores_extra_columns() {
        let row: SearchRow = serde_json::from_str(
            r#"{"problem_name": "Two Sum", "problem_id": "abc", "rank": 0.93}"#,
        )
        .unwrap();
        assert_eq!(row.problem_id.as_deref(), Some("abc"));
    }
}
