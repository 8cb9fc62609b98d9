use axum::extract::State;
use axum::Json;

use crate::db::SearchRow;
use crate::error::ApiError;
use crate::llm::{embeddings, query_expand};
use crate::models::{
    GenerateOnlyResponse, ProblemSearchResult, QueryRequest, QueryResponse, SearchRequest,
    SearchResponse, UpdateRequest, UpdateResponse,
};
use crate::state::AppState;
use crate::update;

const MAX_SEARCH_LIMIT: usize = 50;

/// POST /v1/update-database - Index a problem: hash id, LLM tags, embedding,
/// keyed upsert.
pub async fn update_database(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    tracing::info!("Received update request for problem: {}", req.problem_name);
    validate_update_request(&req)?;

    let record = update::run_update(&state.http_client, &state.config.llm, &state.db, &req)
        .await
        .map_err(|e| ApiError::Upstream(e.0))?;

    Ok(Json(UpdateResponse {
        message: "Database updated successfully.".to_string(),
        problem_id: record.problem_id,
        problem_name: record.problem_name,
    }))
}

/// POST /v1/query - Hybrid search returning the top problem names.
pub async fn query_database(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    tracing::info!("Received search query: '{}'", req.query);
    let query = validate_query(&req.query, req.limit)?;

    let rows = run_search_pipeline(&state, &query, req.limit).await?;
    let names: Vec<String> = rows.into_iter().map(|r| r.problem_name).collect();

    tracing::info!("Search completed: {} results", names.len());
    Ok(Json(QueryResponse {
        total_found: names.len(),
        recommended_problems: names,
        query,
    }))
}

/// POST /v1/searchsmith-results - Same pipeline as /v1/query, shaped into
/// detailed rows for the frontend.
pub async fn searchsmith_results(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    tracing::info!(
        "Received searchsmith-results request: query='{}', limit={}",
        req.query,
        req.limit
    );
    let query = validate_query(&req.query, req.limit)?;

    let rows = run_search_pipeline(&state, &query, req.limit).await?;

    // difficulty, tags, and similarity_score are placeholders derived from
    // the row index; the search RPC does not return them yet.
    let detailed: Vec<ProblemSearchResult> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| ProblemSearchResult {
            name: row.problem_name,
            problem_id: row
                .problem_id
                .unwrap_or_else(|| format!("problem_{}", i + 1)),
            difficulty: 800 + (i as u32) * 100,
            tags: vec!["algorithm".to_string(), "data-structures".to_string()],
            similarity_score: 0.95 - (i as f32) * 0.05,
        })
        .collect();

    Ok(Json(SearchResponse {
        query,
        tags_filter: req.tags,
        limit: req.limit,
        total_found: detailed.len(),
        recommended_problems: detailed,
    }))
}

/// POST /v1/generate-only - Tags + embedding without touching the database.
pub async fn generate_only(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<GenerateOnlyResponse>, ApiError> {
    tracing::info!("Received generate-only request for problem: {}", req.problem_name);
    validate_update_request(&req)?;

    let record = update::build_problem_record(&state.http_client, &state.config.llm, &req)
        .await
        .map_err(|e| ApiError::Upstream(e.0))?;

    Ok(Json(GenerateOnlyResponse {
        tags: record.tags,
        embedding: record.embedding,
        problem_name: record.problem_name,
        message: "Tags and embedding generated successfully".to_string(),
    }))
}

/// The three search steps. Expansion enriches the query: its terms are
/// appended after the original text, never substituted for it.
async fn run_search_pipeline(
    state: &AppState,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchRow>, ApiError> {
    // ── Step 1: Query Expansion ──────────────────────────
    let expanded = query_expand::expand_query(
        &state.http_client,
        &state.config.llm,
        &state.expansion_cache,
        query,
    )
    .await
    .map_err(|e| ApiError::Upstream(format!("Failed to expand query with AI: {e:#}")))?;
    tracing::info!("Query expanded: '{expanded}'");

    // ── Step 2: Embedding ────────────────────────────────
    let combined = query_expand::combine_for_embedding(query, &expanded);
    let query_embedding = embeddings::embed_single(&state.http_client, &state.config.llm, &combined)
        .await
        .map_err(|e| ApiError::Upstream(format!("Failed to generate query embedding: {e:#}")))?;

    // ── Step 3: Hybrid Search ────────────────────────────
    let rows = state
        .db
        .hybrid_search(&combined, &query_embedding, limit)
        .await
        .map_err(|e| ApiError::Upstream(format!("Failed to perform hybrid search: {e:#}")))?;

    Ok(rows)
}

fn validate_update_request(req: &UpdateRequest) -> Result<(), ApiError> {
    if req.problem_name.trim().is_empty()
        || req.markdown_content.trim().is_empty()
        || req.solution_code.trim().is_empty()
    {
        return Err(ApiError::validation(
            "All fields (problem_name, markdown_content, solution_code) are required.",
        ));
    }
    Ok(())
}

fn validate_query(query: &str, limit: usize) -> Result<String, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::validation(
            "Query parameter is required and cannot be empty.",
        ));
    }
    if limit == 0 || limit > MAX_SEARCH_LIMIT {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {MAX_SEARCH_LIMIT}"
        )));
    }
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_req(name: &str) -> UpdateRequest {
        UpdateRequest {
            problem_name: name.to_string(),
            markdown_content: "# P".to_string(),
            solution_code: "int main() {}".to_string(),
        }
    }

    #[test]
    fn test_blank_problem_name_rejected() {
        let err = validate_update_request(&update_req("   ")).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("problem_name"));
    }

    #[test]
    fn test_complete_update_request_accepted() {
        assert!(validate_update_request(&update_req("Two Sum")).is_ok());
    }

    #[test]
    fn test_blank_query_rejected() {
        let err = validate_query("  ", 5).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_query_limit_bounds() {
        assert!(validate_query("graphs", 0).is_err());
        assert!(validate_query("graphs", 51).is_err());
        assert!(validate_query("graphs", 50).is_ok());
        assert!(validate_query("graphs", 1).is_ok());
    }

    #[test]
    fn test_query_trimmed() {
        assert_eq!(validate_query("  graphs  ", 5).unwrap(), "graphs");
    }
}
