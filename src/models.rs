use serde::{Deserialize, Serialize};

/// A catalog row: one programming problem with its search metadata.
/// Identity is `problem_id`, a SHA-256 over markdown + solution text, so
/// re-upserting identical content always lands on the same row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub problem_id: String,
    pub problem_name: String,
    pub markdown_content: String,
    pub solution_code: String,
    pub tags: Vec<String>,
    pub embedding: Vec<f32>,
}

/// Request to index (or re-index) a problem.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub problem_name: String,
    pub markdown_content: String,
    pub solution_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    pub message: String,
    pub problem_id: String,
    pub problem_name: String,
}

/// Request for the name-list query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_query_limit")]
    pub limit: usize,
}

fn default_query_limit() -> usize {
    5
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub recommended_problems: Vec<String>,
    pub total_found: usize,
    pub query: String,
}

/// Request for the detailed-results endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

fn default_search_limit() -> usize {
    10
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub tags_filter: Option<Vec<String>>,
    pub limit: usize,
    pub recommended_problems: Vec<ProblemSearchResult>,
    pub total_found: usize,
}

/// One detailed search row. `difficulty`, `tags`, and `similarity_score` are
/// index-derived placeholders, not real ranking data (kept as-is; the search
/// RPC does not return them yet).
#[derive(Debug, Clone, Serialize)]
pub struct ProblemSearchResult {
    pub name: String,
    pub problem_id: String,
    pub difficulty: u32,
    pub tags: Vec<String>,
    pub similarity_score: f32,
}

/// Tags + embedding without the upsert, for callers that index elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOnlyResponse {
    pub tags: Vec<String>,
    pub embedding: Vec<f32>,
    pub problem_name: String,
    pub message: String,
}

/// Request to generate a task bundle from a free-text description.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    pub content_name: String,
    pub cases_size: usize,
    #[serde(default)]
    pub detail: Option<String>,
}

/// `upload-task` accepts either a generation request or a pre-generated file
/// list; when `files` is present the pipeline is skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTaskRequest {
    pub content_name: String,
    #[serde(default)]
    pub cases_size: Option<usize>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<UploadFileSpec>>,
}

/// One pre-generated file supplied inline (text content only).
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFileSpec {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadTaskResponse {
    pub message: String,
    pub task_name: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadZipResponse {
    pub message: String,
    pub task_name: String,
    pub files: Vec<String>,
    pub file_count: usize,
}

/// Category of a generated bundle file, for callers that group by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileCategory {
    Solution,
    Problem,
    Config,
    Script,
    TestCaseInput,
    TestCaseOutput,
}

/// One file of a generated bundle. Content is bytes so the PDF can ride in
/// the same list as the text files.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub category: FileCategory,
    pub file_path: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

impl GeneratedFile {
    pub fn text(
        category: FileCategory,
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            category,
            file_path: file_path.into(),
            file_name: file_name.into(),
            content: content.into().into_bytes(),
        }
    }
}

/// Everything one generation request produces: a sanitized task name and the
/// ordered file list. Transient; lives for one request.
#[derive(Debug, Clone)]
pub struct TaskBundle {
    pub task_name: String,
    pub files: Vec<GeneratedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_default_limit() {
        let req: QueryRequest = serde_json::from_str(r#"{"query": "graphs"}"#).unwrap();
        assert_eq!(req.limit, 5);
    }

    #[test]
    fn test_search_request_default_limit_and_tags() {
        let req: SearchRequest = serde_json::from_str(r#"{"query": "dp"}"#).unwrap();
        assert_eq!(req.limit, 10);
        assert!(req.tags.is_none());
    }

    #[test]
    fn test_upload_request_with_inline_files() {
        let req: UploadTaskRequest = serde_json::from_str(
            r#"{"content_name": "Two Sum", "files": [{"file_path": "config.json", "content": "{}"}]}"#,
        )
        .unwrap();
        assert_eq!(req.files.as_ref().unwrap().len(), 1);
        assert!(req.cases_size.is_none());
    }

    #[test]
    fn test_problem_record_round_trips() {
        let record = ProblemRecord {
            problem_id: "abc".into(),
            problem_name: "Two Sum".into(),
            markdown_content: "# Two Sum".into(),
            solution_code: "int main() {}".into(),
            tags: vec!["arrays".into()],
            embedding: vec![0.1, 0.2],
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ProblemRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.problem_id, "abc");
        assert_eq!(back.tags, vec!["arrays".to_string()]);
    }
}
