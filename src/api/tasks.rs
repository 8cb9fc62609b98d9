use std::io::{Read, Write};
use std::sync::LazyLock;

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::Json;
use regex::Regex;

use crate::error::ApiError;
use crate::generation::{self, sanitize_task_name};
use crate::models::{
    FileCategory, GeneratedFile, TaskBundle, TaskRequest, UploadTaskRequest, UploadTaskResponse,
    UploadZipResponse,
};
use crate::state::AppState;
use crate::storage::StorageError;

/// POST /generate-preview - Run the generation pipeline and return the
/// bundle as a zip download.
pub async fn generate_preview(
    State(state): State<AppState>,
    Json(req): Json<TaskRequest>,
) -> Result<([(header::HeaderName, String); 2], Vec<u8>), ApiError> {
    validate_task_request(&req)?;

    tracing::info!("Generating preview for task: {}", req.content_name);
    let bundle = generation::generate_task(
        &state.http_client,
        &state.config.llm,
        &state.config.generator,
        &state.config.pdf,
        &req,
    )
    .await
    .map_err(|e| ApiError::Generation(e.0))?;

    let zip_bytes = build_zip(&bundle)
        .map_err(|e| ApiError::Generation(format!("Failed to create zip archive: {e:#}")))?;

    tracing::info!(
        "Generated zip with {} files for task: {}",
        bundle.files.len(),
        bundle.task_name
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}_tasks.zip\"", bundle.task_name),
            ),
        ],
        zip_bytes,
    ))
}

/// POST /upload-task - Generate (or accept pre-generated files) and upload
/// the bundle to object storage.
pub async fn upload_task(
    State(state): State<AppState>,
    Json(req): Json<UploadTaskRequest>,
) -> Result<Json<UploadTaskResponse>, ApiError> {
    if req.content_name.trim().is_empty() {
        return Err(ApiError::validation("content_name is required"));
    }

    let bundle = match &req.files {
        // Pre-generated file list: skip the pipeline, upload verbatim.
        Some(files) => {
            if files.is_empty() {
                return Err(ApiError::validation("files list cannot be empty"));
            }
            let task_name = sanitize_task_name(&req.content_name);
            let files = files
                .iter()
                .map(|f| {
                    GeneratedFile::text(
                        categorize_path(&f.file_path),
                        f.file_path.clone(),
                        f.file_path.rsplit('/').next().unwrap_or_default().to_string(),
                        f.content.clone(),
                    )
                })
                .collect();
            TaskBundle { task_name, files }
        }
        None => {
            let cases_size = req
                .cases_size
                .ok_or_else(|| ApiError::validation("cases_size is required"))?;
            let task_req = TaskRequest {
                content_name: req.content_name.clone(),
                cases_size,
                detail: req.detail.clone(),
            };
            validate_task_request(&task_req)?;

            tracing::info!("Generating and uploading task: {}", task_req.content_name);
            generation::generate_task(
                &state.http_client,
                &state.config.llm,
                &state.config.generator,
                &state.config.pdf,
                &task_req,
            )
            .await
            .map_err(|e| ApiError::Generation(e.0))?
        }
    };

    upload_bundle(&state, &bundle.task_name, &bundle.files).await?;

    Ok(Json(UploadTaskResponse {
        message: format!(
            "Task '{}' and its {} files uploaded to bucket successfully!",
            bundle.task_name,
            bundle.files.len()
        ),
        task_name: bundle.task_name,
        file_count: bundle.files.len(),
    }))
}

/// POST /upload-task-zip - Accept a zip upload, sanitize every entry path,
/// and store the contents.
pub async fn upload_task_zip(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadZipResponse>, ApiError> {
    let mut zip_bytes: Option<Vec<u8>> = None;
    let mut file_name = String::new();
    let mut task_name = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;
                zip_bytes = Some(bytes.to_vec());
            }
            Some("task_name") => {
                task_name = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read task_name: {e}")))?;
            }
            _ => {}
        }
    }

    let contents = zip_bytes.ok_or_else(|| ApiError::validation("file field is required"))?;
    if task_name.trim().is_empty() {
        return Err(ApiError::validation("task_name field is required"));
    }
    if !file_name.to_lowercase().ends_with(".zip") {
        return Err(ApiError::validation("Only ZIP files are allowed"));
    }
    if contents.is_empty() {
        return Err(ApiError::validation("Empty file uploaded"));
    }

    tracing::info!("Processing ZIP upload for task: {task_name}");
    let safe_task_name = clean_path(&task_name);
    let files = extract_zip_entries(&contents, &safe_task_name)?;
    if files.is_empty() {
        return Err(ApiError::validation("No valid files found in ZIP"));
    }

    let paths: Vec<String> = files.iter().map(|f| f.file_path.clone()).collect();
    upload_bundle(&state, &safe_task_name, &files).await?;

    Ok(Json(UploadZipResponse {
        message: format!("ZIP for '{safe_task_name}' uploaded and files stored!"),
        task_name: safe_task_name,
        file_count: paths.len(),
        files: paths,
    }))
}

async fn upload_bundle(
    state: &AppState,
    task_name: &str,
    files: &[GeneratedFile],
) -> Result<(), ApiError> {
    state
        .storage
        .upload_files(task_name, files)
        .await
        .map_err(|e| match e {
            StorageError::DuplicatePath { .. } => ApiError::Storage(e.to_string()),
            StorageError::Upload(inner) => {
                ApiError::Storage(format!("Upload to bucket failed: {inner:#}"))
            }
        })
}

/// Read each file entry of a zip archive, sanitizing its path and stripping a
/// leading `<task_name>/` folder. Unreadable entries are skipped with a
/// warning, matching the lenient upload contract.
fn extract_zip_entries(
    contents: &[u8],
    safe_task_name: &str,
) -> Result<Vec<GeneratedFile>, ApiError> {
    let cursor = std::io::Cursor::new(contents);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| ApiError::validation(format!("Invalid ZIP file: {e}")))?;

    let mut files = Vec::new();
    let prefix = format!("{safe_task_name}/");

    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to open zip entry {i}: {e}");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let cleaned = clean_path(entry.name());
        if cleaned.is_empty() {
            continue;
        }

        // Drop the root folder when it repeats the task name
        let without_root = cleaned.strip_prefix(&prefix).unwrap_or(cleaned.as_str());
        let file_path = clean_path(without_root);
        if file_path.is_empty() {
            continue;
        }

        let mut content = Vec::with_capacity(entry.size() as usize);
        if let Err(e) = entry.read_to_end(&mut content) {
            tracing::warn!("Failed to read zip entry '{}': {e}", entry.name());
            continue;
        }

        let file_name = file_path.rsplit('/').next().unwrap_or_default().to_string();
        files.push(GeneratedFile {
            category: categorize_path(&file_path),
            file_path,
            file_name,
            content,
        });
    }

    Ok(files)
}

/// Serialize a bundle into zip bytes; entries live under
/// `<task_name>/<file_path>`.
pub fn build_zip(bundle: &TaskBundle) -> anyhow::Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for file in &bundle.files {
        writer.start_file(format!("{}/{}", bundle.task_name, file.file_path), options)?;
        writer.write_all(&file.content)?;
    }

    Ok(writer.finish()?.into_inner())
}

static UNSAFE_PATH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9._/\-]").expect("path charset regex"));
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("underscore run regex"));

/// Sanitize a file path: unsafe characters become underscores, runs
/// collapse, and each segment is trimmed. Also defuses traversal sequences
/// (`..` segments collapse into plain underscore-free text).
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let cleaned = UNSAFE_PATH_CHARS.replace_all(path, "_");
    let cleaned = UNDERSCORE_RUN.replace_all(&cleaned, "_");
    let cleaned = cleaned.trim_matches('_').trim_matches('/');

    cleaned
        .split('/')
        .map(|seg| seg.trim_matches('_'))
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .collect::<Vec<_>>()
        .join("/")
}

fn validate_task_request(req: &TaskRequest) -> Result<(), ApiError> {
    if req.content_name.trim().is_empty() {
        return Err(ApiError::validation("content_name is required"));
    }
    if req.cases_size == 0 {
        return Err(ApiError::validation("cases_size must be greater than 0"));
    }
    Ok(())
}

fn categorize_path(path: &str) -> FileCategory {
    if path.starts_with("Solutions/") {
        FileCategory::Solution
    } else if path.starts_with("Problems/") {
        FileCategory::Problem
    } else if path.starts_with("Scripts/") {
        FileCategory::Script
    } else if path.starts_with("TestCases/Inputs/") {
        FileCategory::TestCaseInput
    } else if path.starts_with("TestCases/Outputs/") {
        FileCategory::TestCaseOutput
    } else {
        FileCategory::Config
    }
}
