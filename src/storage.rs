use anyhow::{Context, Result};

use crate::config::StorageConfig;
use crate::models::GeneratedFile;

/// Object-storage client. Bundle files land under
/// `<bucket>/<task_name>/<file_path>`.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    config: StorageConfig,
}

/// Upload failures worth telling apart at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Duplicate files found for task '{task_name}'")]
    DuplicatePath { task_name: String },
    #[error("Storage upload failed: {0}")]
    Upload(anyhow::Error),
}

impl StorageClient {
    pub fn new(http: reqwest::Client, config: StorageConfig) -> Self {
        Self { http, config }
    }

    /// Upload every file of a bundle. Stops at the first failure; a duplicate
    /// object path is reported as [`StorageError::DuplicatePath`] so callers
    /// can suggest deleting the old task folder first.
    pub async fn upload_files(
        &self,
        task_name: &str,
        files: &[GeneratedFile],
    ) -> Result<(), StorageError> {
        tracing::info!(
            "Uploading {} files for task '{task_name}' to bucket '{}'",
            files.len(),
            self.config.bucket
        );

        for file in files {
            let object_path = format!("{task_name}/{}", file.file_path);
            self.upload_object(&object_path, &file.content, content_type_for(&file.file_path))
                .await
                .map_err(|e| {
                    if e.to_string().contains("Duplicate") {
                        StorageError::DuplicatePath {
                            task_name: task_name.to_string(),
                        }
                    } else {
                        StorageError::Upload(e)
                    }
                })?;
        }

        tracing::info!("Successfully uploaded {} files for task '{task_name}'", files.len());
        Ok(())
    }

    async fn upload_object(&self, object_path: &str, content: &[u8], content_type: &str) -> Result<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url, self.config.bucket, object_path
        );

        tracing::debug!("Uploading object: {object_path}");

        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", content_type)
            .body(content.to_vec())
            .send()
            .await
            .with_context(|| format!("Failed to upload {object_path}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Storage upload of {object_path} returned {status}: {body}");
        }

        Ok(())
    }
}

fn content_type_for(file_path: &str) -> &'static str {
    if file_path.ends_with(".pdf") {
        "application/octet-stream"
    } else {
        "text/plain;charset=utf-8"
    }
}
