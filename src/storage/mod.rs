/// Object storage for uploaded deliverables.
// region:    --- Imports
use crate::error::AppError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Storage Types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage rejected upload: {0}")]
    Rejected(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::internal(err.to_string())
    }
}

/// A file received from a client, held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `file` as `folder/name`, returning the url it can be fetched from.
    async fn store(&self, folder: &str, name: &str, file: UploadedFile) -> Result<String, StorageError>;

    /// Remove a previously stored object. Best effort.
    async fn remove(&self, url: &str) -> Result<(), StorageError>;
}
// endregion: --- Storage Types

// region:    --- Local Storage
/// Writes files under a directory on the local disk.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn store(&self, folder: &str, name: &str, file: UploadedFile) -> Result<String, StorageError> {
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(sanitize(name));
        tokio::fs::write(&path, &file.bytes).await?;
        info!(
            "{:<12} --> stored {} bytes at {}",
            "Storage",
            file.bytes.len(),
            path.display()
        );

        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        tokio::fs::remove_file(url).await?;
        Ok(())
    }
}
// endregion: --- Local Storage

// region:    --- Cloudinary Storage
#[derive(Deserialize)]
struct CloudinaryUpload {
    secure_url: String,
}

/// Unsigned raw uploads to Cloudinary through an upload preset.
pub struct CloudinaryStorage {
    client: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
}

impl CloudinaryStorage {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/raw/upload",
            self.cloud_name
        )
    }
}

#[async_trait]
impl FileStorage for CloudinaryStorage {
    async fn store(&self, folder: &str, name: &str, file: UploadedFile) -> Result<String, StorageError> {
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", folder.to_string())
            .text("public_id", sanitize(name));

        let response = self.client.post(self.upload_url()).multipart(form).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected(format!("{status}: {body}")));
        }

        let upload: CloudinaryUpload = response.json().await?;
        info!("{:<12} --> uploaded to {}", "Storage", upload.secure_url);
        Ok(upload.secure_url)
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        // unsigned presets cannot destroy assets
        warn!("{:<12} --> leaving orphaned upload {}", "Storage", url);
        Ok(())
    }
}
// endregion: --- Cloudinary Storage

/// Keep object names to a safe character set.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
