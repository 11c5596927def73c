//! Object storage repository for uploaded files and profile pictures.

use std::sync::Arc;

use base64::Engine;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use workdesk_core::ValidationError;

use crate::error::ServiceError;
use crate::rest::BackendClient;

/// Largest accepted image, 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const DEFAULT_EXTENSION: &str = "jpg";

/// A file picked by the user.
#[derive(Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    /// Extension after the last dot, or `jpg`.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => DEFAULT_EXTENSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Path inside the bucket
    pub path: String,
    /// Public URL of the object
    pub url: String,
}

/// Reject anything that is not an image or is larger than 5 MiB.
pub fn validate_image(content_type: &str, size: usize) -> Result<(), ValidationError> {
    if !content_type.starts_with("image/") {
        return Err(ValidationError::InvalidFileType(content_type.to_string()));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::FileTooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// `data:` URL embedding the file, used for avatars when no object store exists.
pub fn inline_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Repository over one bucket of the hosted object store.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    backend: Arc<BackendClient>,
    bucket: String,
    avatars_folder: String,
}

impl ObjectStorage {
    pub fn new(backend: Arc<BackendClient>, bucket: &str, avatars_folder: &str) -> Self {
        Self {
            backend,
            bucket: bucket.to_string(),
            avatars_folder: avatars_folder.trim_matches('/').to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        self.backend
            .storage_url(&format!("object/{}/{}", self.bucket, encoded.join("/")))
    }

    /// Public URL for `path`. Does not check that the object exists.
    pub fn public_url(&self, path: &str) -> String {
        self.backend.storage_url(&format!(
            "object/public/{}/{}",
            self.bucket,
            path.trim_start_matches('/')
        ))
    }

    /// Upload raw bytes to `path`. Returns the path inside the bucket.
    #[instrument(skip(self, bytes, access_token), fields(size = bytes.len()), level = "info")]
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
        access_token: Option<&str>,
    ) -> Result<String, ServiceError> {
        let url = self.object_url(path);
        let response = self
            .backend
            .request(Method::POST, &url, access_token)
            .header("Content-Type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;

        self.backend.handle_empty(response).await?;
        tracing::info!("Uploaded {} to bucket {}", path, self.bucket);
        Ok(path.to_string())
    }

    /// Upload a profile picture as `<avatars>/<user>-<millis>.<ext>`.
    ///
    /// Always writes a new object; existing avatars are never overwritten.
    pub async fn upload_avatar(
        &self,
        user_id: &str,
        file: UploadFile,
        access_token: Option<&str>,
    ) -> Result<UploadResult, ServiceError> {
        validate_image(&file.content_type, file.bytes.len())?;

        let path = format!(
            "{}/{}-{}.{}",
            self.avatars_folder,
            user_id,
            chrono::Utc::now().timestamp_millis(),
            file.extension()
        );
        let path = self
            .upload(&path, file.bytes, &file.content_type, false, access_token)
            .await?;
        let url = self.public_url(&path);
        Ok(UploadResult { path, url })
    }

    /// Upload any file into `folder` under a generated unique name, replacing
    /// an object of the same name.
    pub async fn upload_file(
        &self,
        folder: &str,
        file: UploadFile,
        access_token: Option<&str>,
    ) -> Result<UploadResult, ServiceError> {
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let path = format!(
            "{}/{}-{}.{}",
            folder.trim_matches('/'),
            chrono::Utc::now().timestamp_millis(),
            &unique[..13],
            file.extension()
        );
        let path = self
            .upload(&path, file.bytes, &file.content_type, true, access_token)
            .await?;
        let url = self.public_url(&path);
        Ok(UploadResult { path, url })
    }

    /// Delete objects by path.
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn remove(
        &self,
        paths: &[String],
        access_token: Option<&str>,
    ) -> Result<(), ServiceError> {
        if paths.is_empty() {
            return Ok(());
        }
        let url = self.backend.storage_url(&format!("object/{}", self.bucket));
        let response = self
            .backend
            .request(Method::DELETE, &url, access_token)
            .json(&serde_json::json!({ "prefixes": paths }))
            .send()
            .await?;

        self.backend.handle_empty(response).await
    }
}
