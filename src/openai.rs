//! OpenAI image API client.
//!
//! This module provides the `ImageBackend` trait used by the request
//! handler, the `OpenAiClient` implementation over `reqwest`, and the
//! reference-image loading helpers used by edit operations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::params::{Background, ImageQuality, ImageSize, EDIT_MODEL};

/// A single image returned by the API.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Base64-encoded image data
    pub b64_json: String,
    /// Prompt as revised by the model, when reported
    pub revised_prompt: Option<String>,
}

/// A reference image loaded from disk for an edit operation.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// Basename used for the multipart file part
    pub filename: String,
    /// MIME type inferred from the file extension
    pub mime_type: &'static str,
}

/// Backend seam for image generation and editing.
///
/// The production implementation is [`OpenAiClient`]; tests substitute a
/// recording stub without touching any global state.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Text-to-image generation.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        size: ImageSize,
        quality: ImageQuality,
        background: Background,
    ) -> Result<ImagePayload>;

    /// Multi-image edit. Always uses the fixed edit-capable model; size is
    /// not applicable to edit calls.
    async fn edit(
        &self,
        prompt: &str,
        images: &[ReferenceImage],
        background: Background,
    ) -> Result<ImagePayload>;
}

/// Infer a MIME type from a file extension, defaulting to PNG.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Load every reference image relative to `<base_dir>/public`.
///
/// Reads run concurrently; the returned list preserves input order so it
/// corresponds one-to-one with the caller's paths. Any single failure
/// aborts the whole load with an error naming the offending path.
pub async fn load_reference_images(
    base_dir: &Path,
    paths: &[String],
) -> Result<Vec<ReferenceImage>> {
    let public_dir = base_dir.join("public");
    try_join_all(paths.iter().map(|rel| {
        let full_path: PathBuf = public_dir.join(rel);
        async move {
            debug!(path = %full_path.display(), "Loading reference image");
            let bytes = tokio::fs::read(&full_path)
                .await
                .map_err(|e| Error::reference_image(rel, e.to_string()))?;
            let filename = full_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image.png")
                .to_string();
            Ok(ReferenceImage {
                mime_type: mime_type_for_path(&full_path),
                bytes,
                filename,
            })
        }
    }))
    .await
}

/// OpenAI image API client.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl OpenAiClient {
    /// Create a client from the loaded configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn read_payload(endpoint: &str, response: reqwest::Response) -> Result<ImagePayload> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(endpoint, status.as_u16(), body));
        }

        let api_response: ImagesResponse = response.json().await.map_err(|e| {
            Error::api(endpoint, status.as_u16(), format!("Failed to parse response: {e}"))
        })?;

        let datum = api_response
            .data
            .into_iter()
            .next()
            .ok_or(Error::MissingImageData)?;
        let b64_json = datum.b64_json.ok_or(Error::MissingImageData)?;

        Ok(ImagePayload {
            b64_json,
            revised_prompt: datum.revised_prompt,
        })
    }
}

#[async_trait]
impl ImageBackend for OpenAiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        size: ImageSize,
        quality: ImageQuality,
        background: Background,
    ) -> Result<ImagePayload> {
        let endpoint = self.endpoint("images/generations");
        debug!(endpoint = %endpoint, model, "Calling images/generations");

        let request = GenerationsRequest {
            model,
            prompt,
            n: 1,
            size: size.as_str(),
            quality: quality.as_str(),
            background: background.as_str(),
        };

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {e}")))?;

        Self::read_payload(&endpoint, response).await
    }

    async fn edit(
        &self,
        prompt: &str,
        images: &[ReferenceImage],
        background: Background,
    ) -> Result<ImagePayload> {
        let endpoint = self.endpoint("images/edits");
        debug!(endpoint = %endpoint, count = images.len(), "Calling images/edits");

        let mut form = reqwest::multipart::Form::new()
            .text("model", EDIT_MODEL)
            .text("prompt", prompt.to_string())
            .text("background", background.as_str())
            .text("n", "1");
        for image in images {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.filename.clone())
                .mime_str(image.mime_type)
                .map_err(|e| Error::api(&endpoint, 0, format!("Invalid MIME type: {e}")))?;
            form = form.part("image[]", part);
        }

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {e}")))?;

        Self::read_payload(&endpoint, response).await
    }
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// OpenAI images/generations request body.
#[derive(Debug, Serialize)]
struct GenerationsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'a str,
    background: &'a str,
}

/// OpenAI images API response (shared by generations and edits).
#[derive(Debug, Deserialize)]
pub struct ImagesResponse {
    /// Generated image data
    pub data: Vec<ImageDatum>,
}

/// A single generated image in the API response.
#[derive(Debug, Deserialize)]
pub struct ImageDatum {
    /// Base64-encoded image data
    pub b64_json: Option<String>,
    /// Prompt as revised by the model
    pub revised_prompt: Option<String>,
}
