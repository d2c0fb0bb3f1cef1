//! Request handler for the `create_image` tool.
//!
//! Runs the full pipeline for one request: validate parameters, assemble
//! the prompt, dispatch generate-or-edit to the backend, persist the
//! decoded image under the target project's public directory, and shape
//! the JSON result descriptor.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::openai::{load_reference_images, ImageBackend, ImagePayload};
use crate::params::{CreateImageParams, ImageOperation};
use crate::prompt::build_prompt;
use crate::storage;

/// Result descriptor returned as the tool's JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct CreateImageResult {
    pub ok: bool,
    /// Path of the written file, relative to the public directory
    pub path: String,
    /// Size of the decoded image in bytes
    pub bytes: usize,
    /// Model actually used for the call
    pub model: String,
    /// Final assembled prompt sent to the backend
    pub prompt: String,
    /// Prompt as revised by the model, when reported
    pub revised_prompt: Option<String>,
    /// "generate" or "edit"
    pub operation: String,
    /// The caller's reference image paths, echoed verbatim
    #[serde(rename = "referenceImages")]
    pub reference_images: Vec<String>,
}

/// Image request handler.
///
/// The backend is injected so tests can substitute a stub without
/// patching process-wide state.
pub struct ImageHandler {
    backend: Arc<dyn ImageBackend>,
}

impl ImageHandler {
    /// Create a handler over the given backend.
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self { backend }
    }

    /// Run one `create_image` request end to end.
    ///
    /// # Errors
    /// - `Error::Validation` if the parameters are invalid (no side effects)
    /// - `Error::ReferenceImage` if a reference image cannot be read
    /// - `Error::Api` / `Error::MissingImageData` on backend failures
    /// - `Error::Io` on persistence failures
    #[instrument(level = "info", name = "create_image", skip_all, fields(operation = params.operation().as_str()))]
    pub async fn create_image(&self, params: CreateImageParams) -> Result<CreateImageResult> {
        params.validate().map_err(Error::Validation)?;

        let final_prompt = build_prompt(
            &params.prompt,
            params.brand_signature.as_deref(),
            params.style_definition_json.as_ref(),
        );
        debug!(prompt_len = final_prompt.len(), "Assembled final prompt");

        let base_dir = base_dir(&params);
        let operation = params.operation();

        let payload = self
            .dispatch(&params, operation, &final_prompt, &base_dir)
            .await?;

        let image_bytes = BASE64
            .decode(payload.b64_json.as_bytes())
            .map_err(|_| Error::MissingImageData)?;

        let relative_path = self.persist(&params, &base_dir, &image_bytes).await?;

        info!(
            path = %relative_path,
            bytes = image_bytes.len(),
            model = operation.model_str(),
            "Image saved"
        );

        Ok(CreateImageResult {
            ok: true,
            path: relative_path,
            bytes: image_bytes.len(),
            model: operation.model_str().to_string(),
            prompt: final_prompt,
            revised_prompt: payload.revised_prompt,
            operation: operation.as_str().to_string(),
            reference_images: params.reference_images().to_vec(),
        })
    }

    /// Call generate or edit based on the derived operation.
    async fn dispatch(
        &self,
        params: &CreateImageParams,
        operation: ImageOperation,
        final_prompt: &str,
        base_dir: &Path,
    ) -> Result<ImagePayload> {
        match operation {
            ImageOperation::Edit => {
                if params.model.as_str() != operation.model_str() {
                    debug!(
                        requested = params.model.as_str(),
                        pinned = operation.model_str(),
                        "Overriding requested model for edit operation"
                    );
                }
                let images =
                    load_reference_images(base_dir, params.reference_images()).await?;
                self.backend
                    .edit(final_prompt, &images, params.background)
                    .await
            }
            ImageOperation::Generate { model } => {
                self.backend
                    .generate(
                        model.as_str(),
                        final_prompt,
                        params.size,
                        params.quality,
                        params.background,
                    )
                    .await
            }
        }
    }

    /// Write the decoded image and return its path relative to the public
    /// directory.
    async fn persist(
        &self,
        params: &CreateImageParams,
        base_dir: &Path,
        image_bytes: &[u8],
    ) -> Result<String> {
        let filename = params
            .filename
            .clone()
            .unwrap_or_else(|| format!("img_{}.png", unix_millis()));
        let output_path = params.output_path.as_deref().unwrap_or("");

        let public_dir = base_dir.join("public");
        let save_dir = public_dir.join(output_path);
        let full_path = storage::save(image_bytes, &filename, &save_dir).await?;

        let relative = full_path
            .strip_prefix(&public_dir)
            .unwrap_or(&full_path)
            .to_path_buf();
        Ok(path_to_string(&relative))
    }
}

/// Base directory for this request: the target project dir, or the
/// server's working directory as a fallback.
fn base_dir(params: &CreateImageParams) -> PathBuf {
    params
        .target_project_dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn path_to_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
