//! Input schema for the `create_image` tool.
//!
//! `CreateImageParams` is the validated request shape: serde applies the
//! documented defaults during deserialization, `validate` collects every
//! remaining violation, and `operation` derives the generate-vs-edit
//! branch exactly once from the validated input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum prompt length in characters.
pub const MIN_PROMPT_LENGTH: usize = 3;

/// Model always used for edit operations, regardless of the requested model.
pub const EDIT_MODEL: &str = "gpt-image-1";

/// Image dimensions supported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1024x1536")]
    Portrait,
    #[serde(rename = "1536x1024")]
    Landscape,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square => "1024x1024",
            ImageSize::Portrait => "1024x1536",
            ImageSize::Landscape => "1536x1024",
        }
    }
}

/// Image quality setting. `Auto` lets the model choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Low,
    #[default]
    Medium,
    High,
    Auto,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Low => "low",
            ImageQuality::Medium => "medium",
            ImageQuality::High => "high",
            ImageQuality::Auto => "auto",
        }
    }
}

/// Background type. `Transparent` requires PNG/WEBP output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    Transparent,
    #[default]
    Opaque,
}

impl Background {
    pub fn as_str(&self) -> &'static str {
        match self {
            Background::Transparent => "transparent",
            Background::Opaque => "opaque",
        }
    }
}

/// OpenAI model used for plain generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
pub enum ImageModel {
    #[default]
    #[serde(rename = "gpt-image-1")]
    GptImage1,
    #[serde(rename = "dall-e-3")]
    DallE3,
    #[serde(rename = "dall-e-2")]
    DallE2,
}

impl ImageModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageModel::GptImage1 => "gpt-image-1",
            ImageModel::DallE3 => "dall-e-3",
            ImageModel::DallE2 => "dall-e-2",
        }
    }
}

/// Parameters for the `create_image` tool.
///
/// Unknown fields are ignored; enum mismatches fail at deserialization
/// and surface as protocol-level invalid-params errors.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageParams {
    /// Detailed text description of the desired image (at least 3 characters).
    pub prompt: String,

    /// Optional branding guidelines (e.g., "palette:#...; font:...").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_signature: Option<String>,

    /// Optional structured style description, serialized into the prompt as
    /// indented JSON.
    #[serde(
        rename = "styleDefinitionJSON",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub style_definition_json: Option<serde_json::Map<String, serde_json::Value>>,

    /// Image dimensions (default: 1024x1024).
    #[serde(default)]
    pub size: ImageSize,

    /// Image quality (default: medium). "auto" lets the model choose.
    #[serde(default)]
    pub quality: ImageQuality,

    /// Background type (default: opaque). "transparent" requires PNG/WEBP format.
    #[serde(default)]
    pub background: Background,

    /// OpenAI model to use (default: gpt-image-1). Pinned to gpt-image-1
    /// when reference images are supplied.
    #[serde(default)]
    pub model: ImageModel,

    /// Suggested filename for the saved image (e.g., "logo.png").
    /// Include the extension. Defaults to a timestamp-based name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Subdirectory within the target project's public folder to save the
    /// image (e.g., "icons").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    /// Absolute path to the target project directory where the image should
    /// be saved. Defaults to the server's working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_project_dir: Option<String>,

    /// Optional array of image paths (relative to the target project's
    /// public folder) to use as references for editing or combining images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image_paths: Option<Vec<String>>,
}

/// The backend operation derived once from the validated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOperation {
    /// Plain text-to-image generation with the requested model.
    Generate { model: ImageModel },
    /// Multi-image edit; the model is pinned to [`EDIT_MODEL`].
    Edit,
}

impl ImageOperation {
    /// Response label for the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageOperation::Generate { .. } => "generate",
            ImageOperation::Edit => "edit",
        }
    }

    /// Model actually sent to the backend.
    pub fn model_str(&self) -> &'static str {
        match self {
            ImageOperation::Generate { model } => model.as_str(),
            ImageOperation::Edit => EDIT_MODEL,
        }
    }
}

impl CreateImageParams {
    /// Validate the parameters, collecting every violation.
    ///
    /// # Returns
    /// - `Ok(())` if all parameters are valid
    /// - `Err(Vec<ValidationError>)` with one entry per violated field
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.prompt.chars().count() < MIN_PROMPT_LENGTH {
            errors.push(ValidationError::new(
                "prompt",
                format!("String must contain at least {MIN_PROMPT_LENGTH} character(s)"),
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Reference image paths, empty when none were supplied.
    pub fn reference_images(&self) -> &[String] {
        self.reference_image_paths.as_deref().unwrap_or_default()
    }

    /// Derive the backend operation from the input shape: any reference
    /// images force an edit and pin the model.
    pub fn operation(&self) -> ImageOperation {
        if self.reference_images().is_empty() {
            ImageOperation::Generate { model: self.model }
        } else {
            ImageOperation::Edit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CreateImageParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let params = parse(r#"{"prompt": "a cat"}"#);
        assert_eq!(params.size, ImageSize::Square);
        assert_eq!(params.quality, ImageQuality::Medium);
        assert_eq!(params.background, Background::Opaque);
        assert_eq!(params.model, ImageModel::GptImage1);
        assert!(params.brand_signature.is_none());
        assert!(params.style_definition_json.is_none());
        assert!(params.filename.is_none());
        assert!(params.output_path.is_none());
        assert!(params.target_project_dir.is_none());
        assert!(params.reference_image_paths.is_none());
    }

    #[test]
    fn test_revalidation_is_a_noop() {
        // Defaults are applied exactly once; a round-tripped request parses
        // and validates identically.
        let params = parse(r#"{"prompt": "a cat"}"#);
        let json = serde_json::to_string(&params).unwrap();
        let reparsed = parse(&json);
        assert!(reparsed.validate().is_ok());
        assert_eq!(reparsed.size, params.size);
        assert_eq!(reparsed.quality, params.quality);
        assert_eq!(reparsed.model, params.model);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let params = parse(r#"{"prompt": "a cat", "totallyUnknown": 42}"#);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_short_prompt_cites_prompt_field() {
        let params = parse(r#"{"prompt": "ab"}"#);
        let errors = params.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "prompt");
        assert!(errors[0].message.contains("3"));
    }

    #[test]
    fn test_invalid_size_rejected_at_parse() {
        let result: Result<CreateImageParams, _> =
            serde_json::from_str(r#"{"prompt": "a cat", "size": "512x512"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_wire_names() {
        let params = parse(
            r#"{"prompt": "a cat", "size": "1536x1024", "quality": "auto",
                "background": "transparent", "model": "dall-e-3"}"#,
        );
        assert_eq!(params.size, ImageSize::Landscape);
        assert_eq!(params.quality, ImageQuality::Auto);
        assert_eq!(params.background, Background::Transparent);
        assert_eq!(params.model, ImageModel::DallE3);
        assert_eq!(params.size.as_str(), "1536x1024");
    }

    #[test]
    fn test_camel_case_field_names() {
        let params = parse(
            r#"{"prompt": "a cat",
                "brandSignature": "palette:#000",
                "styleDefinitionJSON": {"mood": "calm"},
                "outputPath": "icons",
                "targetProjectDir": "/tmp/project",
                "referenceImagePaths": ["a.png"]}"#,
        );
        assert_eq!(params.brand_signature.as_deref(), Some("palette:#000"));
        assert!(params.style_definition_json.is_some());
        assert_eq!(params.output_path.as_deref(), Some("icons"));
        assert_eq!(params.target_project_dir.as_deref(), Some("/tmp/project"));
        assert_eq!(params.reference_images(), ["a.png"]);
    }

    #[test]
    fn test_operation_generate_without_references() {
        let params = parse(r#"{"prompt": "a cat", "model": "dall-e-3"}"#);
        let op = params.operation();
        assert_eq!(op, ImageOperation::Generate { model: ImageModel::DallE3 });
        assert_eq!(op.as_str(), "generate");
        assert_eq!(op.model_str(), "dall-e-3");
    }

    #[test]
    fn test_operation_generate_with_empty_reference_list() {
        let params = parse(r#"{"prompt": "a cat", "referenceImagePaths": []}"#);
        assert!(matches!(params.operation(), ImageOperation::Generate { .. }));
    }

    #[test]
    fn test_references_force_edit_and_pin_model() {
        let params = parse(
            r#"{"prompt": "a cat", "model": "dall-e-3",
                "referenceImagePaths": ["base.png"]}"#,
        );
        let op = params.operation();
        assert_eq!(op, ImageOperation::Edit);
        assert_eq!(op.as_str(), "edit");
        assert_eq!(op.model_str(), EDIT_MODEL);
    }

    #[test]
    fn test_missing_prompt_rejected_at_parse() {
        let result: Result<CreateImageParams, _> = serde_json::from_str(r#"{}"#);
        assert!(result.is_err());
    }
}
