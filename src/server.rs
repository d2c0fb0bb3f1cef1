//! MCP server implementation for the image server.
//!
//! Exposes a single `create_image` tool plus two static documentation
//! resources. The OpenAI-backed handler is constructed lazily on the
//! first tool call so that a missing API key keeps the protocol
//! connection alive and is reported as a tool error instead.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::{
    model::{
        CallToolResult, Content, ListResourcesResult, ReadResourceResult, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    ErrorData as McpError, ServerHandler,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::Error;
use crate::handler::ImageHandler;
use crate::openai::{ImageBackend, OpenAiClient};
use crate::params::CreateImageParams;
use crate::resources;

/// Name of the single tool this server exposes.
pub const CREATE_IMAGE_TOOL: &str = "create_image";

const CREATE_IMAGE_DESCRIPTION: &str =
    "Generates an image using OpenAI (DALL-E 3 / gpt-image-1) based on a detailed text prompt. \
     For best results, provide vivid descriptions incorporating style, composition, lighting, \
     and mood. Can also edit or combine existing images by providing referenceImagePaths. \
     Refer to 'docs/prompt-recipes.md' for extensive examples, templates, and tips for various \
     image types (hero backgrounds, icons, illustrations, photos). Key parameters include \
     'prompt', 'brandSignature' (use project palette), 'size' (e.g., 1024x1024, 1536x1024), \
     'quality', 'model', 'filename', 'outputPath', 'targetProjectDir', and \
     'referenceImagePaths' (for editing/combining images).";

/// MCP server for image generation.
#[derive(Clone)]
pub struct ImageServer {
    /// Handler for image requests, created on first use
    handler: Arc<RwLock<Option<ImageHandler>>>,
}

impl ImageServer {
    /// Create a server whose handler is initialized lazily from the
    /// environment on the first tool call.
    pub fn new() -> Self {
        Self {
            handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a server over an explicit backend, bypassing the lazy
    /// configuration path. Used by tests to inject a stub backend.
    pub fn with_backend(backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            handler: Arc::new(RwLock::new(Some(ImageHandler::new(backend)))),
        }
    }

    /// Initialize the handler if it has not been created yet.
    ///
    /// Reads the API key from the environment; created at most once and
    /// reused for the lifetime of the process.
    async fn ensure_handler(&self) -> Result<(), Error> {
        let mut handler = self.handler.write().await;
        if handler.is_none() {
            let config = Config::from_env()?;
            info!("OpenAI client initialized");
            *handler = Some(ImageHandler::new(Arc::new(OpenAiClient::new(&config))));
        }
        Ok(())
    }

    /// Run the `create_image` tool.
    ///
    /// Validation failures are escalated as protocol-level invalid-params
    /// errors; every other failure is returned as a tool error result
    /// with a descriptive message.
    pub async fn create_image(
        &self,
        params: CreateImageParams,
    ) -> Result<CallToolResult, McpError> {
        if let Err(e) = self.ensure_handler().await {
            error!(error = %e, "Failed to initialize OpenAI client");
            return Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to create image: {e}"
            ))]));
        }

        let handler_guard = self.handler.read().await;
        let handler = handler_guard
            .as_ref()
            .ok_or_else(|| McpError::internal_error("Handler not initialized", None))?;

        match handler.create_image(params).await {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result).map_err(|e| {
                    McpError::internal_error(format!("Failed to serialize result: {e}"), None)
                })?;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(Error::Validation(errors)) => Err(McpError::invalid_params(
                Error::Validation(errors.clone()).to_string(),
                serde_json::to_value(&errors).ok(),
            )),
            Err(e) => {
                error!(error = %e, "create_image tool error");
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "Failed to create image: {e}"
                ))]))
            }
        }
    }
}

impl Default for ImageServer {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image generation server using the OpenAI image API. \
                 Use create_image to generate an image from a text prompt, or to edit and \
                 combine existing images by passing referenceImagePaths."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_
    {
        async move {
            use rmcp::model::{ListToolsResult, Tool};
            use schemars::schema_for;

            let schema = schema_for!(CreateImageParams);
            let schema_value = serde_json::to_value(&schema).unwrap_or_default();
            let input_schema = match schema_value {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

            Ok(ListToolsResult {
                tools: vec![Tool {
                    name: Cow::Borrowed(CREATE_IMAGE_TOOL),
                    description: Some(Cow::Borrowed(CREATE_IMAGE_DESCRIPTION)),
                    input_schema,
                    annotations: None,
                    icons: None,
                    meta: None,
                    output_schema: None,
                    title: None,
                }],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match params.name.as_ref() {
                CREATE_IMAGE_TOOL => {
                    let tool_params: CreateImageParams = params
                        .arguments
                        .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
                        .transpose()
                        .map_err(|e| {
                            McpError::invalid_params(format!("Invalid parameters: {e}"), None)
                        })?
                        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;

                    self.create_image(tool_params).await
                }
                _ => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", params.name),
                    None,
                )),
            }
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing resources");

            let prompt_recipes = rmcp::model::Resource {
                raw: rmcp::model::RawResource {
                    uri: resources::PROMPT_RECIPES_URI.to_string(),
                    name: "Prompt Recipes for Image Generation".to_string(),
                    title: None,
                    description: Some(
                        "Prompt examples, templates, and tips for various image types".to_string(),
                    ),
                    mime_type: Some("text/markdown".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                },
                annotations: None,
            };

            let readme = rmcp::model::Resource {
                raw: rmcp::model::RawResource {
                    uri: resources::README_URI.to_string(),
                    name: "Image MCP Server Documentation".to_string(),
                    title: None,
                    description: Some("Server usage and parameter documentation".to_string()),
                    mime_type: Some("text/markdown".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                },
                annotations: None,
            };

            Ok(ListResourcesResult {
                resources: vec![prompt_recipes, readme],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let uri = &params.uri;
            debug!(uri = %uri, "Reading resource");

            let content = resources::resource_text(uri).ok_or_else(|| {
                McpError::resource_not_found(format!("Unknown resource: {uri}"), None)
            })?;

            Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(content, uri.clone())],
            })
        }
    }
}
