//! OpenAI Image MCP Server
//!
//! This library exposes OpenAI image generation and multi-image editing
//! as a single `create_image` tool over the model-context protocol.

pub mod config;
pub mod error;
pub mod handler;
pub mod openai;
pub mod params;
pub mod prompt;
pub mod resources;
pub mod serve;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::{ConfigError, Error, Result, ValidationError};
pub use handler::{CreateImageResult, ImageHandler};
pub use openai::{ImageBackend, ImagePayload, OpenAiClient, ReferenceImage};
pub use params::{CreateImageParams, ImageOperation, EDIT_MODEL};
pub use server::ImageServer;
