//! Static documentation resources for the image server.
//!
//! Two markdown resources are exposed over MCP:
//! - `docs/prompt-recipes` - prompt examples and templates
//! - `docs/readme` - server documentation
//!
//! Each is sourced from a file discovered through an ordered list of
//! candidate locations, with an embedded fallback that is always present.

use std::path::PathBuf;

use tracing::debug;

/// URI of the prompt recipes resource.
pub const PROMPT_RECIPES_URI: &str = "docs/prompt-recipes";

/// URI of the readme resource.
pub const README_URI: &str = "docs/readme";

/// Environment variable naming an explicit docs prefix, tried first.
pub const DOCS_DIR_ENV: &str = "IMAGE_MCP_DOCS_DIR";

/// Embedded fallback for the prompt recipes resource.
const EMBEDDED_PROMPT_RECIPES: &str = "\
# Prompt Recipes for Image Generation

This is embedded documentation for the image MCP server. The server could not
find the prompt-recipes.md file, so it is providing this embedded version
instead.

## Basic Prompt Structure

A good prompt should include:
1. Subject description (what/who)
2. Style details (photorealistic, cartoon, etc.)
3. Lighting and mood
4. Technical specifications (if needed)

## Examples

### Icon Design
\"A minimalist cloud icon with subtle gradient, clean lines, professional tech \
style, light blue color scheme\"

### Photorealistic Portrait
\"Professional headshot of a middle-aged business executive, neutral \
expression, studio lighting, high-end DSLR quality, shallow depth of field\"

### Background/Hero Image
\"Abstract technology background with blue and purple gradient, subtle digital \
patterns, modern and clean design, suitable for header/hero section\"

### Product Visualization
\"3D render of a sleek smartphone on a minimalist surface, dramatic lighting \
from top-right, professional product photography style\"
";

/// Embedded fallback for the readme resource.
const EMBEDDED_README: &str = "\
# Image MCP Server

This MCP server provides image generation capabilities using OpenAI's API.

## Usage

The server provides the `create_image` tool for generating images from text
prompts.

Key parameters:
- prompt: Text description of the desired image
- model: OpenAI model to use (gpt-image-1, dall-e-3, dall-e-2)
- size: Image dimensions (1024x1024, 1024x1536, 1536x1024)
- quality: Image quality (low, medium, high)
- background: Type of background (transparent, opaque)
";

/// Candidate roots probed for a documentation file, in order.
fn candidate_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(prefix) = std::env::var(DOCS_DIR_ENV) {
        if !prefix.trim().is_empty() {
            roots.push(PathBuf::from(prefix));
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }

    // Installed layouts: next to the binary, or two levels up from
    // target/<profile>/ back to the repository root.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            roots.push(dir.to_path_buf());
            if let Some(grandparent) = dir.parent().and_then(|p| p.parent()) {
                roots.push(grandparent.to_path_buf());
            }
        }
    }

    roots
}

/// Locate a documentation file by trying each candidate root in order.
fn find_resource(relative: &str) -> Option<PathBuf> {
    for root in candidate_roots() {
        let candidate = root.join(relative);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Found resource file");
            return Some(candidate);
        }
    }
    debug!(relative, "Resource file not found, using embedded fallback");
    None
}

/// Read a resource file with an embedded fallback as the last strategy.
fn read_with_fallback(relative: &str, fallback: &str) -> String {
    find_resource(relative)
        .and_then(|path| std::fs::read_to_string(path).ok())
        .unwrap_or_else(|| fallback.to_string())
}

/// Markdown text of the prompt recipes resource.
pub fn prompt_recipes_text() -> String {
    read_with_fallback("docs/prompt-recipes.md", EMBEDDED_PROMPT_RECIPES)
}

/// Markdown text of the readme resource.
pub fn readme_text() -> String {
    read_with_fallback("README.md", EMBEDDED_README)
}

/// Text for a resource URI, if it is one of ours.
pub fn resource_text(uri: &str) -> Option<String> {
    match uri {
        PROMPT_RECIPES_URI => Some(prompt_recipes_text()),
        README_URI => Some(readme_text()),
        _ => None,
    }
}
