//! Prompt assembly for the `create_image` tool.
//!
//! Concatenates the user prompt with optional branding and style blocks
//! in a fixed order. Pure function, no hidden state.

/// Delimiter preceding the brand signature block.
pub const BRAND_DELIMITER: &str = "--- BRAND SIGNATURE ---";

/// Delimiter preceding the style definition block.
pub const STYLE_DELIMITER: &str = "--- STYLE DEFINITION (JSON) ---";

/// Build the final prompt sent to the backend.
///
/// Order is fixed: user prompt, then brand block, then style block.
/// A blank brand signature or an empty style map is treated as absent
/// and omitted entirely.
pub fn build_prompt(
    user: &str,
    brand_signature: Option<&str>,
    style_definition: Option<&serde_json::Map<String, serde_json::Value>>,
) -> String {
    let mut final_prompt = user.to_string();

    if let Some(sig) = brand_signature {
        if !sig.trim().is_empty() {
            final_prompt.push_str("\n\n");
            final_prompt.push_str(BRAND_DELIMITER);
            final_prompt.push('\n');
            final_prompt.push_str(sig);
        }
    }

    if let Some(style) = style_definition {
        if !style.is_empty() {
            let style_json = serde_json::to_string_pretty(style)
                .unwrap_or_else(|_| "{}".to_string());
            final_prompt.push_str("\n\n");
            final_prompt.push_str(STYLE_DELIMITER);
            final_prompt.push('\n');
            final_prompt.push_str(&style_json);
        }
    }

    final_prompt
}
