//! File persistence for generated images.
//!
//! Writes decoded image bytes under an absolute save directory, creating
//! it if needed and sanitizing the caller-supplied filename first.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Strip every character outside `[A-Za-z0-9._-]` from a filename.
///
/// The sanitized name, not the caller-supplied one, determines the final
/// path, which keeps path separators and shell metacharacters out of the
/// save directory join.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Write `bytes` to `save_dir/<sanitized name>` and return the full path.
///
/// Creates `save_dir` recursively if absent; silently overwrites an
/// existing file at the target path.
pub async fn save(bytes: &[u8], name: &str, save_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(save_dir).await?;
    let sanitized = sanitize_filename(name);
    let full_path = save_dir.join(sanitized);
    tokio::fs::write(&full_path, bytes).await?;
    Ok(full_path)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Sanitized names contain only the allowed character set, so a
        /// join onto the save directory can never traverse out of it.
        #[test]
        fn sanitized_name_stays_in_save_dir(name in ".{0,64}") {
            let sanitized = sanitize_filename(&name);
            prop_assert!(sanitized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
            prop_assert!(!sanitized.contains('/'));
            prop_assert!(!sanitized.contains('\\'));

            let base = Path::new("/srv/public/out");
            let joined = base.join(&sanitized);
            prop_assert!(joined.starts_with(base));
        }

        /// Sanitization is idempotent.
        #[test]
        fn sanitize_is_idempotent(name in ".{0,64}") {
            let once = sanitize_filename(&name);
            prop_assert_eq!(sanitize_filename(&once), once);
        }
    }
}
