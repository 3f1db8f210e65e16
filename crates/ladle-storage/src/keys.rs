//! Shared key derivation for recipe assets.
//!
//! Key format: `{recipe_id}/images/{token}-{filename}`. The random token
//! keeps keys distinct even when one draft attaches the same filename twice,
//! and the recipe-id prefix groups every blob of one recipe under a single
//! namespace before the relational row exists.

use ladle_core::RecipeId;
use uuid::Uuid;

const MAX_FILENAME_LEN: usize = 100;

/// Derive the storage key for one attachment of the given recipe.
///
/// All backends must receive keys in this format for consistency.
pub fn asset_key(recipe_id: RecipeId, filename: &str) -> String {
    let token = Uuid::new_v4().simple();
    format!(
        "{}/images/{}-{}",
        recipe_id,
        token,
        sanitize_filename(filename)
    )
}

/// Strip path components and unsafe characters from a client filename.
///
/// The result contains only ASCII alphanumerics, `.`, `_`, and `-`, never
/// contains `..`, and is capped at [`MAX_FILENAME_LEN`] characters (truncated
/// from the front so the extension survives).
pub fn sanitize_filename(filename: &str) -> String {
    // Client filenames may carry directory components; only the final
    // segment matters.
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let mut sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    // Backends reject keys containing "..".
    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }

    if sanitized.len() > MAX_FILENAME_LEN {
        sanitized = sanitized
            .chars()
            .skip(sanitized.len() - MAX_FILENAME_LEN)
            .collect();
    }

    if sanitized.is_empty() || sanitized == "." {
        return "file".to_string();
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_prefixed_by_recipe_namespace() {
        let id = RecipeId::allocate();
        let key = asset_key(id, "soup.jpg");
        assert!(key.starts_with(&format!("{}/images/", id)));
        assert!(key.ends_with("-soup.jpg"));
    }

    #[test]
    fn identical_filenames_never_collide() {
        let id = RecipeId::allocate();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let key = asset_key(id, "soup.jpg");
            assert!(seen.insert(key), "duplicate storage key generated");
        }
    }

    #[test]
    fn sanitize_drops_directory_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\soup.jpg"), "soup.jpg");
        assert_eq!(sanitize_filename("photos/soup.jpg"), "soup.jpg");
    }

    #[test]
    fn sanitize_filters_unsafe_characters() {
        assert_eq!(sanitize_filename("my soup photo.jpg"), "mysoupphoto.jpg");
        assert_eq!(sanitize_filename("soup?*|.jpg"), "soup.jpg");
    }

    #[test]
    fn sanitize_collapses_dot_dot_sequences() {
        let sanitized = sanitize_filename("a..b...jpg");
        assert!(!sanitized.contains(".."));
    }

    #[test]
    fn sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("汤汤汤"), "file");
        assert_eq!(sanitize_filename("."), "file");
    }

    #[test]
    fn sanitize_caps_length_keeping_extension() {
        let long = format!("{}.jpg", "x".repeat(300));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.len(), MAX_FILENAME_LEN);
        assert!(sanitized.ends_with(".jpg"));
    }

    #[test]
    fn derived_keys_are_valid_for_backends() {
        let id = RecipeId::allocate();
        let key = asset_key(id, "../../../etc/passwd");
        assert!(!key.contains(".."));
        assert!(!key.starts_with('/'));
    }
}
