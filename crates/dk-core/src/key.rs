use std::path::{Path, PathBuf};

use crate::error::InvalidKeyError;

/// File suffix for card files on disk.
pub const CARD_FILE_SUFFIX: &str = ".card.md";

/// Normalize a user-supplied slug into a canonical card key.
///
/// Backslashes become forward slashes and boundary slashes are stripped
/// before validation, so `\a\b\` and `a/b` normalize to the same key.
pub fn normalize_slug(input: &str) -> Result<String, InvalidKeyError> {
    let cleaned = input.replace('\\', "/");
    let cleaned = cleaned.trim_matches('/');
    validate_key(input, cleaned)?;
    Ok(cleaned.to_string())
}

/// Validate an already-canonical full key.
///
/// Unlike [`normalize_slug`], no cleanup is applied: a key that needs
/// normalization is rejected as-is.
pub fn parse_full_key(input: &str) -> Result<String, InvalidKeyError> {
    validate_key(input, input)?;
    Ok(input.to_string())
}

/// Absolute path of the card file for `key` under `dir`.
pub fn card_file_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}{CARD_FILE_SUFFIX}"))
}

/// Derive the key a card file's location implies: the path relative to
/// `dir`, forward-slash normalized, minus the `.card.md` suffix.
///
/// Returns `None` when `path` is outside `dir` or not a card file.
pub fn key_from_file_path(dir: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(dir).ok()?;
    let rel = rel.to_string_lossy().replace('\\', "/");
    rel.strip_suffix(CARD_FILE_SUFFIX).map(str::to_string)
}

fn validate_key(original: &str, key: &str) -> Result<(), InvalidKeyError> {
    if key.is_empty() {
        return Err(InvalidKeyError::new(original, "key is empty"));
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(InvalidKeyError::new(original, "leading or trailing slash"));
    }
    if key.contains('\\') {
        return Err(InvalidKeyError::new(original, "backslash in key"));
    }
    for segment in key.split('/') {
        if segment.is_empty() {
            return Err(InvalidKeyError::new(original, "empty path segment"));
        }
        if segment == "." || segment == ".." {
            return Err(InvalidKeyError::new(original, "relative path segment"));
        }
        if segment.contains(':') {
            return Err(InvalidKeyError::new(original, "drive letter or colon in key"));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(InvalidKeyError::new(original, "character outside [A-Za-z0-9._-]"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_plain_and_nested_slugs() {
        assert_eq!(normalize_slug("hello").unwrap(), "hello");
        assert_eq!(normalize_slug("auth/login-flow").unwrap(), "auth/login-flow");
        assert_eq!(normalize_slug("v1.2/api_notes").unwrap(), "v1.2/api_notes");
    }

    #[test]
    fn normalize_converts_backslashes_and_strips_boundary_slashes() {
        assert_eq!(normalize_slug("\\auth\\login\\").unwrap(), "auth/login");
        assert_eq!(normalize_slug("/hello/").unwrap(), "hello");
    }

    #[test]
    fn normalize_rejects_bad_keys() {
        for bad in ["", "/", "a//b", "..", "a/../b", ".", "C:/cards", "a b", "café"] {
            assert!(normalize_slug(bad).is_err(), "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn parse_full_key_is_strict() {
        assert_eq!(parse_full_key("auth/login").unwrap(), "auth/login");
        assert!(parse_full_key("").is_err());
        assert!(parse_full_key("/auth").is_err());
        assert!(parse_full_key("auth\\login").is_err());
    }

    #[test]
    fn file_path_round_trip() {
        let dir = Path::new("/cards");
        let path = card_file_path(dir, "auth/login");
        assert_eq!(path, Path::new("/cards/auth/login.card.md"));
        assert_eq!(key_from_file_path(dir, &path).unwrap(), "auth/login");
    }

    #[test]
    fn key_from_file_path_rejects_foreign_paths() {
        let dir = Path::new("/cards");
        assert!(key_from_file_path(dir, Path::new("/elsewhere/x.card.md")).is_none());
        assert!(key_from_file_path(dir, Path::new("/cards/readme.md")).is_none());
    }
}
