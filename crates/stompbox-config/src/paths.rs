//! Platform-specific paths for configuration and presets.
//!
//! # Directory Structure
//!
//! - **Config**: `~/.config/stompbox/` (Linux), `~/Library/Application Support/stompbox/` (macOS), `%APPDATA%\stompbox\` (Windows)
//! - **Engine config**: `<config>/engine.toml`
//! - **User presets**: `<config>/presets/<user>/<id>.toml`
//!
//! # Example
//!
//! ```rust,no_run
//! use stompbox_config::paths;
//!
//! println!("engine config: {}", paths::engine_config_path().display());
//! println!("presets:       {}", paths::user_presets_dir().display());
//! ```

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
pub const APP_NAME: &str = "stompbox";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// File name of the engine configuration.
const ENGINE_CONFIG_FILE: &str = "engine.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the root of the per-user preset directories.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Returns the default engine configuration file path.
pub fn engine_config_path() -> PathBuf {
    user_config_dir().join(ENGINE_CONFIG_FILE)
}

/// Creates `dir` and its parents if missing.
///
/// # Errors
///
/// Returns [`ConfigError::CreateDir`] if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}

/// Maps an opaque identifier onto a safe single path component.
///
/// ASCII letters, digits, `-` and `_` are kept, everything else becomes `_`.
/// An empty result becomes `_`.
///
/// ```rust
/// use stompbox_config::paths::sanitize_component;
///
/// assert_eq!(sanitize_component("../alice@example.com"), "___alice_example_com");
/// assert_eq!(sanitize_component(""), "_");
/// ```
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Lists the `.toml` files directly inside `dir`.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_toml_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dirs_live_under_app_name() {
        assert!(user_config_dir().to_string_lossy().contains(APP_NAME));
        assert!(user_presets_dir().starts_with(user_config_dir()));
        assert!(engine_config_path().ends_with("engine.toml"));
    }

    #[test]
    fn list_toml_files_filters_extension() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        fs::write(temp_dir.path().join("b.toml"), "").unwrap();
        fs::write(temp_dir.path().join("active"), "a").unwrap();
        fs::create_dir(temp_dir.path().join("nested.toml")).unwrap();

        let files = list_toml_files(temp_dir.path());
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn list_toml_files_missing_dir() {
        assert!(list_toml_files(Path::new("/nonexistent/stompbox/12345")).is_empty());
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("x").join("y");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn sanitize_keeps_safe_chars() {
        assert_eq!(sanitize_component("user_42-b"), "user_42-b");
        assert_eq!(sanitize_component("a/b\\c"), "a_b_c");
    }
}
