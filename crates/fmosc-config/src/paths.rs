//! Platform-specific paths for user presets.
//!
//! - Linux: `~/.config/fmosc/presets/`
//! - macOS: `~/Library/Application Support/fmosc/presets/`
//! - Windows: `%APPDATA%\fmosc\presets\`

use std::path::{Path, PathBuf};

use crate::{ConfigError, VoicePreset, get_factory_preset};

/// Application name used for directory paths.
const APP_NAME: &str = "fmosc";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// Returns the user-specific presets directory.
///
/// Falls back to `./fmosc/presets` if the config directory cannot be
/// determined.
pub fn user_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PRESETS_SUBDIR)
}

/// Ensure the user presets directory exists.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Find a preset file by path or by name in `dir`.
///
/// `name` may be a path to an existing file, or a preset name with or
/// without the `.toml` extension.
pub fn find_preset_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Find a preset file by path or by name in the user presets directory.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    find_preset_in(&user_presets_dir(), name)
}

/// Resolve a preset reference.
///
/// Files win over factory presets so a user preset can shadow a factory one.
pub fn resolve_preset(name: &str) -> Result<VoicePreset, ConfigError> {
    if let Some(path) = find_preset(name) {
        return VoicePreset::load(path);
    }
    get_factory_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

/// List preset files in the user presets directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

/// List `.toml` files in `dir`, sorted by path.
pub fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Preset name from a file path (the file stem).
///
/// ```rust
/// use fmosc_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/bell.toml"));
/// assert_eq!(name, Some("bell".to_string()));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn user_presets_dir_ends_with_app_and_subdir() {
        let dir = user_presets_dir();
        assert!(dir.ends_with(Path::new(APP_NAME).join(PRESETS_SUBDIR)));
    }

    #[test]
    fn find_preset_in_accepts_name_with_or_without_extension() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("pad.toml");
        fs::write(&file, "name = \"Pad\"").unwrap();

        assert_eq!(find_preset_in(temp.path(), "pad"), Some(file.clone()));
        assert_eq!(find_preset_in(temp.path(), "pad.toml"), Some(file.clone()));
        assert_eq!(
            find_preset_in(temp.path(), file.to_str().unwrap()),
            Some(file)
        );
        assert_eq!(find_preset_in(temp.path(), "missing"), None);
    }

    #[test]
    fn list_presets_only_returns_toml_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.toml"), "").unwrap();
        fs::write(temp.path().join("a.toml"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp.path().join("dir.toml")).unwrap();

        let found = list_presets_in_dir(temp.path());
        assert_eq!(
            found,
            vec![temp.path().join("a.toml"), temp.path().join("b.toml")]
        );
    }

    #[test]
    fn list_missing_dir_is_empty() {
        assert!(list_presets_in_dir(Path::new("/nonexistent/fmosc/presets")).is_empty());
    }

    #[test]
    fn resolve_falls_back_to_factory() {
        let preset = resolve_preset("bell").unwrap();
        assert_eq!(preset.name, "Bell");
        assert!(matches!(
            resolve_preset("definitely_not_a_preset"),
            Err(ConfigError::PresetNotFound(_))
        ));
    }
}
