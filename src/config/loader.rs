//! Settings file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EpicstampError, Result};

use super::settings::Settings;

/// Default settings file: `<config dir>/epicstamp/config.yml`.
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("epicstamp").join("config.yml"))
}

/// Parse settings from YAML text.
pub fn parse_settings(yaml: &str, path: &Path) -> Result<Settings> {
    // An empty file is valid and means "all defaults".
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(yaml).map_err(|e| EpicstampError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load settings from a file.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)?;
    let settings = parse_settings(&content, path)?;
    settings.validate()?;
    tracing::debug!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Load settings.
///
/// An explicit path must exist. Without one, the default location is used
/// if present, otherwise defaults apply.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(EpicstampError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        return load_settings_file(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_settings_file(&path),
        _ => {
            tracing::debug!("No settings file found, using defaults");
            Ok(Settings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_missing_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(err, EpicstampError::ConfigNotFound { .. }));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "templates_dir: /srv/epics\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.templates_dir(), PathBuf::from("/srv/epics"));
    }

    #[test]
    fn empty_file_is_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(load_settings_file(&path).unwrap(), Settings::default());
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "cache: [unclosed").unwrap();

        let err = load_settings_file(&path).unwrap_err();
        assert!(matches!(err, EpicstampError::ConfigParseError { .. }));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "cache:\n  default_ttl: -5m\n").unwrap();

        let err = load_settings_file(&path).unwrap_err();
        assert!(matches!(err, EpicstampError::ConfigValidationError { .. }));
    }

    #[test]
    fn default_path_ends_with_config_file() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("epicstamp/config.yml"));
        }
    }
}
