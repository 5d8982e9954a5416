use crate::history::DEFAULT_HISTORY_LIMIT;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_storage_dir() -> PathBuf {
    PathBuf::from("funnel-data")
}

fn default_autosave_delay_ms() -> u64 {
    1000
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// Settings of the editor process itself (not of the funnel being edited)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Directory backing the file store
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Quiet period before a change is written
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// Maximum number of undo snapshots, at least 2
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            autosave_delay_ms: default_autosave_delay_ms(),
            history_limit: default_history_limit(),
        }
    }
}

impl EditorSettings {
    /// Load settings from a JSON file; a missing file yields the defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_limit < 2 {
            bail!("history_limit must be at least 2");
        }
        if self.storage_dir.as_os_str().is_empty() {
            bail!("storage_dir must not be empty");
        }
        Ok(())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EditorSettings::default();
        assert_eq!(settings.autosave_delay(), Duration::from_secs(1));
        assert_eq!(settings.history_limit, 100);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = EditorSettings::load_from_file(&dir.path().join("none.json")).unwrap();
        assert_eq!(settings, EditorSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "autosave_delay_ms": 250 }"#).unwrap();

        let settings = EditorSettings::load_from_file(&path).unwrap();
        assert_eq!(settings.autosave_delay_ms, 250);
        assert_eq!(settings.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_history_limit_below_two_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        for limit in [0, 1] {
            fs::write(&path, format!(r#"{{ "history_limit": {limit} }}"#)).unwrap();
            assert!(EditorSettings::load_from_file(&path).is_err());

            let settings = EditorSettings {
                history_limit: limit,
                ..EditorSettings::default()
            };
            assert!(settings.validate().is_err());
        }

        let two = EditorSettings {
            history_limit: 2,
            ..EditorSettings::default()
        };
        assert!(two.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = EditorSettings {
            storage_dir: dir.path().join("store"),
            autosave_delay_ms: 500,
            history_limit: 20,
        };

        settings.save_to_file(&path).unwrap();
        assert_eq!(EditorSettings::load_from_file(&path).unwrap(), settings);
    }
}
