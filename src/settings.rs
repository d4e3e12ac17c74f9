//! Persisted player settings
//!
//! The only setting the round needs is the difficulty in effect when the
//! previous round ended, which becomes the starting tier of the next one.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::{constants::settings::LAST_DIFFICULTY_KEY, question::Tier};

/// Errors that can occur while loading or saving settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read or written
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not a JSON object of strings
    #[error("settings file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Key-value store remembering the last difficulty between rounds
pub trait SettingsStore {
    /// The persisted difficulty, if any round has ended before
    fn last_difficulty(&self) -> Option<Tier>;

    /// Persists the difficulty in effect at the end of a round
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be made durable.
    fn set_last_difficulty(&mut self, tier: Tier) -> Result<(), SettingsError>;
}

/// In-memory store, useful for tests and ephemeral sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySettings {
    last_difficulty: Option<Tier>,
}

impl MemorySettings {
    /// Creates a store that already remembers `tier`
    pub fn with_last_difficulty(tier: Tier) -> Self {
        Self {
            last_difficulty: Some(tier),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn last_difficulty(&self) -> Option<Tier> {
        self.last_difficulty
    }

    fn set_last_difficulty(&mut self, tier: Tier) -> Result<(), SettingsError> {
        self.last_difficulty = Some(tier);
        Ok(())
    }
}

/// Store backed by a small JSON object on disk
///
/// The file holds string values keyed by setting name, e.g.
/// `{"LastDifficulty": "MODERATE"}`. Every write rewrites the whole file.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettings {
    /// Opens the store at `path`; a missing file is an empty store
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(error.into()),
        };
        Ok(Self { path, values })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettings {
    /// Unknown stored labels read back as [`Tier::Easy`]
    fn last_difficulty(&self) -> Option<Tier> {
        self.values
            .get(LAST_DIFFICULTY_KEY)
            .filter(|label| !label.is_empty())
            .map(|label| Tier::from_label(label))
    }

    fn set_last_difficulty(&mut self, tier: Tier) -> Result<(), SettingsError> {
        self.values
            .insert(LAST_DIFFICULTY_KEY.to_owned(), tier.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        debug!(path = %self.path.display(), %tier, "saved last difficulty");
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("trivia-settings-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_memory_settings_round_trip() {
        let mut settings = MemorySettings::default();
        assert_eq!(settings.last_difficulty(), None);
        settings.set_last_difficulty(Tier::Hard).unwrap();
        assert_eq!(settings.last_difficulty(), Some(Tier::Hard));
    }

    #[test]
    fn test_file_settings_missing_file_is_empty() {
        let settings = FileSettings::open(temp_path("missing.json")).unwrap();
        assert_eq!(settings.last_difficulty(), None);
    }

    #[test]
    fn test_file_settings_persist_across_open() {
        let path = temp_path("settings.json");
        let mut settings = FileSettings::open(&path).unwrap();
        settings.set_last_difficulty(Tier::Moderate).unwrap();

        let reopened = FileSettings::open(&path).unwrap();
        assert_eq!(reopened.last_difficulty(), Some(Tier::Moderate));
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("\"LastDifficulty\": \"MODERATE\""));
    }

    #[test]
    fn test_file_settings_unknown_label_reads_as_easy() {
        let path = temp_path("settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"LastDifficulty": "LEGENDARY"}"#).unwrap();

        let settings = FileSettings::open(&path).unwrap();
        assert_eq!(settings.last_difficulty(), Some(Tier::Easy));
    }

    #[test]
    fn test_file_settings_empty_label_is_unset() {
        let path = temp_path("settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"LastDifficulty": ""}"#).unwrap();

        assert_eq!(FileSettings::open(&path).unwrap().last_difficulty(), None);
    }

    #[test]
    fn test_file_settings_malformed_file() {
        let path = temp_path("settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileSettings::open(&path),
            Err(SettingsError::Malformed(_))
        ));
    }
}
