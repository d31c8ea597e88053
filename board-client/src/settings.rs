//! Application settings and the key/value store they persist through.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BoardClientError;

pub const THEME_KEY: &str = "theme";

/// String key/value storage for preferences that outlive a run.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), BoardClientError>;
    fn remove(&self, key: &str) -> Result<(), BoardClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RefCell<BTreeMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BoardClientError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BoardClientError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = BoardClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(BoardClientError::Storage(format!("unknown theme {other:?}"))),
        }
    }
}

/// Settings read once at startup and handed to whatever renders the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppSettings {
    pub theme: Theme,
}

impl AppSettings {
    /// Missing or unreadable values fall back to defaults.
    pub fn load(prefs: &dyn PreferenceStore) -> Self {
        let theme = prefs
            .get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        debug!(%theme, "settings loaded");
        Self { theme }
    }

    pub fn toggle_theme(&mut self, prefs: &dyn PreferenceStore) -> Result<Theme, BoardClientError> {
        self.theme = self.theme.toggled();
        prefs.set(THEME_KEY, self.theme.as_str())?;
        Ok(self.theme)
    }
}

#[cfg(feature = "native")]
pub use file::FilePreferences;

#[cfg(feature = "native")]
mod file {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    use tracing::{info, warn};

    use super::PreferenceStore;
    use crate::error::BoardClientError;

    /// Preferences kept in a flat TOML table on disk.
    #[derive(Debug)]
    pub struct FilePreferences {
        path: PathBuf,
        values: RefCell<BTreeMap<String, String>>,
    }

    impl FilePreferences {
        /// `<config dir>/bulletin-board/preferences.toml`.
        pub fn default_path() -> Option<PathBuf> {
            dirs::config_dir().map(|d| d.join("bulletin-board").join("preferences.toml"))
        }

        pub fn open(path: impl Into<PathBuf>) -> Result<Self, BoardClientError> {
            let path = path.into();
            let values = if path.exists() {
                let contents = fs::read_to_string(&path).map_err(storage)?;
                toml::from_str(&contents).map_err(storage)?
            } else {
                info!("no preferences at {}, starting empty", path.display());
                BTreeMap::new()
            };
            Ok(Self {
                path,
                values: RefCell::new(values),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self) -> Result<(), BoardClientError> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent).map_err(storage)?;
            }
            let contents = toml::to_string(&*self.values.borrow()).map_err(storage)?;
            fs::write(&self.path, contents).map_err(|e| {
                warn!("failed to write {}: {}", self.path.display(), e);
                storage(e)
            })
        }
    }

    impl PreferenceStore for FilePreferences {
        fn get(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> Result<(), BoardClientError> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            self.flush()
        }

        fn remove(&self, key: &str) -> Result<(), BoardClientError> {
            let removed = self.values.borrow_mut().remove(key).is_some();
            if removed { self.flush() } else { Ok(()) }
        }
    }

    fn storage(err: impl std::fmt::Display) -> BoardClientError {
        BoardClientError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_light() {
        let prefs = MemoryPreferences::default();
        assert_eq!(AppSettings::load(&prefs).theme, Theme::Light);

        prefs.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(AppSettings::load(&prefs).theme, Theme::Light);
    }

    #[test]
    fn toggle_is_written_through() {
        let prefs = MemoryPreferences::default();
        let mut settings = AppSettings::load(&prefs);

        assert_eq!(settings.toggle_theme(&prefs).unwrap(), Theme::Dark);
        assert_eq!(prefs.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(AppSettings::load(&prefs).theme, Theme::Dark);

        assert_eq!(settings.toggle_theme(&prefs).unwrap(), Theme::Light);
        assert_eq!(prefs.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[cfg(feature = "native")]
    #[test]
    fn file_preferences_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let prefs = FilePreferences::open(&path).unwrap();
        assert_eq!(prefs.get(THEME_KEY), None);
        prefs.set(THEME_KEY, "dark").unwrap();
        prefs.set("board_token", "abc").unwrap();

        let reopened = FilePreferences::open(&path).unwrap();
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("dark"));
        reopened.remove("board_token").unwrap();

        let again = FilePreferences::open(&path).unwrap();
        assert_eq!(again.get("board_token"), None);
        assert_eq!(again.path(), path.as_path());
    }
}
