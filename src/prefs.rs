//! Persisted user preferences.
//!
//! The client keeps two string keys, `filter` and `theme`, in a small
//! key-value store. `Preferences` is the typed view loaded once at start-up;
//! a store that fails to read simply yields the defaults.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::fields::{Filter, Theme};

pub const FILTER_KEY: &str = "filter";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preference file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("preference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value storage for preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// Preferences stored as a flat JSON object in a single file.
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(path: &Path) -> Self {
        JsonPreferenceStore {
            path: path.to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PrefsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let mut buf = String::new();
        File::open(&self.path)?.read_to_string(&mut buf)?;
        if buf.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&buf)?)
    }

    /// Write all keys using temp file + rename.
    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), PrefsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(values)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        // A corrupt file is replaced rather than blocking the write.
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }
}

/// Process-wide user preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub filter: Filter,
    pub theme: Theme,
}

impl Preferences {
    /// Load both keys. Missing, unreadable or unrecognised values fall back to defaults.
    pub fn load<P: PreferenceStore>(store: &P) -> Self {
        let mut prefs = Preferences::default();
        if let Some(filter) = read_key(store, FILTER_KEY) {
            match filter.parse() {
                Ok(f) => prefs.filter = f,
                Err(e) => warn!(error = %e, "ignoring stored filter"),
            }
        }
        if let Some(theme) = read_key(store, THEME_KEY) {
            match theme.parse() {
                Ok(t) => prefs.theme = t,
                Err(e) => warn!(error = %e, "ignoring stored theme"),
            }
        }
        debug!(filter = %prefs.filter, theme = %prefs.theme, "loaded preferences");
        prefs
    }
}

fn read_key<P: PreferenceStore>(store: &P, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "could not read preference");
            None
        }
    }
}

/// Write one key, logging instead of failing.
pub fn save_key<P: PreferenceStore>(store: &P, key: &str, value: &str) {
    match store.set(key, value) {
        Ok(()) => debug!(key, value, "saved preference"),
        Err(e) => warn!(key, error = %e, "could not save preference"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// In-process store. Clones share the same map, which lets a test hand the
    /// same storage to a second controller to simulate a restart.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MemoryPreferenceStore {
        values: Rc<RefCell<HashMap<String, String>>>,
    }

    impl MemoryPreferenceStore {
        pub(crate) fn new() -> Self {
            Self::default()
        }
    }

    impl PreferenceStore for MemoryPreferenceStore {
        fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
            self.values.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(Preferences::load(&store), Preferences { filter: Filter::All, theme: Theme::Light });
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let store = MemoryPreferenceStore::new();
        store.set(FILTER_KEY, "someday").unwrap();
        store.set(THEME_KEY, "dark").unwrap();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.filter, Filter::All);
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        let store = JsonPreferenceStore::new(&path);
        assert_eq!(store.get(FILTER_KEY).unwrap(), None);

        store.set(FILTER_KEY, "pending").unwrap();
        store.set(THEME_KEY, "dark").unwrap();

        let reopened = JsonPreferenceStore::new(&path);
        assert_eq!(reopened.get(FILTER_KEY).unwrap().as_deref(), Some("pending"));
        assert_eq!(Preferences::load(&reopened).theme, Theme::Dark);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_yields_defaults_and_is_replaced_on_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();
        let store = JsonPreferenceStore::new(&path);

        assert!(store.get(THEME_KEY).is_err());
        assert_eq!(Preferences::load(&store), Preferences::default());

        save_key(&store, THEME_KEY, "dark");
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }
}
