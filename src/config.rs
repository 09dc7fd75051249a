use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

pub const DISPLAY_SCALE_KEY: &str = "uiScale";

/// Key/value preference storage. Only the display scale is kept today.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Preferences kept as a JSON object on disk.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::preferences_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> BTreeMap<String, String> {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        let mut prefs = self.load();
        prefs.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&prefs)?;
        fs::write(&self.path, data)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, strum_macros::Display)]
pub enum DisplayScale {
    Small,
    #[default]
    Normal,
    Large,
    #[strum(to_string = "Extra Large")]
    ExtraLarge,
}

impl DisplayScale {
    const ALL: [DisplayScale; 4] = [
        DisplayScale::Small,
        DisplayScale::Normal,
        DisplayScale::Large,
        DisplayScale::ExtraLarge,
    ];

    pub fn factor(&self) -> f64 {
        match self {
            DisplayScale::Small => 0.8,
            DisplayScale::Normal => 1.0,
            DisplayScale::Large => 1.2,
            DisplayScale::ExtraLarge => 1.4,
        }
    }

    pub fn from_factor(factor: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| (s.factor() - factor).abs() < 1e-9)
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(1);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Load the stored scale, falling back to normal on anything unreadable.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        store
            .get(DISPLAY_SCALE_KEY)
            .and_then(|v| v.parse::<f64>().ok())
            .and_then(Self::from_factor)
            .unwrap_or_default()
    }

    pub fn save(&self, store: &mut dyn PreferenceStore) -> io::Result<()> {
        store.set(DISPLAY_SCALE_KEY, &self.factor().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut store = FilePreferenceStore::with_path(&path);

        assert_eq!(store.get(DISPLAY_SCALE_KEY), None);
        store.set(DISPLAY_SCALE_KEY, "1.2").unwrap();
        store.set("other", "x").unwrap();

        let reopened = FilePreferenceStore::with_path(&path);
        assert_eq!(reopened.get(DISPLAY_SCALE_KEY), Some("1.2".to_string()));
        assert_eq!(reopened.get("other"), Some("x".to_string()));
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, b"not json").unwrap();
        let store = FilePreferenceStore::with_path(&path);
        assert_eq!(store.get(DISPLAY_SCALE_KEY), None);
        assert_eq!(DisplayScale::load(&store), DisplayScale::Normal);
    }

    #[test]
    fn scale_save_and_load() {
        let mut store = MemoryPreferenceStore::default();
        DisplayScale::ExtraLarge.save(&mut store).unwrap();
        assert_eq!(store.get(DISPLAY_SCALE_KEY), Some("1.4".to_string()));
        assert_eq!(DisplayScale::load(&store), DisplayScale::ExtraLarge);
    }

    #[test]
    fn scale_rejects_unknown_factor() {
        let mut store = MemoryPreferenceStore::default();
        store.set(DISPLAY_SCALE_KEY, "3.5").unwrap();
        assert_eq!(DisplayScale::load(&store), DisplayScale::Normal);
    }

    #[test]
    fn scale_cycles_and_labels() {
        assert_eq!(DisplayScale::Normal.next(), DisplayScale::Large);
        assert_eq!(DisplayScale::ExtraLarge.next(), DisplayScale::Small);
        assert_eq!(DisplayScale::ExtraLarge.to_string(), "Extra Large");
        assert_eq!(DisplayScale::Small.factor(), 0.8);
    }
}
