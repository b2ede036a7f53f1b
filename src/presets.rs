//! JSON-file-backed catalogs of container and item-box presets.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A catalog entry keyed by a unique id.
pub trait Preset: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Written when the backing file does not exist yet.
    fn defaults() -> Vec<Self> {
        Vec::new()
    }
}

/// Container catalog entry. Weights in kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxPreset {
    pub id: String,
    pub name: String,
    pub dimensions: [f64; 3],
    #[serde(default)]
    pub thickness: f64,
    #[serde(default)]
    pub net_weight: f64,
    #[serde(default)]
    pub gross_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BoxPreset {
    fn seed(id: &str, name: &str, dimensions: [f64; 3], net: f64, gross: f64, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            dimensions,
            thickness: 0.5,
            net_weight: net,
            gross_weight: gross,
            description: Some(description.to_string()),
        }
    }
}

impl Preset for BoxPreset {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        vec![
            Self::seed("small", "Small", [30.0, 20.0, 15.0], 0.2, 0.3, "small goods"),
            Self::seed("medium", "Medium", [40.0, 30.0, 25.0], 0.4, 0.6, "medium goods"),
            Self::seed("large", "Large", [60.0, 40.0, 35.0], 0.8, 1.2, "large goods"),
            Self::seed("extra-large", "Extra large", [80.0, 60.0, 50.0], 1.5, 2.0, "bulky goods"),
        ]
    }
}

/// Item-box catalog entry. Weight in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBoxPreset {
    pub id: String,
    pub name: String,
    pub dimensions: [f64; 3],
    #[serde(default)]
    pub net_weight: f64,
    #[serde(default)]
    pub description: String,
}

impl Preset for ItemBoxPreset {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

pub struct PresetStore<T> {
    path: PathBuf,
    entries: Vec<T>,
}

impl<T: Preset> PresetStore<T> {
    /// Reads the catalog, seeding the file with [`Preset::defaults`] when it is missing.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            let entries = T::defaults();
            write_entries(&path, &entries)?;
            tracing::info!(path = %path.display(), "created preset file");
            return Ok(Self { path, entries });
        }
        let data = std::fs::read_to_string(&path)?;
        let entries = serde_json::from_str(&data)?;
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[T] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|p| p.id() == id)
    }

    pub fn replace_all(&mut self, entries: Vec<T>) -> Result<()> {
        self.commit(entries)
    }

    pub fn add(&mut self, preset: T) -> Result<&T> {
        if self.get(preset.id()).is_some() {
            return Err(Error::DuplicatePreset(preset.id().to_string()));
        }
        let mut entries = self.entries.clone();
        entries.push(preset);
        self.commit(entries)?;
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Replaces the entry with `id`; the stored entry keeps `id` whatever the update says.
    pub fn update(&mut self, id: &str, mut preset: T) -> Result<&T> {
        let idx = self.position(id)?;
        preset.set_id(id.to_string());
        let mut entries = self.entries.clone();
        entries[idx] = preset;
        self.commit(entries)?;
        Ok(&self.entries[idx])
    }

    pub fn delete(&mut self, id: &str) -> Result<T> {
        let idx = self.position(id)?;
        let mut entries = self.entries.clone();
        let removed = entries.remove(idx);
        self.commit(entries)?;
        Ok(removed)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| Error::PresetNotFound(id.to_string()))
    }

    /// Writes `entries` and only then makes them the in-memory catalog.
    fn commit(&mut self, entries: Vec<T>) -> Result<()> {
        write_entries(&self.path, &entries)?;
        self.entries = entries;
        Ok(())
    }
}

fn write_entries<T: Serialize>(path: &Path, entries: &[T]) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let data = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, data)?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "presets saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(id: &str) -> BoxPreset {
        BoxPreset {
            id: id.to_string(),
            name: format!("box {id}"),
            dimensions: [52.0, 40.0, 48.0],
            thickness: 0.0,
            net_weight: 0.0,
            gross_weight: 0.0,
            description: None,
        }
    }

    #[test]
    fn test_missing_file_seeds_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("boxPresets.json");
        let store = PresetStore::<BoxPreset>::load(&path).unwrap();
        assert_eq!(store.list().len(), 4);
        assert!(path.exists());

        let reloaded = PresetStore::<BoxPreset>::load(&path).unwrap();
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn test_item_box_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::<ItemBoxPreset>::load(dir.path().join("itemBoxPresets.json")).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PresetStore::<BoxPreset>::load(dir.path().join("p.json")).unwrap();
        store.add(preset("p1")).unwrap();
        let err = store.add(preset("p1")).unwrap_err();
        assert!(matches!(err, Error::DuplicatePreset(id) if id == "p1"));
        assert!(matches!(store.add(preset("small")), Err(Error::DuplicatePreset(_))));
    }

    #[test]
    fn test_update_keeps_id_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut store = PresetStore::<BoxPreset>::load(&path).unwrap();
        let mut changed = preset("other");
        changed.name = "renamed".to_string();
        let updated = store.update("medium", changed).unwrap();
        assert_eq!(updated.id, "medium");
        assert_eq!(updated.name, "renamed");

        let reloaded = PresetStore::<BoxPreset>::load(&path).unwrap();
        assert_eq!(reloaded.get("medium").unwrap().name, "renamed");
        assert!(reloaded.get("other").is_none());
    }

    #[test]
    fn test_delete_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PresetStore::<BoxPreset>::load(dir.path().join("p.json")).unwrap();
        let removed = store.delete("large").unwrap();
        assert_eq!(removed.id, "large");
        assert_eq!(store.list().len(), 3);
        assert!(matches!(store.delete("large"), Err(Error::PresetNotFound(_))));
        assert!(matches!(store.update("nope", preset("nope")), Err(Error::PresetNotFound(_))));
    }

    #[test]
    fn test_replace_all() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut store = PresetStore::<BoxPreset>::load(&path).unwrap();
        store.replace_all(vec![preset("only")]).unwrap();
        let reloaded = PresetStore::<BoxPreset>::load(&path).unwrap();
        assert_eq!(reloaded.list(), &[preset("only")]);
    }

    /// Turns the store's directory into a plain file so every later write fails.
    fn break_directory(dir: &Path) {
        std::fs::remove_dir_all(dir).unwrap();
        std::fs::write(dir, b"").unwrap();
    }

    #[test]
    fn test_failed_save_leaves_catalog_unchanged() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("presets");
        let mut store = PresetStore::<BoxPreset>::load(dir.join("p.json")).unwrap();
        let before = store.list().to_vec();
        break_directory(&dir);

        assert!(matches!(store.add(preset("p1")), Err(Error::Io(_))));
        assert_eq!(store.list(), &before[..]);
        // Retrying hits the same write failure, not a phantom duplicate
        assert!(matches!(store.add(preset("p1")), Err(Error::Io(_))));
        assert!(store.get("p1").is_none());

        let mut changed = preset("medium");
        changed.name = "renamed".to_string();
        assert!(matches!(store.update("medium", changed), Err(Error::Io(_))));
        assert_eq!(store.get("medium").unwrap().name, "Medium");

        assert!(matches!(store.delete("large"), Err(Error::Io(_))));
        assert!(store.get("large").is_some());

        assert!(matches!(store.replace_all(vec![preset("only")]), Err(Error::Io(_))));
        assert_eq!(store.list(), &before[..]);
    }
}
