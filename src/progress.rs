//! Persisted section conquests
//!
//! The session only ever marks a section conquered and reads the list back
//! while idle. Storage is an opaque id -> bool map; two stores are provided,
//! in-memory and a JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Narrow interface the session talks to
pub trait ProgressStore {
    fn mark_section_conquered(&mut self, section: &str);
    /// Conquered section ids, sorted
    fn conquered_sections(&self) -> Vec<String>;
}

/// Section id -> conquered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConquestMap(pub BTreeMap<String, bool>);

impl ConquestMap {
    pub fn mark(&mut self, section: &str) -> bool {
        self.0.insert(section.to_string(), true) != Some(true)
    }

    pub fn conquered(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|&(_, &done)| done)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Progress that lives as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryProgress {
    map: ConquestMap,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgress {
    fn mark_section_conquered(&mut self, section: &str) {
        self.map.mark(section);
    }

    fn conquered_sections(&self) -> Vec<String> {
        self.map.conquered()
    }
}

/// Progress persisted as a JSON object on disk, written on every change
#[derive(Debug, Clone)]
pub struct JsonFileProgress {
    path: PathBuf,
    map: ConquestMap,
}

impl JsonFileProgress {
    /// Load from `path`, starting fresh if it is missing or unreadable
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let map = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<ConquestMap>(&json) {
                Ok(map) => {
                    log::info!("Loaded {} conquered sections", map.conquered().len());
                    map
                }
                Err(e) => {
                    log::warn!("Corrupt progress file {}: {e}, starting fresh", path.display());
                    ConquestMap::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No progress found, starting fresh");
                ConquestMap::default()
            }
            Err(e) => {
                log::warn!("Failed to read progress {}: {e}", path.display());
                ConquestMap::default()
            }
        };
        Self { path, map }
    }

    fn save(&self) {
        let json = match serde_json::to_string_pretty(&self.map) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize progress: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            log::error!("Failed to save progress to {}: {e}", self.path.display());
        }
    }
}

impl ProgressStore for JsonFileProgress {
    fn mark_section_conquered(&mut self, section: &str) {
        if self.map.mark(section) {
            self.save();
        }
    }

    fn conquered_sections(&self) -> Vec<String> {
        self.map.conquered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("neon-siege-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryProgress::new();
        store.mark_section_conquered("experience");
        store.mark_section_conquered("about");
        store.mark_section_conquered("about");
        assert_eq!(store.conquered_sections(), vec!["about", "experience"]);
    }

    #[test]
    fn test_map_ignores_false_entries() {
        let map: ConquestMap = serde_json::from_str(r#"{"about":true,"boss":false}"#).unwrap();
        assert_eq!(map.conquered(), vec!["about"]);
    }

    #[test]
    fn test_file_round_trip() {
        let path = temp_path("round-trip");
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileProgress::load(&path);
        assert!(store.conquered_sections().is_empty());
        store.mark_section_conquered("portfolio");

        let reloaded = JsonFileProgress::load(&path);
        assert_eq!(reloaded.conquered_sections(), vec!["portfolio"]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileProgress::load(&path);
        assert!(store.conquered_sections().is_empty());
        let _ = std::fs::remove_file(&path);
    }
}
