//! Local settings cache kept next to the working directory.

use crate::persistence::write_pretty_json;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".ICAdvConfig";

const TOOL_PATH_KEY: &str = "tool_path";
const PARAMETER_KEY: &str = "parameter";

/// Reads are permissive and writes best effort: a broken cache behaves like
/// an empty one and never fails the caller.
#[derive(Debug, Clone)]
pub struct ConfigCache {
    path: PathBuf,
}

impl ConfigCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_tool_path(&self) -> String {
        self.string_entry(TOOL_PATH_KEY)
    }

    pub fn load_parameter(&self) -> String {
        self.string_entry(PARAMETER_KEY)
    }

    /// Store the trimmed path; an empty path removes the entry. Every other
    /// key of the cache is kept as it was.
    pub fn save_tool_path(&self, path: &str) {
        let mut config = self.read();
        let cleaned = path.trim();
        if cleaned.is_empty() {
            config.remove(TOOL_PATH_KEY);
        } else {
            config.insert(TOOL_PATH_KEY.to_string(), Value::String(cleaned.to_string()));
        }
        self.write(config);
    }

    /// Entries that are not strings read as unset.
    fn string_entry(&self, key: &str) -> String {
        match self.read().get(key) {
            Some(Value::String(text)) => text.clone(),
            _ => String::new(),
        }
    }

    fn read(&self) -> Map<String, Value> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "config cache is not a mapping");
                Map::new()
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable config cache");
                Map::new()
            }
        }
    }

    fn write(&self, config: Map<String, Value>) {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(err) = fs::create_dir_all(parent)
        {
            tracing::warn!(path = %self.path.display(), error = %err, "config cache directory unavailable");
            return;
        }
        if let Err(err) = write_pretty_json(&self.path, &Value::Object(config)) {
            tracing::warn!(path = %self.path.display(), error = %err, "config cache not written");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("ica_config").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_cache_is_empty() {
        let cache = ConfigCache::in_dir(&scratch_dir("missing"));
        assert_eq!(cache.load_tool_path(), "");
        assert_eq!(cache.load_parameter(), "");
    }

    #[test]
    fn tool_path_round_trip_keeps_other_keys() {
        let dir = scratch_dir("round_trip");
        let cache = ConfigCache::in_dir(&dir);
        fs::write(cache.path(), r#"{"parameter": "p.json", "theme": "dark"}"#).unwrap();

        cache.save_tool_path("  /opt/tool/bin  ");
        assert_eq!(cache.load_tool_path(), "/opt/tool/bin");
        assert_eq!(cache.load_parameter(), "p.json");

        let saved: Value = serde_json::from_str(&fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
    }

    #[test]
    fn empty_path_removes_entry() {
        let cache = ConfigCache::in_dir(&scratch_dir("remove"));
        cache.save_tool_path("/opt/tool");
        cache.save_tool_path("   ");
        assert_eq!(cache.load_tool_path(), "");
        let saved: Value = serde_json::from_str(&fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert!(saved.get("tool_path").is_none());
    }

    #[test]
    fn malformed_cache_reads_as_empty() {
        let cache = ConfigCache::in_dir(&scratch_dir("malformed"));
        fs::write(cache.path(), "[1, 2").unwrap();
        assert_eq!(cache.load_tool_path(), "");
        cache.save_tool_path("/opt/tool");
        assert_eq!(cache.load_tool_path(), "/opt/tool");
    }

    #[test]
    fn non_string_entry_keeps_the_rest_of_the_cache() {
        let cache = ConfigCache::in_dir(&scratch_dir("non_string"));
        fs::write(
            cache.path(),
            r#"{"tool_path": 42, "parameter": "p.json", "window": {"w": 800}}"#,
        )
        .unwrap();
        assert_eq!(cache.load_tool_path(), "");
        assert_eq!(cache.load_parameter(), "p.json");

        cache.save_tool_path("/opt/tool");
        let saved: Value = serde_json::from_str(&fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(saved["tool_path"], "/opt/tool");
        assert_eq!(saved["parameter"], "p.json");
        assert_eq!(saved["window"]["w"], 800);
    }
}
