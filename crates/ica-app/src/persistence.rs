//! Output document persistence: shallow merge into the existing file.

use crate::error::{AppError, AppResult};
use ica_core::expand_home;
use ica_form::PathControl;
use ica_schema::{DialogMode, PathMode, PathOptions};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_FILE: &str = "ic_advanced_source.json";

/// Path entry for the output document: a JSON file, materialised on commit.
pub fn output_path_control() -> PathControl {
    PathControl::new(PathOptions {
        mode: PathMode::File,
        dialog: DialogMode::Open,
        caption: "Select output file".to_string(),
        filter: "JSON Files (*.json)".to_string(),
        default_suffix: Some("json".to_string()),
    })
}

fn anchored(text: &str, working_dir: &Path) -> AppResult<PathBuf> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::MissingOutputPath);
    }
    let path = PathBuf::from(expand_home(text));
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(working_dir.join(path))
    }
}

/// Commit the output path text; relative paths land under `working_dir`.
///
/// A missing extension becomes `.json`, and the parent directory and an
/// empty placeholder file are created.
pub fn resolve_output_path(text: &str, working_dir: &Path) -> AppResult<PathBuf> {
    let path = anchored(text, working_dir)?;
    let mut control = output_path_control();
    control.write(&Value::String(path.to_string_lossy().into_owned()));
    Ok(PathBuf::from(control.commit()))
}

/// Like [`resolve_output_path`] but nothing is created on disk; used for
/// documents that are only read.
pub fn resolve_document_path(text: &str, working_dir: &Path) -> AppResult<PathBuf> {
    let mut path = anchored(text, working_dir)?;
    let control = output_path_control();
    if path.extension().is_none()
        && let Some(suffix) = control.options().suffix()
    {
        path.set_extension(suffix);
    }
    Ok(path)
}

/// Existing top-level mapping at `path`. Anything unreadable, malformed or
/// not a mapping counts as empty.
pub fn read_existing(path: &Path) -> Map<String, Value> {
    if !path.exists() {
        return Map::new();
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "existing output unreadable");
            return Map::new();
        }
    };
    // An untouched placeholder file.
    if content.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "existing output is not valid JSON");
            Map::new()
        }
    }
}

/// Top-level keys of `payload` replace those of `existing`; nothing deeper
/// is merged.
pub fn merge_payload(existing: Map<String, Value>, payload: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = existing;
    for (key, value) in payload {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Write `value` as JSON indented by four spaces.
pub fn write_pretty_json(path: &Path, value: &Value) -> AppResult<()> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;

    fs::write(path, buffer).map_err(|e| AppError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Merge `payload` into the document at `path` and write it back.
pub fn save_payload(path: &Path, payload: &Map<String, Value>) -> AppResult<Map<String, Value>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::DirectoryCreate {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let merged = merge_payload(read_existing(path), payload);
    write_pretty_json(path, &Value::Object(merged.clone()))?;
    tracing::debug!(path = %path.display(), keys = merged.len(), "output document saved");
    Ok(merged)
}
