//! Run identity derived from a run-file path.
//!
//! Run files live in `<project>/Analysis/<run folder>/<project><digits>.run`.
//! The folder's trailing digits name the run, the file name (minus digits)
//! names the project, and everything above `Analysis` is the project folder.

use crate::{FormatError, FormatResult};
use ica_core::RunPath;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub run_file: String,
    pub run_name: String,
    pub project_name: String,
    pub project_folder: String,
}

impl RunMetadata {
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("RunFile".to_string(), Value::String(self.run_file));
        map.insert("RunName".to_string(), Value::String(self.run_name));
        map.insert("ProjectName".to_string(), Value::String(self.project_name));
        map.insert("ProjectFolder".to_string(), Value::String(self.project_folder));
        map
    }
}

pub fn derive_run_metadata(run_file: &str) -> FormatResult<RunMetadata> {
    let normalized = run_file.trim();
    if normalized.is_empty() {
        return Err(FormatError::RunFileRequired);
    }
    let path = RunPath::parse(normalized);
    if !path.is_absolute() {
        return Err(FormatError::RunFileNotAbsolute {
            path: normalized.to_string(),
        });
    }
    let run_folder = path.parent();
    if run_folder == path {
        return Err(FormatError::RunFileNoParent {
            path: normalized.to_string(),
        });
    }

    let folder_name = run_folder.name();
    let digits = trailing_digits(folder_name);
    let run_name = if digits.is_empty() { folder_name } else { digits };

    let stem = path.stem();
    let project_name = stem
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end_matches(|c: char| c == '_' || c == '-' || c.is_whitespace());
    let project_name = if project_name.is_empty() {
        stem
    } else {
        project_name
    };

    Ok(RunMetadata {
        run_file: path.to_string(),
        run_name: run_name.to_string(),
        project_name: project_name.to_string(),
        project_folder: project_folder(&path, &run_folder),
    })
}

fn trailing_digits(text: &str) -> &str {
    let kept = text.trim_end_matches(|c: char| c.is_ascii_digit());
    &text[kept.len()..]
}

/// Everything before the first `analysis` part, else the run folder's parent.
fn project_folder(path: &RunPath, run_folder: &RunPath) -> String {
    if let Some(idx) = path
        .parts()
        .iter()
        .position(|part| part.eq_ignore_ascii_case("analysis"))
    {
        return path.truncated(idx).to_string();
    }
    let parent = run_folder.parent();
    if &parent == run_folder {
        run_folder.to_string()
    } else {
        parent.to_string()
    }
}
