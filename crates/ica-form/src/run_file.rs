//! Run-file material list and the reaction that feeds it into the form.

use ica_core::expand_home;
use std::path::{Path, PathBuf};

pub const MATERIAL_MARKER: &str = "[MATERIAL]";

#[derive(thiserror::Error, Debug)]
pub enum RunFileError {
    #[error("Run file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read run file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Run file has no [MATERIAL] section")]
    MissingMarker,

    #[error("Malformed material list at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Where material names come from.
pub trait MaterialSource {
    fn read_materials(&self, path: &Path) -> Result<Vec<String>, RunFileError>;
}

/// Reads the `[MATERIAL]` block of a run file on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFileReader;

impl MaterialSource for RunFileReader {
    fn read_materials(&self, path: &Path) -> Result<Vec<String>, RunFileError> {
        read_run_file(path)
    }
}

pub fn read_run_file(path: &Path) -> Result<Vec<String>, RunFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            RunFileError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RunFileError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_materials(&content)
}

/// Extract material names.
///
/// Spaces and tabs are removed from every line. The line after the marker is
/// `<key>=<count>`, followed by `count` lines of `<key>=<name>`.
pub fn parse_materials(content: &str) -> Result<Vec<String>, RunFileError> {
    let lines: Vec<String> = content
        .lines()
        .map(|line| line.trim().replace([' ', '\t'], ""))
        .collect();

    let marker = lines
        .iter()
        .position(|line| line == MATERIAL_MARKER)
        .ok_or(RunFileError::MissingMarker)?;

    let count_line = marker + 1;
    let count_text = value_token(&lines, count_line)?;
    let count: usize = count_text.parse().map_err(|_| RunFileError::Malformed {
        line: count_line + 1,
        reason: format!("invalid material count '{count_text}'"),
    })?;

    (count_line + 1..count_line + 1 + count)
        .map(|idx| value_token(&lines, idx).map(str::to_string))
        .collect()
}

fn value_token(lines: &[String], idx: usize) -> Result<&str, RunFileError> {
    let line = lines.get(idx).ok_or_else(|| RunFileError::Malformed {
        line: idx + 1,
        reason: "unexpected end of file".to_string(),
    })?;
    line.split('=').nth(1).ok_or_else(|| RunFileError::Malformed {
        line: idx + 1,
        reason: format!("expected '<key>=<value>', found '{line}'"),
    })
}

/// What happened when a run-file path was committed.
#[derive(Debug, Clone, PartialEq)]
pub enum RunFileOutcome {
    /// Empty path, or the committed value did not change.
    Skipped,
    /// The path does not exist.
    Missing,
    /// Materials were read; the table is replaced with these names.
    Populated(Vec<String>),
    /// Reading failed. `report` is false when this exact failure was already
    /// reported for this path.
    Failed {
        path: String,
        message: String,
        report: bool,
    },
}

/// Per-field memory of the last committed value and the last reported
/// failure.
#[derive(Debug, Clone, Default)]
pub struct RunFileWatch {
    last_error: Option<(String, String)>,
    last_committed: Option<String>,
}

impl RunFileWatch {
    pub fn observe(&mut self, raw_path: &str, source: &dyn MaterialSource) -> RunFileOutcome {
        let trimmed = raw_path.trim();
        if self.last_committed.as_deref() == Some(trimmed) {
            return RunFileOutcome::Skipped;
        }
        self.last_committed = Some(trimmed.to_string());
        if trimmed.is_empty() {
            return RunFileOutcome::Skipped;
        }
        let candidate = PathBuf::from(expand_home(trimmed));
        if !candidate.exists() {
            return RunFileOutcome::Missing;
        }
        let run_input = candidate.to_string_lossy().into_owned();

        match source.read_materials(&candidate) {
            Ok(names) => {
                self.last_error = None;
                tracing::debug!(count = names.len(), "materials read from run file");
                RunFileOutcome::Populated(names)
            }
            Err(RunFileError::NotFound { .. }) => RunFileOutcome::Missing,
            Err(err) => {
                let signature = (run_input.clone(), err.to_string());
                let report = self.last_error.as_ref() != Some(&signature);
                if report {
                    tracing::warn!(path = %run_input, error = %err, "unable to read materials");
                    self.last_error = Some(signature);
                }
                RunFileOutcome::Failed {
                    path: run_input,
                    message: err.to_string(),
                    report,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_material_block() {
        let names = parse_materials("[MATERIAL]\nCount=2\nName1=Copper\nName2=FR4\n").unwrap();
        assert_eq!(names, ["Copper", "FR4"]);
    }

    #[test]
    fn strips_spaces_and_tabs() {
        let text = "header\n  [MATERIAL] \n Count = 1\n\tName1 =\tMold Compound\n[NEXT]\n";
        assert_eq!(parse_materials(text).unwrap(), ["MoldCompound"]);
    }

    #[test]
    fn missing_marker_is_a_lookup_failure() {
        let err = parse_materials("Count=2\nName1=Copper\n").unwrap_err();
        assert!(matches!(err, RunFileError::MissingMarker));
    }

    #[test]
    fn truncated_block_is_malformed() {
        let err = parse_materials("[MATERIAL]\nCount=3\nName1=A\n").unwrap_err();
        assert!(matches!(err, RunFileError::Malformed { line: 4, .. }));
        let err = parse_materials("[MATERIAL]\nCount=x\n").unwrap_err();
        assert!(err.to_string().contains("invalid material count"));
    }

    struct Failing;

    impl MaterialSource for Failing {
        fn read_materials(&self, _: &Path) -> Result<Vec<String>, RunFileError> {
            Err(RunFileError::MissingMarker)
        }
    }

    #[test]
    fn repeated_failures_are_reported_once() {
        let dir = std::env::temp_dir().join("ica_run_watch");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.run");
        std::fs::write(&path, "nothing").unwrap();
        let path = path.to_string_lossy().into_owned();

        let mut watch = RunFileWatch::default();
        let first = watch.observe(&path, &Failing);
        assert!(matches!(first, RunFileOutcome::Failed { report: true, .. }));
        assert_eq!(watch.observe("", &Failing), RunFileOutcome::Skipped);
        let again = watch.observe(&path, &Failing);
        assert!(matches!(again, RunFileOutcome::Failed { report: false, .. }));
    }

    #[test]
    fn nonexistent_path_is_ignored() {
        let mut watch = RunFileWatch::default();
        let outcome = watch.observe("/definitely/not/here.run", &RunFileReader);
        assert_eq!(outcome, RunFileOutcome::Missing);
        assert_eq!(watch.observe("  ", &RunFileReader), RunFileOutcome::Skipped);
    }

    #[test]
    fn only_a_changed_value_is_read() {
        let dir = std::env::temp_dir().join("ica_run_watch_ok");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("good.run");
        std::fs::write(&path, "[MATERIAL]\nN=1\nM1=Cu\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let mut watch = RunFileWatch::default();
        assert_eq!(
            watch.observe(&path, &RunFileReader),
            RunFileOutcome::Populated(vec!["Cu".to_string()])
        );
        assert_eq!(watch.observe(&format!(" {path} "), &Failing), RunFileOutcome::Skipped);
        assert_eq!(watch.observe("/not/here.run", &RunFileReader), RunFileOutcome::Missing);
        assert_eq!(
            watch.observe(&path, &RunFileReader),
            RunFileOutcome::Populated(vec!["Cu".to_string()])
        );
    }

    #[test]
    fn success_clears_failure() {
        let dir = std::env::temp_dir().join("ica_run_watch_recover");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("flaky.run");
        std::fs::write(&path, "[MATERIAL]\nN=1\nM1=Cu\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let mut watch = RunFileWatch::default();
        assert!(matches!(watch.observe(&path, &Failing), RunFileOutcome::Failed { report: true, .. }));
        watch.observe("", &RunFileReader);
        assert!(matches!(
            watch.observe(&path, &RunFileReader),
            RunFileOutcome::Populated(_)
        ));
        watch.observe("", &RunFileReader);
        assert!(matches!(watch.observe(&path, &Failing), RunFileOutcome::Failed { report: true, .. }));
    }
}
